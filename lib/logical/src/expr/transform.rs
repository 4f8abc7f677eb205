use crate::expr::{
    AggregateExpression, BinaryOperator, Expression, ExpressionShape, NaryOperator,
    TernaryOperator, UnaryOperator,
};

/// An error raised while rewriting an expression tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    /// The transform cannot meaningfully rewrite expressions of the given shape.
    #[error("The transform {transform} does not support {shape} expressions")]
    UnsupportedShape {
        transform: &'static str,
        shape: ExpressionShape,
    },
}

/// A structural rewrite of an expression tree with one rule per [ExpressionShape].
///
/// Rules receive the already transformed children of a node and return its replacement. A
/// transform that cannot handle a shape must return [TransformError::UnsupportedShape] instead
/// of dropping parts of the tree.
///
/// Use [Expression::transform] to apply a transform.
pub trait ExpressionTransform {
    /// Rewrites a constant or a variable.
    fn transform_nullary(&self, expression: Expression) -> Result<Expression, TransformError>;

    fn transform_unary(
        &self,
        operator: UnaryOperator,
        argument: Expression,
    ) -> Result<Expression, TransformError>;

    fn transform_binary(
        &self,
        operator: BinaryOperator,
        lhs: Expression,
        rhs: Expression,
    ) -> Result<Expression, TransformError>;

    fn transform_ternary(
        &self,
        operator: TernaryOperator,
        first: Expression,
        second: Expression,
        third: Expression,
    ) -> Result<Expression, TransformError>;

    fn transform_nary(
        &self,
        operator: NaryOperator,
        arguments: Vec<Expression>,
    ) -> Result<Expression, TransformError>;

    /// Rewrites an aggregate whose argument has already been transformed.
    fn transform_aggregate(
        &self,
        aggregate: AggregateExpression,
    ) -> Result<Expression, TransformError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadflow_model::{Literal, NamedNode, Variable};

    /// Rebuilds every node from its children.
    struct Rebuild;

    impl ExpressionTransform for Rebuild {
        fn transform_nullary(&self, expression: Expression) -> Result<Expression, TransformError> {
            Ok(expression)
        }

        fn transform_unary(
            &self,
            operator: UnaryOperator,
            argument: Expression,
        ) -> Result<Expression, TransformError> {
            Ok(Expression::unary(operator, argument))
        }

        fn transform_binary(
            &self,
            operator: BinaryOperator,
            lhs: Expression,
            rhs: Expression,
        ) -> Result<Expression, TransformError> {
            Ok(Expression::binary(operator, lhs, rhs))
        }

        fn transform_ternary(
            &self,
            operator: TernaryOperator,
            first: Expression,
            second: Expression,
            third: Expression,
        ) -> Result<Expression, TransformError> {
            Ok(Expression::ternary(operator, first, second, third))
        }

        fn transform_nary(
            &self,
            operator: NaryOperator,
            arguments: Vec<Expression>,
        ) -> Result<Expression, TransformError> {
            Ok(Expression::nary(operator, arguments))
        }

        fn transform_aggregate(
            &self,
            aggregate: AggregateExpression,
        ) -> Result<Expression, TransformError> {
            Ok(aggregate.into())
        }
    }

    /// Renames every variable to `?renamed` and records the order in which rules are invoked.
    struct Rename(std::cell::RefCell<Vec<String>>);

    impl ExpressionTransform for Rename {
        fn transform_nullary(&self, expression: Expression) -> Result<Expression, TransformError> {
            self.0.borrow_mut().push(expression.to_string());
            Ok(match expression {
                Expression::Variable(_) => Variable::new_unchecked("renamed").into(),
                expression => expression,
            })
        }

        fn transform_unary(
            &self,
            operator: UnaryOperator,
            argument: Expression,
        ) -> Result<Expression, TransformError> {
            Rebuild.transform_unary(operator, argument)
        }

        fn transform_binary(
            &self,
            operator: BinaryOperator,
            lhs: Expression,
            rhs: Expression,
        ) -> Result<Expression, TransformError> {
            let result = Expression::binary(operator, lhs, rhs);
            self.0.borrow_mut().push(result.to_string());
            Ok(result)
        }

        fn transform_ternary(
            &self,
            operator: TernaryOperator,
            first: Expression,
            second: Expression,
            third: Expression,
        ) -> Result<Expression, TransformError> {
            Rebuild.transform_ternary(operator, first, second, third)
        }

        fn transform_nary(
            &self,
            operator: NaryOperator,
            arguments: Vec<Expression>,
        ) -> Result<Expression, TransformError> {
            Rebuild.transform_nary(operator, arguments)
        }

        fn transform_aggregate(
            &self,
            aggregate: AggregateExpression,
        ) -> Result<Expression, TransformError> {
            Err(TransformError::UnsupportedShape {
                transform: "Rename",
                shape: Expression::from(aggregate).shape(),
            })
        }
    }

    fn sample_expressions() -> Vec<Expression> {
        let x = Expression::variable(Variable::new_unchecked("x"));
        let y = Expression::variable(Variable::new_unchecked("y"));
        vec![
            x.clone(),
            Expression::constant(Literal::from(3_i64)),
            Expression::or(
                Expression::binary(BinaryOperator::Less, x.clone(), Literal::from(10_i64).into()),
                Expression::unary(
                    UnaryOperator::Not,
                    Expression::unary(UnaryOperator::Bound, y.clone()),
                ),
            ),
            Expression::ternary(
                TernaryOperator::Substr,
                Expression::unary(UnaryOperator::Str, x.clone()),
                Literal::from(1_i64).into(),
                Literal::from(2_i64).into(),
            ),
            Expression::nary(
                NaryOperator::Function(NamedNode::new_unchecked("http://example.com/f")),
                vec![x.clone(), y.clone(), Expression::nary(NaryOperator::Coalesce, vec![])],
            ),
            AggregateExpression::new(
                crate::expr::AggregateFunction::Sum,
                Expression::binary(BinaryOperator::Multiply, x, y),
                true,
            )
            .into(),
            AggregateExpression::count_all(false).into(),
        ]
    }

    #[test]
    fn rebuilding_transform_is_identity() {
        for expression in sample_expressions() {
            assert_eq!(expression.transform(&Rebuild), Ok(expression.clone()));
        }
    }

    #[test]
    fn children_are_transformed_before_parent() {
        let transform = Rename(std::cell::RefCell::default());
        let expression = Expression::binary(
            BinaryOperator::Add,
            Variable::new_unchecked("a").into(),
            Literal::from(1_i64).into(),
        );

        let result = expression.transform(&transform).unwrap();

        assert_eq!(result.to_string(), "(?renamed + 1)");
        assert_eq!(
            transform.0.into_inner(),
            vec!["?a".to_owned(), "1".to_owned(), "(?renamed + 1)".to_owned()]
        );
        assert_eq!(expression.to_string(), "(?a + 1)");
    }

    #[test]
    fn unsupported_shape_fails() {
        let transform = Rename(std::cell::RefCell::default());
        let expression = Expression::unary(
            UnaryOperator::Str,
            AggregateExpression::count_all(false).into(),
        );
        assert_eq!(
            expression.transform(&transform).unwrap_err().to_string(),
            "The transform Rename does not support aggregate expressions"
        );
    }
}
