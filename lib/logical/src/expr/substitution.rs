use crate::expr::{
    AggregateExpression, BinaryOperator, Expression, ExpressionShape, ExpressionTransform,
    NaryOperator, TernaryOperator, TransformError, UnaryOperator,
};
use quadflow_model::{Literal, Solution};

/// Replaces every variable that is bound in a [Solution] with its value.
///
/// `BOUND(?x)` folds to `true` if `?x` is substituted. Aggregates are not supported as their
/// arguments range over a whole group instead of a single solution.
#[derive(Clone, Debug)]
pub struct VariableSubstitution {
    bindings: Solution,
}

impl VariableSubstitution {
    pub fn new(bindings: Solution) -> Self {
        Self { bindings }
    }
}

impl ExpressionTransform for VariableSubstitution {
    fn transform_nullary(&self, expression: Expression) -> Result<Expression, TransformError> {
        Ok(match expression {
            Expression::Variable(variable) => match self.bindings.get(&variable) {
                Some(value) => Expression::Constant(value.clone()),
                None => Expression::Variable(variable),
            },
            expression => expression,
        })
    }

    fn transform_unary(
        &self,
        operator: UnaryOperator,
        argument: Expression,
    ) -> Result<Expression, TransformError> {
        Ok(match (operator, argument) {
            (UnaryOperator::Bound, Expression::Constant(_)) => Literal::from(true).into(),
            (operator, argument) => Expression::unary(operator, argument),
        })
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
        _aggregate: AggregateExpression,
    ) -> Result<Expression, TransformError> {
        Err(TransformError::UnsupportedShape {
            transform: "VariableSubstitution",
            shape: ExpressionShape::Aggregate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::AggregateFunction;
    use quadflow_model::{NamedNode, Variable};

    fn substitution() -> VariableSubstitution {
        let mut bindings = Solution::new();
        bindings.set(
            Variable::new_unchecked("x"),
            NamedNode::new_unchecked("http://example.com/a").into(),
        );
        VariableSubstitution::new(bindings)
    }

    #[test]
    fn substitutes_bound_variables() {
        let expression = Expression::binary(
            BinaryOperator::SameTerm,
            Variable::new_unchecked("x").into(),
            Variable::new_unchecked("y").into(),
        );
        let result = expression.transform(&substitution()).unwrap();
        assert_eq!(result.to_string(), "sameTerm(<http://example.com/a>, ?y)");
    }

    #[test]
    fn folds_bound() {
        let bound_x = Expression::unary(UnaryOperator::Bound, Variable::new_unchecked("x").into());
        let bound_y = Expression::unary(UnaryOperator::Bound, Variable::new_unchecked("y").into());
        let result = Expression::or(bound_x, bound_y)
            .transform(&substitution())
            .unwrap();
        assert_eq!(result.to_string(), "(true || BOUND(?y))");
    }

    #[test]
    fn rejects_aggregates() {
        let expression: Expression = AggregateExpression::new(
            AggregateFunction::Sum,
            Variable::new_unchecked("x").into(),
            false,
        )
        .into();
        assert_eq!(
            expression.transform(&substitution()),
            Err(TransformError::UnsupportedShape {
                transform: "VariableSubstitution",
                shape: ExpressionShape::Aggregate,
            })
        );
    }
}
