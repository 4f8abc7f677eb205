use crate::ExpressionEvaluator;
use quadflow_logical::expr::{
    AggregateExpression, BinaryOperator, NaryOperator, TernaryOperator, UnaryOperator,
};
use quadflow_logical::{Expression, ExpressionTransform, TransformError};
use quadflow_model::Solution;

/// Replaces sub-trees without variables by their value.
///
/// Sub-trees that fail to evaluate are kept so that the error is raised during query
/// evaluation. Aggregates and calls of custom functions are never folded.
#[derive(Clone, Debug, Default)]
pub struct ConstantFolder {
    evaluator: ExpressionEvaluator,
}

impl ConstantFolder {
    pub fn new(evaluator: ExpressionEvaluator) -> Self {
        Self { evaluator }
    }

    fn fold(&self, expression: Expression) -> Expression {
        let foldable = expression
            .children()
            .iter()
            .all(|child| matches!(child, Expression::Constant(_)));
        if !foldable {
            return expression;
        }
        match self.evaluator.evaluate(&expression, &Solution::new()) {
            Ok(value) => Expression::Constant(value),
            Err(_) => expression,
        }
    }
}

impl ExpressionTransform for ConstantFolder {
    fn transform_nullary(&self, expression: Expression) -> Result<Expression, TransformError> {
        Ok(expression)
    }

    fn transform_unary(
        &self,
        operator: UnaryOperator,
        argument: Expression,
    ) -> Result<Expression, TransformError> {
        Ok(self.fold(Expression::unary(operator, argument)))
    }

    fn transform_binary(
        &self,
        operator: BinaryOperator,
        lhs: Expression,
        rhs: Expression,
    ) -> Result<Expression, TransformError> {
        Ok(self.fold(Expression::binary(operator, lhs, rhs)))
    }

    fn transform_ternary(
        &self,
        operator: TernaryOperator,
        first: Expression,
        second: Expression,
        third: Expression,
    ) -> Result<Expression, TransformError> {
        Ok(self.fold(Expression::ternary(operator, first, second, third)))
    }

    fn transform_nary(
        &self,
        operator: NaryOperator,
        arguments: Vec<Expression>,
    ) -> Result<Expression, TransformError> {
        let is_custom_function = matches!(operator, NaryOperator::Function(_));
        let expression = Expression::nary(operator, arguments);
        if is_custom_function {
            return Ok(expression);
        }
        Ok(self.fold(expression))
    }

    fn transform_aggregate(
        &self,
        aggregate: AggregateExpression,
    ) -> Result<Expression, TransformError> {
        Ok(aggregate.into())
    }
}
