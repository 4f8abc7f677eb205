mod aggregate;
mod operators;
mod substitution;
mod transform;

pub use aggregate::*;
pub use operators::*;
pub use substitution::VariableSubstitution;
pub use transform::{ExpressionTransform, TransformError};

use quadflow_model::vocab::xsd;
use quadflow_model::{Literal, Term, Variable};
use std::fmt::{Display, Formatter};

/// The arity class of an [Expression]. Every transform provides one rule per shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExpressionShape {
    Nullary,
    Unary,
    Binary,
    Ternary,
    Nary,
    Aggregate,
}

impl Display for ExpressionShape {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ExpressionShape::Nullary => "nullary",
            ExpressionShape::Unary => "unary",
            ExpressionShape::Binary => "binary",
            ExpressionShape::Ternary => "ternary",
            ExpressionShape::Nary => "n-ary",
            ExpressionShape::Aggregate => "aggregate",
        };
        f.write_str(name)
    }
}

/// An immutable scalar expression.
///
/// Rewriting an expression (see [Expression::transform]) always produces a new tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Expression {
    Constant(Term),
    Variable(Variable),
    Unary(UnaryOperator, Box<Expression>),
    Binary(BinaryOperator, Box<Expression>, Box<Expression>),
    Ternary(
        TernaryOperator,
        Box<Expression>,
        Box<Expression>,
        Box<Expression>,
    ),
    Nary(NaryOperator, Vec<Expression>),
    Aggregate(AggregateExpression),
}

impl Expression {
    pub fn constant(term: impl Into<Term>) -> Self {
        Self::Constant(term.into())
    }

    pub fn variable(variable: Variable) -> Self {
        Self::Variable(variable)
    }

    pub fn unary(operator: UnaryOperator, argument: Expression) -> Self {
        Self::Unary(operator, Box::new(argument))
    }

    pub fn binary(operator: BinaryOperator, lhs: Expression, rhs: Expression) -> Self {
        Self::Binary(operator, Box::new(lhs), Box::new(rhs))
    }

    pub fn ternary(
        operator: TernaryOperator,
        first: Expression,
        second: Expression,
        third: Expression,
    ) -> Self {
        Self::Ternary(operator, Box::new(first), Box::new(second), Box::new(third))
    }

    pub fn nary(operator: NaryOperator, arguments: Vec<Expression>) -> Self {
        Self::Nary(operator, arguments)
    }

    pub fn or(lhs: Expression, rhs: Expression) -> Self {
        Self::binary(BinaryOperator::Or, lhs, rhs)
    }

    pub fn and(lhs: Expression, rhs: Expression) -> Self {
        Self::binary(BinaryOperator::And, lhs, rhs)
    }

    pub fn shape(&self) -> ExpressionShape {
        match self {
            Expression::Constant(_) | Expression::Variable(_) => ExpressionShape::Nullary,
            Expression::Unary(..) => ExpressionShape::Unary,
            Expression::Binary(..) => ExpressionShape::Binary,
            Expression::Ternary(..) => ExpressionShape::Ternary,
            Expression::Nary(..) => ExpressionShape::Nary,
            Expression::Aggregate(_) => ExpressionShape::Aggregate,
        }
    }

    /// Returns the direct children of this expression.
    pub fn children(&self) -> Vec<&Expression> {
        match self {
            Expression::Constant(_) | Expression::Variable(_) => Vec::new(),
            Expression::Unary(_, argument) => vec![argument],
            Expression::Binary(_, lhs, rhs) => vec![lhs, rhs],
            Expression::Ternary(_, first, second, third) => vec![first, second, third],
            Expression::Nary(_, arguments) => arguments.iter().collect(),
            Expression::Aggregate(aggregate) => aggregate.argument().into_iter().collect(),
        }
    }

    /// Returns the variables mentioned in this expression in the order of their first
    /// occurrence.
    pub fn variables(&self) -> Vec<Variable> {
        let mut variables = Vec::new();
        self.collect_variables(&mut variables);
        variables
    }

    fn collect_variables(&self, variables: &mut Vec<Variable>) {
        if let Expression::Variable(variable) = self {
            if !variables.contains(variable) {
                variables.push(variable.clone());
            }
            return;
        }
        for child in self.children() {
            child.collect_variables(variables);
        }
    }

    /// Returns whether the expression contains an aggregate.
    pub fn contains_aggregate(&self) -> bool {
        matches!(self, Expression::Aggregate(_))
            || self.children().into_iter().any(Expression::contains_aggregate)
    }

    /// Rewrites this expression bottom-up using `transform`.
    ///
    /// The children of a node are transformed first. Then, the rule for the node's shape is
    /// invoked with the already transformed children. `self` is not modified.
    pub fn transform<T: ExpressionTransform + ?Sized>(
        &self,
        transform: &T,
    ) -> Result<Expression, TransformError> {
        match self {
            Expression::Constant(_) | Expression::Variable(_) => {
                transform.transform_nullary(self.clone())
            }
            Expression::Unary(operator, argument) => {
                let argument = argument.transform(transform)?;
                transform.transform_unary(*operator, argument)
            }
            Expression::Binary(operator, lhs, rhs) => {
                let lhs = lhs.transform(transform)?;
                let rhs = rhs.transform(transform)?;
                transform.transform_binary(*operator, lhs, rhs)
            }
            Expression::Ternary(operator, first, second, third) => {
                let first = first.transform(transform)?;
                let second = second.transform(transform)?;
                let third = third.transform(transform)?;
                transform.transform_ternary(*operator, first, second, third)
            }
            Expression::Nary(operator, arguments) => {
                let arguments = arguments
                    .iter()
                    .map(|argument| argument.transform(transform))
                    .collect::<Result<Vec<_>, _>>()?;
                transform.transform_nary(operator.clone(), arguments)
            }
            Expression::Aggregate(aggregate) => {
                let argument = aggregate
                    .argument()
                    .map(|argument| argument.transform(transform))
                    .transpose()?;
                transform.transform_aggregate(AggregateExpression {
                    function: aggregate.function.clone(),
                    argument: argument.map(Box::new),
                    distinct: aggregate.distinct,
                })
            }
        }
    }
}

impl From<Variable> for Expression {
    fn from(variable: Variable) -> Self {
        Self::Variable(variable)
    }
}

impl From<Term> for Expression {
    fn from(term: Term) -> Self {
        Self::Constant(term)
    }
}

impl From<Literal> for Expression {
    fn from(literal: Literal) -> Self {
        Self::Constant(literal.into())
    }
}

impl From<AggregateExpression> for Expression {
    fn from(aggregate: AggregateExpression) -> Self {
        Self::Aggregate(aggregate)
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Expression::Constant(term) => fmt_constant(term, f),
            Expression::Variable(variable) => write!(f, "{variable}"),
            Expression::Unary(operator, argument) if operator.is_prefix() => {
                write!(f, "{operator}{argument}")
            }
            Expression::Unary(operator, argument) => write!(f, "{operator}({argument})"),
            Expression::Binary(operator, lhs, rhs) if operator.is_infix() => {
                write!(f, "({lhs} {operator} {rhs})")
            }
            Expression::Binary(operator, lhs, rhs) => write!(f, "{operator}({lhs}, {rhs})"),
            Expression::Ternary(operator, first, second, third) => {
                write!(f, "{operator}({first}, {second}, {third})")
            }
            Expression::Nary(NaryOperator::In, arguments) => match arguments.split_first() {
                Some((needle, haystack)) => {
                    write!(f, "({needle} IN (")?;
                    fmt_list(haystack, f)?;
                    f.write_str("))")
                }
                None => f.write_str("IN()"),
            },
            Expression::Nary(operator, arguments) => {
                write!(f, "{operator}(")?;
                fmt_list(arguments, f)?;
                f.write_str(")")
            }
            Expression::Aggregate(aggregate) => write!(f, "{aggregate}"),
        }
    }
}

/// Integers and booleans are printed in their abbreviated form.
fn fmt_constant(term: &Term, f: &mut Formatter<'_>) -> std::fmt::Result {
    match term {
        Term::Literal(literal)
            if literal.datatype() == xsd::INTEGER || literal.datatype() == xsd::BOOLEAN =>
        {
            f.write_str(literal.value())
        }
        _ => write!(f, "{term}"),
    }
}

fn fmt_list(expressions: &[Expression], f: &mut Formatter<'_>) -> std::fmt::Result {
    for (i, expression) in expressions.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{expression}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadflow_model::NamedNode;

    fn var(name: &str) -> Expression {
        Expression::variable(Variable::new_unchecked(name))
    }

    #[test]
    fn display_expressions() {
        let expression = Expression::and(
            Expression::binary(BinaryOperator::Greater, var("x"), Literal::from(0_i64).into()),
            Expression::unary(
                UnaryOperator::Not,
                Expression::unary(UnaryOperator::Bound, var("y")),
            ),
        );
        assert_eq!(expression.to_string(), "((?x > 0) && !BOUND(?y))");

        let expression = Expression::nary(
            NaryOperator::In,
            vec![var("x"), Literal::from(1_i64).into(), Literal::from("a").into()],
        );
        assert_eq!(expression.to_string(), "(?x IN (1, \"a\"))");

        let expression = Expression::nary(
            NaryOperator::Function(NamedNode::new_unchecked("http://example.com/f")),
            vec![var("x")],
        );
        assert_eq!(expression.to_string(), "<http://example.com/f>(?x)");

        let expression: Expression = AggregateExpression::new(
            AggregateFunction::GroupConcat {
                separator: ",".to_owned(),
            },
            var("x"),
            true,
        )
        .into();
        assert_eq!(
            expression.to_string(),
            "GROUP_CONCAT(DISTINCT ?x; SEPARATOR=\",\")"
        );
        assert_eq!(AggregateExpression::count_all(false).to_string(), "COUNT(*)");
    }

    #[test]
    fn variables_in_order_of_occurrence() {
        let expression = Expression::ternary(
            TernaryOperator::If,
            var("b"),
            Expression::binary(BinaryOperator::Add, var("a"), var("b")),
            var("c"),
        );
        assert_eq!(
            expression.variables(),
            vec![
                Variable::new_unchecked("b"),
                Variable::new_unchecked("a"),
                Variable::new_unchecked("c")
            ]
        );
    }

    #[test]
    fn shapes() {
        assert_eq!(var("x").shape(), ExpressionShape::Nullary);
        assert_eq!(
            Expression::from(AggregateExpression::count_all(false)).shape(),
            ExpressionShape::Aggregate
        );
        assert!(Expression::unary(
            UnaryOperator::Str,
            AggregateExpression::new(AggregateFunction::Max, var("x"), false).into()
        )
        .contains_aggregate());
    }
}
