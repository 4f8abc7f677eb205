use crate::builtin::{boolean, logical, numeric, strings, terms};
use crate::ordering::{compare_values, effective_boolean_value, equal_values};
use crate::registry::{DefaultFunctionRegistry, FunctionRegistryRef};
use quadflow_common::error::ExpressionError;
use quadflow_logical::expr::{BinaryOperator, NaryOperator, TernaryOperator, UnaryOperator};
use quadflow_logical::Expression;
use quadflow_model::{NamedNode, Solution, Term};
use std::cmp::Ordering;
use std::sync::Arc;

/// Evaluates expressions against a single [Solution].
///
/// Custom functions are resolved through a [FunctionRegistryRef].
#[derive(Clone, Debug)]
pub struct ExpressionEvaluator {
    registry: FunctionRegistryRef,
}

impl ExpressionEvaluator {
    pub fn new(registry: FunctionRegistryRef) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &FunctionRegistryRef {
        &self.registry
    }

    /// Computes the value of `expression` for `solution`.
    pub fn evaluate(
        &self,
        expression: &Expression,
        solution: &Solution,
    ) -> Result<Term, ExpressionError> {
        match expression {
            Expression::Constant(term) => Ok(term.clone()),
            Expression::Variable(variable) => solution
                .get(variable)
                .cloned()
                .ok_or_else(|| ExpressionError::UnboundVariable(variable.clone())),
            Expression::Unary(operator, argument) => {
                self.evaluate_unary(*operator, argument, solution)
            }
            Expression::Binary(operator, lhs, rhs) => {
                self.evaluate_binary(*operator, lhs, rhs, solution)
            }
            Expression::Ternary(operator, first, second, third) => {
                self.evaluate_ternary(*operator, first, second, third, solution)
            }
            Expression::Nary(operator, arguments) => {
                self.evaluate_nary(operator, arguments, solution)
            }
            Expression::Aggregate(aggregate) => Err(ExpressionError::AggregateOutsideGroup(
                aggregate.to_string(),
            )),
        }
    }

    /// Computes the effective boolean value of `expression` for `solution`.
    pub fn evaluate_ebv(
        &self,
        expression: &Expression,
        solution: &Solution,
    ) -> Result<bool, ExpressionError> {
        effective_boolean_value(&self.evaluate(expression, solution)?)
    }

    fn evaluate_unary(
        &self,
        operator: UnaryOperator,
        argument: &Expression,
        solution: &Solution,
    ) -> Result<Term, ExpressionError> {
        let value = || self.evaluate(argument, solution);
        match operator {
            UnaryOperator::Not => Ok(boolean(!self.evaluate_ebv(argument, solution)?)),
            UnaryOperator::Bound => Ok(boolean(match argument {
                Expression::Variable(variable) => solution.contains(variable),
                argument => self.evaluate(argument, solution).is_ok(),
            })),
            UnaryOperator::Plus => numeric::plus(&value()?),
            UnaryOperator::Minus => numeric::minus(&value()?),
            UnaryOperator::IsIri => Ok(terms::is_iri(&value()?)),
            UnaryOperator::IsBlank => Ok(terms::is_blank(&value()?)),
            UnaryOperator::IsLiteral => Ok(terms::is_literal(&value()?)),
            UnaryOperator::IsNumeric => Ok(terms::is_numeric(&value()?)),
            UnaryOperator::Str => terms::str(&value()?),
            UnaryOperator::Lang => terms::lang(&value()?),
            UnaryOperator::Datatype => terms::datatype(&value()?),
            UnaryOperator::StrLen => strings::strlen(&value()?),
            UnaryOperator::UCase => strings::ucase(&value()?),
            UnaryOperator::LCase => strings::lcase(&value()?),
        }
    }

    fn evaluate_binary(
        &self,
        operator: BinaryOperator,
        lhs: &Expression,
        rhs: &Expression,
        solution: &Solution,
    ) -> Result<Term, ExpressionError> {
        let values = || -> Result<(Term, Term), ExpressionError> {
            Ok((
                self.evaluate(lhs, solution)?,
                self.evaluate(rhs, solution)?,
            ))
        };
        let compare = |accept: fn(Ordering) -> bool| -> Result<Term, ExpressionError> {
            let (lhs, rhs) = values()?;
            let ordering = compare_values(&lhs, &rhs)?;
            Ok(boolean(ordering.is_some_and(accept)))
        };

        match operator {
            BinaryOperator::Or => logical::or(self.evaluate_ebv(lhs, solution), || {
                self.evaluate_ebv(rhs, solution)
            })
            .map(boolean),
            BinaryOperator::And => logical::and(self.evaluate_ebv(lhs, solution), || {
                self.evaluate_ebv(rhs, solution)
            })
            .map(boolean),
            BinaryOperator::Equal => {
                let (lhs, rhs) = values()?;
                equal_values(&lhs, &rhs).map(boolean)
            }
            BinaryOperator::SameTerm => {
                let (lhs, rhs) = values()?;
                Ok(boolean(lhs == rhs))
            }
            BinaryOperator::Greater => compare(Ordering::is_gt),
            BinaryOperator::GreaterOrEqual => compare(Ordering::is_ge),
            BinaryOperator::Less => compare(Ordering::is_lt),
            BinaryOperator::LessOrEqual => compare(Ordering::is_le),
            BinaryOperator::Add => {
                let (lhs, rhs) = values()?;
                numeric::add(&lhs, &rhs)
            }
            BinaryOperator::Subtract => {
                let (lhs, rhs) = values()?;
                numeric::subtract(&lhs, &rhs)
            }
            BinaryOperator::Multiply => {
                let (lhs, rhs) = values()?;
                numeric::multiply(&lhs, &rhs)
            }
            BinaryOperator::Divide => {
                let (lhs, rhs) = values()?;
                numeric::divide(&lhs, &rhs)
            }
            BinaryOperator::StrStarts => {
                let (lhs, rhs) = values()?;
                strings::str_starts(&lhs, &rhs)
            }
            BinaryOperator::StrEnds => {
                let (lhs, rhs) = values()?;
                strings::str_ends(&lhs, &rhs)
            }
            BinaryOperator::Contains => {
                let (lhs, rhs) = values()?;
                strings::contains(&lhs, &rhs)
            }
            BinaryOperator::LangMatches => {
                let (lhs, rhs) = values()?;
                strings::lang_matches(&lhs, &rhs)
            }
        }
    }

    fn evaluate_ternary(
        &self,
        operator: TernaryOperator,
        first: &Expression,
        second: &Expression,
        third: &Expression,
        solution: &Solution,
    ) -> Result<Term, ExpressionError> {
        match operator {
            TernaryOperator::If => {
                if self.evaluate_ebv(first, solution)? {
                    self.evaluate(second, solution)
                } else {
                    self.evaluate(third, solution)
                }
            }
            TernaryOperator::Substr => strings::substr(
                &self.evaluate(first, solution)?,
                &self.evaluate(second, solution)?,
                Some(&self.evaluate(third, solution)?),
            ),
        }
    }

    fn evaluate_nary(
        &self,
        operator: &NaryOperator,
        arguments: &[Expression],
        solution: &Solution,
    ) -> Result<Term, ExpressionError> {
        match operator {
            NaryOperator::Coalesce => arguments
                .iter()
                .find_map(|argument| self.evaluate(argument, solution).ok())
                .ok_or_else(|| ExpressionError::Evaluation {
                    message: "COALESCE has no argument that evaluates without error".to_owned(),
                    source: None,
                }),
            NaryOperator::Concat => {
                let values = self.evaluate_all(arguments, solution)?;
                strings::concat(&values)
            }
            NaryOperator::In => self.evaluate_in(arguments, solution),
            NaryOperator::Function(name) => self.evaluate_function(name, arguments, solution),
        }
    }

    /// `IN` is `true` if any candidate is equal to the needle. If no candidate is equal, the
    /// first error raised while comparing is returned.
    fn evaluate_in(
        &self,
        arguments: &[Expression],
        solution: &Solution,
    ) -> Result<Term, ExpressionError> {
        let Some((needle, candidates)) = arguments.split_first() else {
            return Err(ExpressionError::type_error("IN requires a left-hand side"));
        };
        let needle = self.evaluate(needle, solution)?;

        let mut error = None;
        for candidate in candidates {
            let result = self
                .evaluate(candidate, solution)
                .and_then(|candidate| equal_values(&needle, &candidate));
            match result {
                Ok(true) => return Ok(boolean(true)),
                Ok(false) => {}
                Err(err) => {
                    error.get_or_insert(err);
                }
            }
        }

        match error {
            Some(error) => Err(error),
            None => Ok(boolean(false)),
        }
    }

    fn evaluate_function(
        &self,
        name: &NamedNode,
        arguments: &[Expression],
        solution: &Solution,
    ) -> Result<Term, ExpressionError> {
        let function = self
            .registry
            .function(name.as_ref())
            .ok_or_else(|| ExpressionError::UnknownFunction(name.as_str().to_owned()))?;
        if !function.arity().accepts(arguments.len()) {
            return Err(ExpressionError::ArityMismatch {
                name: name.to_string(),
                expected: match function.arity() {
                    crate::FunctionArity::Fixed(expected) => expected,
                    crate::FunctionArity::Variadic => arguments.len(),
                },
                actual: arguments.len(),
            });
        }
        let values = self.evaluate_all(arguments, solution)?;
        function.invoke(&values)
    }

    fn evaluate_all(
        &self,
        arguments: &[Expression],
        solution: &Solution,
    ) -> Result<Vec<Term>, ExpressionError> {
        arguments
            .iter()
            .map(|argument| self.evaluate(argument, solution))
            .collect()
    }
}

impl Default for ExpressionEvaluator {
    fn default() -> Self {
        Self::new(Arc::new(DefaultFunctionRegistry::new()))
    }
}
