mod contains;
mod ends_with;
mod lower_case;
mod starts_with;
mod string_length;
mod upper_case;

pub use contains::ContainsFunction;
pub use ends_with::EndsWithFunction;
pub use lower_case::LowerCaseFunction;
pub use starts_with::StartsWithFunction;
pub use string_length::StringLengthFunction;
pub use upper_case::UpperCaseFunction;

use crate::xpath::XPATH_FUNCTIONS_NAMESPACE;
use quadflow_common::error::ExpressionError;
use quadflow_model::vocab::xsd;
use quadflow_model::{NamedNode, Term};

fn xpath_function_name(local_name: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("{XPATH_FUNCTIONS_NAMESPACE}{local_name}"))
}

/// XPath string functions accept simple, `xsd:string` and language-tagged literals and operate
/// on their lexical form.
fn string_value<'a>(function: &NamedNode, term: &'a Term) -> Result<&'a str, ExpressionError> {
    match term {
        Term::Literal(literal)
            if literal.language().is_some() || literal.datatype() == xsd::STRING =>
        {
            Ok(literal.value())
        }
        _ => Err(ExpressionError::type_error(format!(
            "{function} expects string arguments but got {term}"
        ))),
    }
}

fn unary_string_arg<'a>(
    function: &NamedNode,
    args: &'a [Term],
) -> Result<&'a str, ExpressionError> {
    match args {
        [value] => string_value(function, value),
        _ => Err(arity_mismatch(function, 1, args.len())),
    }
}

fn binary_string_args<'a>(
    function: &NamedNode,
    args: &'a [Term],
) -> Result<(&'a str, &'a str), ExpressionError> {
    match args {
        [lhs, rhs] => Ok((string_value(function, lhs)?, string_value(function, rhs)?)),
        _ => Err(arity_mismatch(function, 2, args.len())),
    }
}

fn arity_mismatch(function: &NamedNode, expected: usize, actual: usize) -> ExpressionError {
    ExpressionError::ArityMismatch {
        name: function.to_string(),
        expected,
        actual,
    }
}
