use crate::builtin::boolean;
use crate::registry::{FunctionArity, ScalarFunction};
use crate::xpath::strings::{binary_string_args, xpath_function_name};
use quadflow_common::error::ExpressionError;
use quadflow_model::{NamedNode, NamedNodeRef, Term};

/// Implementation of `fn:starts-with`.
///
/// The empty prefix matches every string. The empty string only starts with the empty prefix.
#[derive(Debug)]
pub struct StartsWithFunction {
    name: NamedNode,
}

impl Default for StartsWithFunction {
    fn default() -> Self {
        Self::new()
    }
}

impl StartsWithFunction {
    pub fn new() -> Self {
        Self {
            name: xpath_function_name("starts-with"),
        }
    }
}

impl ScalarFunction for StartsWithFunction {
    fn name(&self) -> NamedNodeRef<'_> {
        self.name.as_ref()
    }

    fn arity(&self) -> FunctionArity {
        FunctionArity::Fixed(2)
    }

    fn invoke(&self, args: &[Term]) -> Result<Term, ExpressionError> {
        let (value, prefix) = binary_string_args(&self.name, args)?;

        let result = match (value.is_empty(), prefix.is_empty()) {
            (true, prefix_is_empty) => prefix_is_empty,
            (false, true) => true,
            (false, false) => value.starts_with(prefix),
        };
        Ok(boolean(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadflow_model::Literal;

    fn invoke(value: &str, prefix: &str) -> Term {
        StartsWithFunction::new()
            .invoke(&[
                Literal::new_simple_literal(value).into(),
                Literal::new_simple_literal(prefix).into(),
            ])
            .unwrap()
    }

    #[test]
    fn empty_strings() {
        assert_eq!(invoke("", ""), boolean(true));
        assert_eq!(invoke("", "a"), boolean(false));
        assert_eq!(invoke("abc", ""), boolean(true));
    }

    #[test]
    fn prefixes() {
        assert_eq!(invoke("abc", "ab"), boolean(true));
        assert_eq!(invoke("abc", "bc"), boolean(false));
    }

    #[test]
    fn non_string_arguments_fail() {
        let result = StartsWithFunction::new().invoke(&[
            Literal::from(1_i64).into(),
            Literal::new_simple_literal("1").into(),
        ]);
        assert!(matches!(result, Err(ExpressionError::TypeError(_))));
    }
}
