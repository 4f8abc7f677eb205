use crate::builtin::boolean;
use crate::registry::{FunctionArity, ScalarFunction};
use crate::xpath::strings::{binary_string_args, xpath_function_name};
use quadflow_common::error::ExpressionError;
use quadflow_model::{NamedNode, NamedNodeRef, Term};

/// Implementation of `fn:ends-with`.
#[derive(Debug)]
pub struct EndsWithFunction {
    name: NamedNode,
}

impl Default for EndsWithFunction {
    fn default() -> Self {
        Self::new()
    }
}

impl EndsWithFunction {
    pub fn new() -> Self {
        Self {
            name: xpath_function_name("ends-with"),
        }
    }
}

impl ScalarFunction for EndsWithFunction {
    fn name(&self) -> NamedNodeRef<'_> {
        self.name.as_ref()
    }

    fn arity(&self) -> FunctionArity {
        FunctionArity::Fixed(2)
    }

    fn invoke(&self, args: &[Term]) -> Result<Term, ExpressionError> {
        let (value, suffix) = binary_string_args(&self.name, args)?;
        Ok(boolean(value.ends_with(suffix)))
    }
}
