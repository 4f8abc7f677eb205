use crate::builtin::boolean;
use crate::registry::{FunctionArity, ScalarFunction};
use crate::xpath::strings::{binary_string_args, xpath_function_name};
use quadflow_common::error::ExpressionError;
use quadflow_model::{NamedNode, NamedNodeRef, Term};

/// Implementation of `fn:contains`.
#[derive(Debug)]
pub struct ContainsFunction {
    name: NamedNode,
}

impl Default for ContainsFunction {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainsFunction {
    pub fn new() -> Self {
        Self {
            name: xpath_function_name("contains"),
        }
    }
}

impl ScalarFunction for ContainsFunction {
    fn name(&self) -> NamedNodeRef<'_> {
        self.name.as_ref()
    }

    fn arity(&self) -> FunctionArity {
        FunctionArity::Fixed(2)
    }

    fn invoke(&self, args: &[Term]) -> Result<Term, ExpressionError> {
        let (value, part) = binary_string_args(&self.name, args)?;
        Ok(boolean(value.contains(part)))
    }
}
