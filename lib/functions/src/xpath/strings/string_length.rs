use crate::registry::{FunctionArity, ScalarFunction};
use crate::xpath::strings::{unary_string_arg, xpath_function_name};
use quadflow_common::error::ExpressionError;
use quadflow_model::{Literal, NamedNode, NamedNodeRef, Term};

/// Implementation of `fn:string-length`. Counts characters, not bytes.
#[derive(Debug)]
pub struct StringLengthFunction {
    name: NamedNode,
}

impl Default for StringLengthFunction {
    fn default() -> Self {
        Self::new()
    }
}

impl StringLengthFunction {
    pub fn new() -> Self {
        Self {
            name: xpath_function_name("string-length"),
        }
    }
}

impl ScalarFunction for StringLengthFunction {
    fn name(&self) -> NamedNodeRef<'_> {
        self.name.as_ref()
    }

    fn arity(&self) -> FunctionArity {
        FunctionArity::Fixed(1)
    }

    fn invoke(&self, args: &[Term]) -> Result<Term, ExpressionError> {
        let value = unary_string_arg(&self.name, args)?;
        let length = i64::try_from(value.chars().count())
            .map_err(|_| ExpressionError::type_error("String too long"))?;
        Ok(Literal::from(length).into())
    }
}
