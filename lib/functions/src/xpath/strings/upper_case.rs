use crate::registry::{FunctionArity, ScalarFunction};
use crate::xpath::strings::{unary_string_arg, xpath_function_name};
use quadflow_common::error::ExpressionError;
use quadflow_model::{Literal, NamedNode, NamedNodeRef, Term};

/// Implementation of `fn:upper-case`. The result is an `xsd:string`.
#[derive(Debug)]
pub struct UpperCaseFunction {
    name: NamedNode,
}

impl Default for UpperCaseFunction {
    fn default() -> Self {
        Self::new()
    }
}

impl UpperCaseFunction {
    pub fn new() -> Self {
        Self {
            name: xpath_function_name("upper-case"),
        }
    }
}

impl ScalarFunction for UpperCaseFunction {
    fn name(&self) -> NamedNodeRef<'_> {
        self.name.as_ref()
    }

    fn arity(&self) -> FunctionArity {
        FunctionArity::Fixed(1)
    }

    fn invoke(&self, args: &[Term]) -> Result<Term, ExpressionError> {
        let value = unary_string_arg(&self.name, args)?;
        Ok(Literal::new_simple_literal(value.to_uppercase()).into())
    }
}
