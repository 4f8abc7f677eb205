//! Functions of the [XPath and XQuery Functions and Operators](https://www.w3.org/TR/xpath-functions-31/)
//! specification that are called by their IRI.

mod strings;

pub use strings::*;

use crate::registry::DefaultFunctionRegistry;
use std::sync::Arc;

/// The namespace of the XPath functions.
pub const XPATH_FUNCTIONS_NAMESPACE: &str = "http://www.w3.org/2005/xpath-functions#";

/// Registers the XPath string functions in `registry`.
pub fn register_string_functions(registry: &mut DefaultFunctionRegistry) {
    registry.register(Arc::new(StartsWithFunction::new()));
    registry.register(Arc::new(EndsWithFunction::new()));
    registry.register(Arc::new(ContainsFunction::new()));
    registry.register(Arc::new(UpperCaseFunction::new()));
    registry.register(Arc::new(LowerCaseFunction::new()));
    registry.register(Arc::new(StringLengthFunction::new()));
}
