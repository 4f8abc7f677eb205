pub mod aggregates;
mod builtin;
mod evaluator;
mod folding;
mod ordering;
pub mod registry;
pub mod xpath;

pub use evaluator::ExpressionEvaluator;
pub use folding::ConstantFolder;
pub use ordering::{compare_terms, compare_values, effective_boolean_value, equal_values};
pub use registry::{
    DefaultFunctionRegistry, FunctionArity, FunctionRegistry, FunctionRegistryRef,
    ScalarFunction,
};
