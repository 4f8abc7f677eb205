use crate::xpath;
use quadflow_common::error::ExpressionError;
use quadflow_model::{NamedNode, NamedNodeRef, Term};
use rustc_hash::FxHashMap;
use std::fmt::Debug;
use std::sync::Arc;

/// Defines the number of arguments that a [ScalarFunction] accepts.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum FunctionArity {
    /// A fixed number of arguments.
    Fixed(usize),
    /// Any number of arguments (including zero).
    Variadic,
}

impl FunctionArity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            FunctionArity::Fixed(expected) => expected == count,
            FunctionArity::Variadic => true,
        }
    }
}

/// A function that is called by its IRI from an expression.
///
/// Implementations outside of this crate should report failures as
/// [ExpressionError::Function].
pub trait ScalarFunction: Debug + Send + Sync {
    /// The IRI of the function.
    fn name(&self) -> NamedNodeRef<'_>;

    fn arity(&self) -> FunctionArity;

    /// Computes the result for already evaluated arguments. The number of arguments has been
    /// checked against [Self::arity].
    fn invoke(&self, args: &[Term]) -> Result<Term, ExpressionError>;
}

/// A reference-counted pointer to an implementation of the [FunctionRegistry] trait.
pub type FunctionRegistryRef = Arc<dyn FunctionRegistry>;

/// Resolves function IRIs used in expressions.
pub trait FunctionRegistry: Debug + Send + Sync {
    /// Returns the function with the given IRI.
    fn function(&self, name: NamedNodeRef<'_>) -> Option<Arc<dyn ScalarFunction>>;

    /// Returns the IRIs of all registered functions.
    fn function_names(&self) -> Vec<NamedNode>;
}

/// A registry backed by a hash map.
///
/// [DefaultFunctionRegistry::new] registers the XPath string functions (see [xpath]).
#[derive(Debug)]
pub struct DefaultFunctionRegistry {
    functions: FxHashMap<String, Arc<dyn ScalarFunction>>,
}

impl DefaultFunctionRegistry {
    /// Creates a registry with the built-in functions.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        xpath::register_string_functions(&mut registry);
        registry
    }

    /// Creates a registry without any function.
    pub fn empty() -> Self {
        Self {
            functions: FxHashMap::default(),
        }
    }

    /// Registers `function` and returns the function it replaced.
    pub fn register(
        &mut self,
        function: Arc<dyn ScalarFunction>,
    ) -> Option<Arc<dyn ScalarFunction>> {
        self.functions
            .insert(function.name().as_str().to_owned(), function)
    }
}

impl Default for DefaultFunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionRegistry for DefaultFunctionRegistry {
    fn function(&self, name: NamedNodeRef<'_>) -> Option<Arc<dyn ScalarFunction>> {
        self.functions.get(name.as_str()).map(Arc::clone)
    }

    fn function_names(&self) -> Vec<NamedNode> {
        let mut names = self.functions.keys().collect::<Vec<_>>();
        names.sort();
        names
            .into_iter()
            .map(|name| NamedNode::new_unchecked(name.as_str()))
            .collect()
    }
}
