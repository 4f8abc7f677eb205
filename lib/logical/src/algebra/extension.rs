use crate::algebra::Algebra;
use quadflow_model::Variable;
use std::any::Any;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// A user-defined algebra node.
///
/// Extension nodes are executed by an extension executor that is registered with the algebra
/// executor. This allows supporting new node kinds without changing [Algebra].
pub trait AlgebraExtension: Debug + Send + Sync + 'static {
    /// The name of the node kind. Used for dispatching to an extension executor.
    fn name(&self) -> &str;

    /// The inner algebra nodes.
    fn inputs(&self) -> Vec<&Algebra>;

    /// The variables that are in scope after evaluating this node.
    fn variables(&self) -> Vec<Variable>;

    /// Writes a single-line description of this node (without its inputs).
    fn fmt_for_explain(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }

    fn as_any(&self) -> &dyn Any;

    /// Structural equality with another extension node.
    fn dyn_eq(&self, other: &dyn AlgebraExtension) -> bool;
}

/// A shared handle to an [AlgebraExtension].
#[derive(Clone, Debug)]
pub struct ExtensionNode(Arc<dyn AlgebraExtension>);

impl ExtensionNode {
    pub fn new(node: impl AlgebraExtension) -> Self {
        Self(Arc::new(node))
    }

    pub fn node(&self) -> &dyn AlgebraExtension {
        self.0.as_ref()
    }

    /// Returns the node as `T` if it is of this type.
    pub fn downcast_ref<T: AlgebraExtension>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref()
    }
}

impl PartialEq for ExtensionNode {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0.dyn_eq(other.0.as_ref())
    }
}

impl Eq for ExtensionNode {}
