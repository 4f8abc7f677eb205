use crate::error::StorageError;
use quadflow_model::{GraphName, GraphNameRef, NamedNodeRef, Quad, QuadRef, SubjectRef, TermRef};

/// A lazily evaluated sequence of quads returned by a [QuadStorage].
pub type QuadIter = Box<dyn Iterator<Item = Result<Quad, StorageError>>>;

/// The capabilities a backend must provide to be queried through a dataset.
///
/// All pattern matching is done by the backend. Implementations are responsible for serializing
/// concurrent mutations.
pub trait QuadStorage: Send + Sync {
    /// Returns the names of all graphs in the storage.
    ///
    /// [GraphName::DefaultGraph] is included if the default graph contains any quads.
    fn graph_names(&self) -> Result<Vec<GraphName>, StorageError>;

    /// Returns whether `graph_name` is a graph in the storage.
    fn contains_graph(&self, graph_name: GraphNameRef<'_>) -> Result<bool, StorageError>;

    /// Returns the quads of `graph_name` that match the given pattern. `None` matches any term.
    fn quads_for_pattern(
        &self,
        graph_name: GraphNameRef<'_>,
        subject: Option<SubjectRef<'_>>,
        predicate: Option<NamedNodeRef<'_>>,
        object: Option<TermRef<'_>>,
    ) -> Result<QuadIter, StorageError>;

    /// Creates an empty graph. Returns `false` if the graph already exists.
    fn insert_graph(&self, graph_name: GraphNameRef<'_>) -> Result<bool, StorageError>;

    /// Inserts a quad. Returns `false` if the quad was already present.
    fn insert(&self, quad: QuadRef<'_>) -> Result<bool, StorageError>;

    /// Removes a quad. Returns `false` if the quad was not present.
    fn remove(&self, quad: QuadRef<'_>) -> Result<bool, StorageError>;

    /// Removes all quads of a graph but keeps the graph.
    fn clear_graph(&self, graph_name: GraphNameRef<'_>) -> Result<(), StorageError>;

    /// Removes a named graph with all its quads. Returns `false` if the graph did not exist.
    fn remove_graph(&self, graph_name: GraphNameRef<'_>) -> Result<bool, StorageError>;

    /// Persists pending changes.
    fn flush(&self) -> Result<(), StorageError> {
        Ok(())
    }

    /// Discards pending changes.
    fn discard(&self) -> Result<(), StorageError> {
        Ok(())
    }
}
