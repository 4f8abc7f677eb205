mod config;
mod scopes;
mod triples;

pub use config::DatasetConfig;
pub use triples::TripleIter;

use crate::dataset::scopes::{unique_graph_names, GraphScopes};
use crate::dataset::triples::GraphUnionIter;
use dashmap::DashMap;
use quadflow_common::error::{StorageError, UsageError};
use quadflow_common::{QuadStorage, ScopeId};
use quadflow_model::{
    GraphName, GraphNameRef, NamedNodeRef, Quad, QuadRef, SubjectRef, TermRef, Triple, TripleRef,
};
use rustc_hash::FxBuildHasher;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// A scope-aware view on a [QuadStorage] that implements the active and default graphs of
/// SPARQL.
///
/// # Scopes
///
/// Every query owns a [ScopeId] (see [ExecutionContext](quadflow_common::ExecutionContext)). For
/// each scope, the dataset keeps two stacks of graph name sets:
///
/// - The *default graph* stack. If it is empty, the default graph is the union of all graphs
///   (with [DatasetConfig::union_default_graph]) or empty. If the dataset is configured with a
///   fixed default graph, the stack initially holds this graph.
/// - The *active graph* stack. If it is empty, the active graph is the default graph.
///
/// The stacks of a scope are created on first use and discarded once both stacks are back in
/// their initial state. Queries running concurrently on the same dataset use different scopes
/// and never observe each other's stacks. The caller must balance every push with a pop.
///
/// # Retrieval
///
/// All triple retrieval operations read from the *active* graph. They resolve the graph names
/// when called and return a lazy [TripleIter] that queries the storage graph by graph.
pub struct QuadDataset {
    storage: Arc<dyn QuadStorage>,
    config: DatasetConfig,
    /// The default graph stack of a fresh scope.
    initial_default_graphs: Vec<Vec<GraphName>>,
    scopes: DashMap<ScopeId, GraphScopes, FxBuildHasher>,
}

impl QuadDataset {
    /// Creates a new dataset that uses the union of all graphs as its default graph.
    pub fn new(storage: Arc<dyn QuadStorage>) -> Self {
        Self::with_config(storage, DatasetConfig::default())
    }

    pub fn with_config(storage: Arc<dyn QuadStorage>, config: DatasetConfig) -> Self {
        let initial_default_graphs = if config.union_default_graph {
            Vec::new()
        } else {
            vec![vec![config.default_graph.clone()]]
        };
        Self {
            storage,
            config,
            initial_default_graphs,
            scopes: DashMap::with_hasher(FxBuildHasher),
        }
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<dyn QuadStorage> {
        &self.storage
    }

    pub fn uses_union_default_graph(&self) -> bool {
        self.config.union_default_graph
    }

    /// Returns the number of scopes with pushed graph names.
    pub fn open_scopes(&self) -> usize {
        self.scopes.len()
    }

    //
    // Default and active graph management
    //

    /// Pushes `graphs` onto the default graph stack of `scope`.
    pub fn set_default_graph(&self, scope: ScopeId, graphs: impl IntoIterator<Item = GraphName>) {
        let graphs = unique_graph_names(graphs);
        tracing::trace!("Pushing default graph {graphs:?} in {scope}");
        self.scopes
            .entry(scope)
            .or_insert_with(|| GraphScopes::new(self.initial_default_graphs.clone()))
            .default_graphs
            .push(graphs);
    }

    /// Pushes `graphs` onto the active graph stack of `scope`.
    ///
    /// [GraphName::DefaultGraph] is replaced by the current default graph names of `scope`.
    pub fn set_active_graph(
        &self,
        scope: ScopeId,
        graphs: impl IntoIterator<Item = GraphName>,
    ) -> Result<(), StorageError> {
        let mut resolved = Vec::new();
        for graph in graphs {
            if graph.is_default_graph() {
                resolved.extend(self.default_graph_names(scope)?);
            } else {
                resolved.push(graph);
            }
        }

        let graphs = unique_graph_names(resolved);
        tracing::trace!("Pushing active graph {graphs:?} in {scope}");
        self.scopes
            .entry(scope)
            .or_insert_with(|| GraphScopes::new(self.initial_default_graphs.clone()))
            .active_graphs
            .push(graphs);
        Ok(())
    }

    /// Pops the default graph stack of `scope`.
    pub fn reset_default_graph(&self, scope: ScopeId) -> Result<(), UsageError> {
        self.pop(scope, |scopes| &mut scopes.default_graphs)
            .ok_or(UsageError::EmptyDefaultGraphStack)
    }

    /// Pops the active graph stack of `scope`.
    pub fn reset_active_graph(&self, scope: ScopeId) -> Result<(), UsageError> {
        self.pop(scope, |scopes| &mut scopes.active_graphs)
            .ok_or(UsageError::EmptyActiveGraphStack)
    }

    fn pop(
        &self,
        scope: ScopeId,
        stack: impl FnOnce(&mut GraphScopes) -> &mut Vec<Vec<GraphName>>,
    ) -> Option<()> {
        let popped = {
            let mut scopes = self
                .scopes
                .entry(scope)
                .or_insert_with(|| GraphScopes::new(self.initial_default_graphs.clone()));
            stack(&mut *scopes).pop()
        };
        self.scopes
            .remove_if(&scope, |_, scopes| scopes.is_initial(&self.initial_default_graphs));

        let popped = popped?;
        tracing::trace!("Popped {popped:?} in {scope}");
        Some(())
    }

    /// Discards the stacks of `scope`. Returns `false` if the scope was already in its initial
    /// state.
    ///
    /// Queries that balance their pushes never need to call this method. It is intended for
    /// cleaning up after queries that have been aborted.
    pub fn release_scope(&self, scope: ScopeId) -> bool {
        let released = self.scopes.remove(&scope).is_some();
        if released {
            tracing::warn!("Released unbalanced graph scopes of {scope}");
        }
        released
    }

    /// Returns the graphs that currently make up the default graph of `scope`.
    pub fn default_graph_names(&self, scope: ScopeId) -> Result<Vec<GraphName>, StorageError> {
        let top = match self.scopes.get(&scope) {
            Some(scopes) => scopes.default_graphs.last().cloned(),
            None => self.initial_default_graphs.last().cloned(),
        };
        match top {
            Some(graphs) => Ok(graphs),
            None if self.config.union_default_graph => self.graph_names(),
            None => Ok(Vec::new()),
        }
    }

    /// Returns the graphs that currently make up the active graph of `scope`.
    pub fn active_graph_names(&self, scope: ScopeId) -> Result<Vec<GraphName>, StorageError> {
        let top = self
            .scopes
            .get(&scope)
            .and_then(|scopes| scopes.active_graphs.last().cloned());
        match top {
            Some(graphs) => Ok(graphs),
            None => self.default_graph_names(scope),
        }
    }

    //
    // Graphs
    //

    /// Returns the names of all graphs in the storage.
    pub fn graph_names(&self) -> Result<Vec<GraphName>, StorageError> {
        self.storage.graph_names()
    }

    /// Returns whether `graph` exists.
    ///
    /// The default graph exists if the default graph of `scope` is made up of at least one graph.
    pub fn has_graph(&self, scope: ScopeId, graph: GraphNameRef<'_>) -> Result<bool, StorageError> {
        if graph.is_default_graph() && !self.default_graph_names(scope)?.is_empty() {
            return Ok(true);
        }
        self.storage.contains_graph(graph)
    }

    /// Creates `graph` and adds `triples` to it. Returns whether the graph or any triple has
    /// been added.
    pub fn add_graph(
        &self,
        graph: GraphNameRef<'_>,
        triples: impl IntoIterator<Item = Triple>,
    ) -> Result<bool, StorageError> {
        let mut added = self.storage.insert_graph(graph)?;
        for triple in triples {
            let quad = Quad::new(triple.subject, triple.predicate, triple.object, graph);
            added |= self.storage.insert(quad.as_ref())?;
        }
        Ok(added)
    }

    /// Removes `graph` and its triples.
    ///
    /// The unnamed default graph cannot be removed. Removing it clears its triples instead and
    /// returns whether there were any.
    pub fn remove_graph(&self, graph: GraphNameRef<'_>) -> Result<bool, StorageError> {
        if graph.is_default_graph() {
            let had_triples = self
                .storage
                .quads_for_pattern(graph, None, None, None)?
                .next()
                .transpose()?
                .is_some();
            self.storage.clear_graph(graph)?;
            return Ok(had_triples);
        }
        self.storage.remove_graph(graph)
    }

    pub fn add_quad(&self, quad: QuadRef<'_>) -> Result<bool, StorageError> {
        self.storage.insert(quad)
    }

    pub fn remove_quad(&self, quad: QuadRef<'_>) -> Result<bool, StorageError> {
        self.storage.remove(quad)
    }

    pub fn flush(&self) -> Result<(), StorageError> {
        self.storage.flush()
    }

    pub fn discard(&self) -> Result<(), StorageError> {
        self.storage.discard()
    }

    //
    // Triples of the active graph
    //

    /// Returns whether `triple` is contained in any of the active graphs of `scope`.
    pub fn contains_triple(
        &self,
        scope: ScopeId,
        triple: TripleRef<'_>,
    ) -> Result<bool, StorageError> {
        for graph in self.active_graph_names(scope)? {
            let mut matches = self.storage.quads_for_pattern(
                graph.as_ref(),
                Some(triple.subject),
                Some(triple.predicate),
                Some(triple.object),
            )?;
            if matches.next().transpose()?.is_some() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Returns all triples of the active graphs of `scope`.
    pub fn triples(&self, scope: ScopeId) -> Result<TripleIter, StorageError> {
        self.triples_for_pattern(scope, None, None, None)
    }

    /// Returns whether the active graphs of `scope` contain any triple.
    pub fn has_triples(&self, scope: ScopeId) -> Result<bool, StorageError> {
        Ok(self.triples(scope)?.next().transpose()?.is_some())
    }

    pub fn triples_with_subject(
        &self,
        scope: ScopeId,
        subject: SubjectRef<'_>,
    ) -> Result<TripleIter, StorageError> {
        self.triples_for_pattern(scope, Some(subject), None, None)
    }

    pub fn triples_with_predicate(
        &self,
        scope: ScopeId,
        predicate: NamedNodeRef<'_>,
    ) -> Result<TripleIter, StorageError> {
        self.triples_for_pattern(scope, None, Some(predicate), None)
    }

    pub fn triples_with_object(
        &self,
        scope: ScopeId,
        object: TermRef<'_>,
    ) -> Result<TripleIter, StorageError> {
        self.triples_for_pattern(scope, None, None, Some(object))
    }

    pub fn triples_with_subject_predicate(
        &self,
        scope: ScopeId,
        subject: SubjectRef<'_>,
        predicate: NamedNodeRef<'_>,
    ) -> Result<TripleIter, StorageError> {
        self.triples_for_pattern(scope, Some(subject), Some(predicate), None)
    }

    pub fn triples_with_subject_object(
        &self,
        scope: ScopeId,
        subject: SubjectRef<'_>,
        object: TermRef<'_>,
    ) -> Result<TripleIter, StorageError> {
        self.triples_for_pattern(scope, Some(subject), None, Some(object))
    }

    pub fn triples_with_predicate_object(
        &self,
        scope: ScopeId,
        predicate: NamedNodeRef<'_>,
        object: TermRef<'_>,
    ) -> Result<TripleIter, StorageError> {
        self.triples_for_pattern(scope, None, Some(predicate), Some(object))
    }

    /// Returns the triples of the active graphs of `scope` that match the pattern. `None`
    /// matches any term.
    pub fn triples_for_pattern(
        &self,
        scope: ScopeId,
        subject: Option<SubjectRef<'_>>,
        predicate: Option<NamedNodeRef<'_>>,
        object: Option<TermRef<'_>>,
    ) -> Result<TripleIter, StorageError> {
        let graphs = self.active_graph_names(scope)?;
        Ok(self.triples_in_graphs(graphs, subject, predicate, object))
    }

    /// Returns the triples of `graphs` that match the pattern, ignoring the scopes.
    pub fn triples_in_graphs(
        &self,
        graphs: Vec<GraphName>,
        subject: Option<SubjectRef<'_>>,
        predicate: Option<NamedNodeRef<'_>>,
        object: Option<TermRef<'_>>,
    ) -> TripleIter {
        Box::new(GraphUnionIter::new(
            Arc::clone(&self.storage),
            graphs,
            subject.map(SubjectRef::into_owned),
            predicate.map(NamedNodeRef::into_owned),
            object.map(TermRef::into_owned),
        ))
    }
}

impl Debug for QuadDataset {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuadDataset")
            .field("config", &self.config)
            .field("open_scopes", &self.scopes.len())
            .finish_non_exhaustive()
    }
}
