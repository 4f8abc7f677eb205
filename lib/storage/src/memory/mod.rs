//! A concurrent in-memory [QuadStorage].

use dashmap::DashMap;
use quadflow_common::error::StorageError;
use quadflow_common::{QuadIter, QuadStorage};
use quadflow_model::{
    GraphName, GraphNameRef, NamedNodeRef, Quad, QuadRef, SubjectRef, TermRef, Triple,
};
use rustc_hash::{FxBuildHasher, FxHashSet};
use std::fmt::{Debug, Formatter};
use std::sync::{Mutex, PoisonError};

/// The triples of a single graph in insertion order.
#[derive(Debug, Default)]
struct MemGraph {
    triples: Vec<Triple>,
    members: FxHashSet<Triple>,
}

impl MemGraph {
    fn insert(&mut self, triple: Triple) -> bool {
        if !self.members.insert(triple.clone()) {
            return false;
        }
        self.triples.push(triple);
        true
    }

    fn remove(&mut self, triple: &Triple) -> bool {
        if !self.members.remove(triple) {
            return false;
        }
        self.triples.retain(|t| t != triple);
        true
    }

    fn clear(&mut self) {
        self.triples.clear();
        self.members.clear();
    }

    fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }
}

/// Stores quads in a concurrent hash map from graph names to their triples.
///
/// Named graphs are reported in the order of their creation, preceded by the default graph if it
/// contains any triple. Pattern matching scans the triples of a graph and returns a snapshot of
/// the matches. Hence, concurrent mutations never invalidate an iterator returned by
/// [QuadStorage::quads_for_pattern].
pub struct MemQuadStorage {
    graphs: DashMap<GraphName, MemGraph, FxBuildHasher>,
    /// The named graphs in order of their creation.
    creation_order: Mutex<Vec<GraphName>>,
}

impl MemQuadStorage {
    /// Creates an empty storage.
    pub fn new() -> Self {
        let graphs = DashMap::with_hasher(FxBuildHasher);
        graphs.insert(GraphName::DefaultGraph, MemGraph::default());
        Self {
            graphs,
            creation_order: Mutex::new(Vec::new()),
        }
    }

    /// Returns the number of quads.
    pub fn len(&self) -> usize {
        self.graphs.iter().map(|graph| graph.triples.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ensure_graph(&self, graph_name: &GraphName) -> bool {
        if self.graphs.contains_key(graph_name) {
            return false;
        }
        let mut creation_order = self
            .creation_order
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // Re-check while holding the lock such that concurrent creations register the graph once.
        if self.graphs.contains_key(graph_name) {
            return false;
        }
        self.graphs.insert(graph_name.clone(), MemGraph::default());
        creation_order.push(graph_name.clone());
        true
    }
}

impl Default for MemQuadStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for MemQuadStorage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemQuadStorage")
            .field("graphs", &self.graphs.len())
            .field("quads", &self.len())
            .finish()
    }
}

impl QuadStorage for MemQuadStorage {
    fn graph_names(&self) -> Result<Vec<GraphName>, StorageError> {
        let mut names = Vec::new();
        if self
            .graphs
            .get(&GraphName::DefaultGraph)
            .is_some_and(|graph| !graph.is_empty())
        {
            names.push(GraphName::DefaultGraph);
        }
        names.extend(
            self.creation_order
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .cloned(),
        );
        Ok(names)
    }

    fn contains_graph(&self, graph_name: GraphNameRef<'_>) -> Result<bool, StorageError> {
        let graph_name = graph_name.into_owned();
        Ok(match self.graphs.get(&graph_name) {
            Some(graph) => !graph_name.is_default_graph() || !graph.is_empty(),
            None => false,
        })
    }

    fn quads_for_pattern(
        &self,
        graph_name: GraphNameRef<'_>,
        subject: Option<SubjectRef<'_>>,
        predicate: Option<NamedNodeRef<'_>>,
        object: Option<TermRef<'_>>,
    ) -> Result<QuadIter, StorageError> {
        let graph_name = graph_name.into_owned();
        let Some(graph) = self.graphs.get(&graph_name) else {
            return Ok(Box::new(std::iter::empty()));
        };

        let matches = graph
            .triples
            .iter()
            .filter(|triple| {
                subject.is_none_or_eq(triple.subject.as_ref())
                    && predicate.is_none_or_eq(triple.predicate.as_ref())
                    && object.is_none_or_eq(triple.object.as_ref())
            })
            .map(|triple| {
                Quad::new(
                    triple.subject.clone(),
                    triple.predicate.clone(),
                    triple.object.clone(),
                    graph_name.clone(),
                )
            })
            .collect::<Vec<_>>();
        Ok(Box::new(matches.into_iter().map(Ok)))
    }

    fn insert_graph(&self, graph_name: GraphNameRef<'_>) -> Result<bool, StorageError> {
        if graph_name.is_default_graph() {
            return Ok(false);
        }
        Ok(self.ensure_graph(&graph_name.into_owned()))
    }

    fn insert(&self, quad: QuadRef<'_>) -> Result<bool, StorageError> {
        let graph_name = quad.graph_name.into_owned();
        self.ensure_graph(&graph_name);
        let triple = Triple::new(
            quad.subject.into_owned(),
            quad.predicate.into_owned(),
            quad.object.into_owned(),
        );
        Ok(self
            .graphs
            .get_mut(&graph_name)
            .is_some_and(|mut graph| graph.insert(triple)))
    }

    fn remove(&self, quad: QuadRef<'_>) -> Result<bool, StorageError> {
        let triple = Triple::new(
            quad.subject.into_owned(),
            quad.predicate.into_owned(),
            quad.object.into_owned(),
        );
        Ok(self
            .graphs
            .get_mut(&quad.graph_name.into_owned())
            .is_some_and(|mut graph| graph.remove(&triple)))
    }

    fn clear_graph(&self, graph_name: GraphNameRef<'_>) -> Result<(), StorageError> {
        if let Some(mut graph) = self.graphs.get_mut(&graph_name.into_owned()) {
            graph.clear();
        }
        Ok(())
    }

    fn remove_graph(&self, graph_name: GraphNameRef<'_>) -> Result<bool, StorageError> {
        let graph_name = graph_name.into_owned();
        if graph_name.is_default_graph() {
            let had_triples = self
                .graphs
                .get_mut(&graph_name)
                .is_some_and(|mut graph| {
                    let had_triples = !graph.is_empty();
                    graph.clear();
                    had_triples
                });
            return Ok(had_triples);
        }

        let mut creation_order = self
            .creation_order
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        creation_order.retain(|name| name != &graph_name);
        Ok(self.graphs.remove(&graph_name).is_some())
    }
}

/// Matches a term of a triple against an optional pattern term.
trait PatternTerm<T> {
    fn is_none_or_eq(&self, value: T) -> bool;
}

impl<T: PartialEq> PatternTerm<T> for Option<T> {
    fn is_none_or_eq(&self, value: T) -> bool {
        match self {
            Some(expected) => *expected == value,
            None => true,
        }
    }
}
