use quadflow_common::error::StorageError;
use quadflow_common::{QuadIter, QuadStorage};
use quadflow_model::{GraphName, NamedNode, Subject, Term, Triple};
use std::sync::Arc;

/// A lazily evaluated sequence of triples returned by a [QuadDataset](crate::QuadDataset).
pub type TripleIter = Box<dyn Iterator<Item = Result<Triple, StorageError>>>;

/// Concatenates the matches of a triple pattern in several graphs.
///
/// The storage is only asked for the matches of a graph once the iterator reaches that graph.
pub(super) struct GraphUnionIter {
    storage: Arc<dyn QuadStorage>,
    graphs: std::vec::IntoIter<GraphName>,
    subject: Option<Subject>,
    predicate: Option<NamedNode>,
    object: Option<Term>,
    current: Option<QuadIter>,
}

impl GraphUnionIter {
    pub fn new(
        storage: Arc<dyn QuadStorage>,
        graphs: Vec<GraphName>,
        subject: Option<Subject>,
        predicate: Option<NamedNode>,
        object: Option<Term>,
    ) -> Self {
        Self {
            storage,
            graphs: graphs.into_iter(),
            subject,
            predicate,
            object,
            current: None,
        }
    }

    fn open(&self, graph: &GraphName) -> Result<QuadIter, StorageError> {
        tracing::trace!("Retrieving quads from graph {graph}");
        self.storage.quads_for_pattern(
            graph.as_ref(),
            self.subject.as_ref().map(Subject::as_ref),
            self.predicate.as_ref().map(NamedNode::as_ref),
            self.object.as_ref().map(Term::as_ref),
        )
    }
}

impl Iterator for GraphUnionIter {
    type Item = Result<Triple, StorageError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(current) = &mut self.current {
                match current.next() {
                    Some(Ok(quad)) => {
                        return Some(Ok(Triple::new(quad.subject, quad.predicate, quad.object)));
                    }
                    Some(Err(error)) => return Some(Err(error)),
                    None => self.current = None,
                }
            }

            let graph = self.graphs.next()?;
            match self.open(&graph) {
                Ok(quads) => self.current = Some(quads),
                Err(error) => return Some(Err(error)),
            }
        }
    }
}
