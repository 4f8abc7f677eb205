use quadflow_common::error::{StorageError, UsageError};
use quadflow_common::{QuadIter, QuadStorage, ScopeId};
use quadflow_model::{
    GraphName, GraphNameRef, Literal, NamedNode, NamedNodeRef, Quad, QuadRef, SubjectRef,
    TermRef, Triple,
};
use quadflow_storage::memory::MemQuadStorage;
use quadflow_storage::{DatasetConfig, QuadDataset};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

fn iri(name: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("http://example.com/{name}"))
}

fn graph(name: &str) -> GraphName {
    iri(name).into()
}

fn quad(subject: &str, predicate: &str, object: &str, graph_name: GraphName) -> Quad {
    Quad::new(
        iri(subject),
        iri(predicate),
        Literal::new_simple_literal(object),
        graph_name,
    )
}

/// Two named graphs `g1` and `g2` and a default graph.
fn example_storage() -> MemQuadStorage {
    let storage = MemQuadStorage::new();
    for q in [
        quad("s1", "p", "in g1", graph("g1")),
        quad("s2", "q", "in g1", graph("g1")),
        quad("s1", "p", "in g2", graph("g2")),
        quad("s3", "p", "in default", GraphName::DefaultGraph),
    ] {
        storage.insert(q.as_ref()).unwrap();
    }
    storage
}

fn objects(triples: impl Iterator<Item = Result<Triple, StorageError>>) -> Vec<String> {
    triples
        .map(|triple| triple.unwrap().object.to_string())
        .collect()
}

#[test]
fn union_default_graph_retrieves_from_all_graphs() {
    let dataset = QuadDataset::new(Arc::new(example_storage()));
    let scope = ScopeId::next();

    let found = dataset
        .triples_with_predicate(scope, iri("p").as_ref())
        .unwrap();
    assert_eq!(
        objects(found),
        vec![r#""in default""#, r#""in g1""#, r#""in g2""#]
    );
}

#[test]
fn retrieval_is_restricted_to_active_graph() {
    let dataset = QuadDataset::new(Arc::new(example_storage()));
    let scope = ScopeId::next();

    dataset.set_default_graph(scope, [graph("g1"), graph("g2")]);
    let found = dataset
        .triples_with_predicate(scope, iri("p").as_ref())
        .unwrap();
    assert_eq!(objects(found), vec![r#""in g1""#, r#""in g2""#]);

    dataset.set_active_graph(scope, [graph("g2")]).unwrap();
    let found = dataset
        .triples_with_subject_predicate(scope, iri("s1").as_ref().into(), iri("p").as_ref())
        .unwrap();
    assert_eq!(objects(found), vec![r#""in g2""#]);

    dataset.reset_active_graph(scope).unwrap();
    dataset.reset_default_graph(scope).unwrap();
    assert_eq!(dataset.open_scopes(), 0);
}

#[test]
fn all_pattern_shapes_agree_with_scan() {
    let dataset = QuadDataset::new(Arc::new(example_storage()));
    let scope = ScopeId::next();
    let s1 = iri("s1");
    let p = iri("p");
    let object = Literal::new_simple_literal("in g1");
    let subject = SubjectRef::from(s1.as_ref());
    let object = TermRef::from(object.as_ref());

    let count = |triples: Result<_, StorageError>| -> usize {
        let triples: quadflow_storage::TripleIter = triples.unwrap();
        triples.count()
    };
    assert_eq!(count(dataset.triples(scope)), 4);
    assert_eq!(count(dataset.triples_with_subject(scope, subject)), 2);
    assert_eq!(count(dataset.triples_with_predicate(scope, p.as_ref())), 3);
    assert_eq!(count(dataset.triples_with_object(scope, object)), 2);
    assert_eq!(
        count(dataset.triples_with_subject_predicate(scope, subject, p.as_ref())),
        2
    );
    assert_eq!(
        count(dataset.triples_with_subject_object(scope, subject, object)),
        1
    );
    assert_eq!(
        count(dataset.triples_with_predicate_object(scope, p.as_ref(), object)),
        1
    );
    assert_eq!(
        count(dataset.triples_for_pattern(scope, Some(subject), Some(p.as_ref()), Some(object))),
        1
    );
}

#[test]
fn contains_and_has_triples_use_active_graph() {
    let dataset = QuadDataset::new(Arc::new(example_storage()));
    let scope = ScopeId::next();
    let triple = Triple::new(iri("s2"), iri("q"), Literal::new_simple_literal("in g1"));

    assert!(dataset.contains_triple(scope, triple.as_ref()).unwrap());
    assert!(dataset.has_triples(scope).unwrap());

    dataset.set_active_graph(scope, [graph("g2")]).unwrap();
    assert!(!dataset.contains_triple(scope, triple.as_ref()).unwrap());

    dataset.set_active_graph(scope, [graph("empty")]).unwrap();
    assert!(!dataset.has_triples(scope).unwrap());

    dataset.reset_active_graph(scope).unwrap();
    dataset.reset_active_graph(scope).unwrap();
}

#[test]
fn resetting_empty_stacks_fails() {
    let dataset = QuadDataset::new(Arc::new(example_storage()));
    let scope = ScopeId::next();

    assert_eq!(
        dataset.reset_default_graph(scope),
        Err(UsageError::EmptyDefaultGraphStack)
    );
    assert_eq!(
        dataset.reset_active_graph(scope),
        Err(UsageError::EmptyActiveGraphStack)
    );
    assert_eq!(dataset.open_scopes(), 0);
}

#[test]
fn has_graph_treats_default_graph_specially() {
    let storage = MemQuadStorage::new();
    storage
        .insert(quad("s", "p", "o", graph("g")).as_ref())
        .unwrap();
    let dataset = QuadDataset::with_config(
        Arc::new(storage),
        DatasetConfig::with_default_graph(graph("g")),
    );
    let scope = ScopeId::next();

    assert!(dataset.has_graph(scope, GraphNameRef::DefaultGraph).unwrap());
    assert!(dataset.has_graph(scope, graph("g").as_ref()).unwrap());
    assert!(!dataset.has_graph(scope, graph("other").as_ref()).unwrap());

    dataset.reset_default_graph(scope).unwrap();
    assert!(!dataset.has_graph(scope, GraphNameRef::DefaultGraph).unwrap());
    dataset.set_default_graph(scope, [graph("g")]);
}

#[test]
fn add_and_remove_graphs() {
    let dataset = QuadDataset::new(Arc::new(MemQuadStorage::new()));
    let triples = [
        Triple::new(iri("s"), iri("p"), Literal::new_simple_literal("1")),
        Triple::new(iri("s"), iri("p"), Literal::new_simple_literal("2")),
    ];

    assert!(dataset.add_graph(graph("g").as_ref(), triples.clone()).unwrap());
    assert!(!dataset.add_graph(graph("g").as_ref(), triples).unwrap());
    assert_eq!(dataset.graph_names().unwrap(), vec![graph("g")]);

    assert!(dataset.remove_graph(graph("g").as_ref()).unwrap());
    assert!(dataset.graph_names().unwrap().is_empty());

    let q = quad("s", "p", "o", GraphName::DefaultGraph);
    assert!(dataset.add_quad(q.as_ref()).unwrap());
    assert!(dataset.remove_quad(q.as_ref()).unwrap());
    dataset.flush().unwrap();
    dataset.discard().unwrap();
}

#[test]
fn concurrent_scopes_are_isolated() {
    let dataset = Arc::new(QuadDataset::new(Arc::new(example_storage())));

    let handles = ["g1", "g2"]
        .into_iter()
        .map(|name| {
            let dataset = Arc::clone(&dataset);
            thread::spawn(move || {
                let scope = ScopeId::next();
                for _ in 0..100 {
                    dataset.set_active_graph(scope, [graph(name)]).unwrap();
                    assert_eq!(dataset.active_graph_names(scope).unwrap(), vec![graph(name)]);
                    dataset.reset_active_graph(scope).unwrap();
                }
            })
        })
        .collect::<Vec<_>>();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(dataset.open_scopes(), 0);
}

/// Counts the calls to [QuadStorage::quads_for_pattern].
#[derive(Debug, Default)]
struct CountingStorage {
    inner: MemQuadStorage,
    retrievals: AtomicUsize,
}

impl QuadStorage for CountingStorage {
    fn graph_names(&self) -> Result<Vec<GraphName>, StorageError> {
        self.inner.graph_names()
    }

    fn contains_graph(&self, graph_name: GraphNameRef<'_>) -> Result<bool, StorageError> {
        self.inner.contains_graph(graph_name)
    }

    fn quads_for_pattern(
        &self,
        graph_name: GraphNameRef<'_>,
        subject: Option<SubjectRef<'_>>,
        predicate: Option<NamedNodeRef<'_>>,
        object: Option<TermRef<'_>>,
    ) -> Result<QuadIter, StorageError> {
        self.retrievals.fetch_add(1, Ordering::SeqCst);
        self.inner
            .quads_for_pattern(graph_name, subject, predicate, object)
    }

    fn insert_graph(&self, graph_name: GraphNameRef<'_>) -> Result<bool, StorageError> {
        self.inner.insert_graph(graph_name)
    }

    fn insert(&self, quad: QuadRef<'_>) -> Result<bool, StorageError> {
        self.inner.insert(quad)
    }

    fn remove(&self, quad: QuadRef<'_>) -> Result<bool, StorageError> {
        self.inner.remove(quad)
    }

    fn clear_graph(&self, graph_name: GraphNameRef<'_>) -> Result<(), StorageError> {
        self.inner.clear_graph(graph_name)
    }

    fn remove_graph(&self, graph_name: GraphNameRef<'_>) -> Result<bool, StorageError> {
        self.inner.remove_graph(graph_name)
    }
}

#[test]
fn graphs_are_retrieved_on_demand() {
    let storage = Arc::new(CountingStorage {
        inner: example_storage(),
        retrievals: AtomicUsize::new(0),
    });
    let dataset = QuadDataset::new(Arc::clone(&storage) as Arc<dyn QuadStorage>);
    let scope = ScopeId::next();

    let mut triples = dataset.triples(scope).unwrap();
    assert_eq!(storage.retrievals.load(Ordering::SeqCst), 0);

    triples.next().unwrap().unwrap();
    assert_eq!(storage.retrievals.load(Ordering::SeqCst), 1);

    assert_eq!(triples.count(), 3);
    assert_eq!(storage.retrievals.load(Ordering::SeqCst), 3);
}
