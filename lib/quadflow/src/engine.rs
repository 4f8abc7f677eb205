use quadflow_common::error::StorageError;
use quadflow_common::{ExecutionContext, QuadStorage, QueryResult, SolutionIter};
use quadflow_engine::{AlgebraExecutor, ExtensionExecutor, QueryOptions};
use quadflow_functions::FunctionRegistryRef;
use quadflow_logical::{Algebra, Executor};
use quadflow_model::{GraphNameRef, Quad, QuadRef, Triple};
use quadflow_storage::memory::MemQuadStorage;
use quadflow_storage::{DatasetConfig, QuadDataset};
use std::sync::Arc;

/// A [QuadDataset] together with an [AlgebraExecutor] that evaluates queries against it.
///
/// Each call to [Engine::evaluate] runs in its own [ExecutionContext]. Use
/// [Engine::evaluate_with] to control cancellation and timeouts.
///
/// Usage example:
/// ```
/// use quadflow::logical::Algebra;
/// use quadflow::model::*;
/// use quadflow::Engine;
///
/// let engine = Engine::new();
/// let ex = NamedNodeRef::new("http://example.com")?;
/// engine.insert(QuadRef::new(ex, ex, ex, GraphNameRef::DefaultGraph))?;
///
/// let pattern = TriplePattern {
///     subject: Variable::new("s")?.into(),
///     predicate: ex.into_owned().into(),
///     object: Variable::new("o")?.into(),
/// };
/// let solutions = engine
///     .evaluate(&Algebra::bgp([pattern]))?
///     .collect::<Result<Vec<_>, _>>()?;
/// assert_eq!(solutions[0].get_by_name("s"), Some(&ex.into_owned().into()));
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Clone, Debug)]
pub struct Engine {
    dataset: Arc<QuadDataset>,
    executor: AlgebraExecutor,
}

impl Engine {
    /// Creates an engine over an empty [MemQuadStorage] that uses the union of all graphs as the
    /// default graph.
    pub fn new() -> Self {
        Self::with_storage(Arc::new(MemQuadStorage::new()), DatasetConfig::default())
    }

    pub fn with_storage(storage: Arc<dyn QuadStorage>, config: DatasetConfig) -> Self {
        let dataset = Arc::new(QuadDataset::with_config(storage, config));
        let executor = AlgebraExecutor::new(Arc::clone(&dataset));
        Self { dataset, executor }
    }

    #[must_use]
    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.executor = self.executor.with_options(options);
        self
    }

    #[must_use]
    pub fn with_functions(mut self, registry: FunctionRegistryRef) -> Self {
        self.executor = self.executor.with_functions(registry);
        self
    }

    #[must_use]
    pub fn with_extension_executor(mut self, executor: Arc<dyn ExtensionExecutor>) -> Self {
        self.executor = self.executor.with_extension_executor(executor);
        self
    }

    pub fn dataset(&self) -> &Arc<QuadDataset> {
        &self.dataset
    }

    pub fn executor(&self) -> &AlgebraExecutor {
        &self.executor
    }

    /// Adds a quad. Returns `false` if it was already present.
    pub fn insert<'a>(&self, quad: impl Into<QuadRef<'a>>) -> Result<bool, StorageError> {
        self.dataset.add_quad(quad.into())
    }

    /// Adds all `quads` and returns how many of them were new.
    pub fn extend(&self, quads: impl IntoIterator<Item = Quad>) -> Result<usize, StorageError> {
        let mut inserted = 0;
        for quad in quads {
            if self.dataset.add_quad(quad.as_ref())? {
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    /// Removes a quad. Returns `false` if it was not present.
    pub fn remove<'a>(&self, quad: impl Into<QuadRef<'a>>) -> Result<bool, StorageError> {
        self.dataset.remove_quad(quad.into())
    }

    /// Creates the graph `graph` with `triples`. Returns `false` if the graph already existed.
    pub fn add_graph(
        &self,
        graph: GraphNameRef<'_>,
        triples: impl IntoIterator<Item = Triple>,
    ) -> Result<bool, StorageError> {
        self.dataset.add_graph(graph, triples)
    }

    pub fn remove_graph(&self, graph: GraphNameRef<'_>) -> Result<bool, StorageError> {
        self.dataset.remove_graph(graph)
    }

    /// Evaluates `algebra` in a fresh [ExecutionContext].
    pub fn evaluate(&self, algebra: &Algebra) -> QueryResult<SolutionIter> {
        self.evaluate_with(algebra, &ExecutionContext::new())
    }

    /// Evaluates `algebra` in `context`.
    ///
    /// The scope stacks of `context` are released if opening the query fails.
    pub fn evaluate_with(
        &self,
        algebra: &Algebra,
        context: &ExecutionContext,
    ) -> QueryResult<SolutionIter> {
        tracing::debug!("Evaluating query in {}\n{algebra}", context.scope_id());
        let result = self.executor.execute(algebra, context);
        if result.is_err() {
            self.dataset.release_scope(context.scope_id());
        }
        result
    }

    /// Renders `algebra` as an indented operator tree.
    pub fn explain(algebra: &Algebra) -> String {
        algebra.to_string()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
