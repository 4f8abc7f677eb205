mod bgp;
mod group;
mod joins;
mod modifiers;
mod scopes;

use crate::{ExtensionExecutor, QueryOptions};
use quadflow_common::error::QueryEvaluationError;
use quadflow_common::{ExecutionContext, QueryResult, SolutionIter};
use quadflow_functions::{ExpressionEvaluator, FunctionRegistryRef};
use quadflow_logical::{Algebra, Executor, ExtensionNode};
use quadflow_physical::CancellableIter;
use quadflow_storage::QuadDataset;
use rustc_hash::FxHashMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Evaluates [Algebra] trees against a [QuadDataset].
///
/// Every node is turned into a lazy [SolutionIter]. Graph names are resolved when the iterator
/// of a node is created. Hence, the graph scopes pushed by [Algebra::Graph] and
/// [Algebra::DatasetScope] can be popped again before the first solution is pulled.
///
/// The executor is cheap to clone and can be shared between queries. Each query should use its
/// own [ExecutionContext], as the scope stacks of the dataset are keyed by
/// [ExecutionContext::scope_id].
#[derive(Clone)]
pub struct AlgebraExecutor {
    dataset: Arc<QuadDataset>,
    options: QueryOptions,
    evaluator: ExpressionEvaluator,
    extensions: Arc<FxHashMap<String, Arc<dyn ExtensionExecutor>>>,
}

impl AlgebraExecutor {
    pub fn new(dataset: Arc<QuadDataset>) -> Self {
        Self {
            dataset,
            options: QueryOptions::default(),
            evaluator: ExpressionEvaluator::default(),
            extensions: Arc::new(FxHashMap::default()),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }

    /// Resolves the custom functions of expressions with `registry`.
    #[must_use]
    pub fn with_functions(mut self, registry: FunctionRegistryRef) -> Self {
        self.evaluator = ExpressionEvaluator::new(registry);
        self
    }

    /// Registers `executor` for the extension nodes with the name [ExtensionExecutor::name].
    /// A previously registered executor with the same name is replaced.
    #[must_use]
    pub fn with_extension_executor(mut self, executor: Arc<dyn ExtensionExecutor>) -> Self {
        Arc::make_mut(&mut self.extensions).insert(executor.name().to_owned(), executor);
        self
    }

    pub fn dataset(&self) -> &Arc<QuadDataset> {
        &self.dataset
    }

    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    pub fn evaluator(&self) -> &ExpressionEvaluator {
        &self.evaluator
    }

    fn execute_extension(
        &self,
        node: &ExtensionNode,
        context: &ExecutionContext,
    ) -> QueryResult<SolutionIter> {
        let name = node.node().name();
        let executor = self
            .extensions
            .get(name)
            .ok_or_else(|| QueryEvaluationError::UnsupportedExtension(name.to_owned()))?;
        executor.execute(node, self, context)
    }
}

impl Executor for AlgebraExecutor {
    fn execute(
        &self,
        algebra: &Algebra,
        context: &ExecutionContext,
    ) -> QueryResult<SolutionIter> {
        context.check()?;
        tracing::debug!("Opening {} in {}", algebra.name(), context.scope_id());

        let solutions = match algebra {
            Algebra::Bgp { patterns } => self.execute_bgp(patterns, context)?,
            Algebra::Table { rows, .. } => Box::new(rows.clone().into_iter().map(Ok)),
            Algebra::Join { left, right } => self.execute_join(left, right, context)?,
            Algebra::LeftJoin {
                left,
                right,
                expression,
            } => self.execute_left_join(left, right, expression.as_ref(), context)?,
            Algebra::Minus { left, right } => self.execute_minus(left, right, context)?,
            Algebra::Union { left, right } => {
                let left = self.execute(left, context)?;
                let right = self.execute(right, context)?;
                Box::new(left.chain(right))
            }
            Algebra::Filter(filter) => self.execute_filter(filter, context)?,
            Algebra::Extend {
                inner,
                variable,
                expression,
            } => self.execute_extend(inner, variable, expression, context)?,
            Algebra::Project { inner, variables } => {
                self.execute_project(inner, variables, context)?
            }
            Algebra::Distinct { inner } => self.execute_distinct(inner, context)?,
            Algebra::Slice {
                inner,
                offset,
                limit,
            } => self.execute_slice(inner, *offset, *limit, context)?,
            Algebra::OrderBy { inner, conditions } => {
                self.execute_order_by(inner, conditions, context)?
            }
            Algebra::Group {
                inner,
                variables,
                aggregates,
            } => self.execute_group(inner, variables, aggregates, context)?,
            Algebra::Graph { inner, name } => self.execute_graph(inner, name, context)?,
            Algebra::DatasetScope {
                inner,
                default_graphs,
            } => self.execute_dataset_scope(inner, default_graphs, context)?,
            Algebra::Extension(node) => self.execute_extension(node, context)?,
        };
        Ok(CancellableIter::boxed(solutions, context.clone()))
    }
}

impl Debug for AlgebraExecutor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut extensions = self.extensions.keys().collect::<Vec<_>>();
        extensions.sort();
        f.debug_struct("AlgebraExecutor")
            .field("dataset", &self.dataset)
            .field("options", &self.options)
            .field("extensions", &extensions)
            .finish_non_exhaustive()
    }
}
