use super::AlgebraExecutor;
use quadflow_common::{ExecutionContext, QueryResult, SolutionIter};
use quadflow_logical::{Algebra, Executor, Expression};
use quadflow_model::{Solution, Variable};
use quadflow_physical::join::{
    JoinCondition, JoinDecorators, JoinKind, JoinProbe, JoinWorkerFactory,
    MaterializedJoinFactory, ProbeBoundJoinFactory, RightSideSource,
};
use std::sync::Arc;

impl AlgebraExecutor {
    pub(super) fn execute_join(
        &self,
        left: &Algebra,
        right: &Algebra,
        context: &ExecutionContext,
    ) -> QueryResult<SolutionIter> {
        self.probe(JoinKind::Inner, left, right, None, context)
    }

    /// Solutions of `left` without a match in `right` are kept. `expression` must hold for the
    /// merged solutions. An expression that cannot be evaluated counts as `false`.
    pub(super) fn execute_left_join(
        &self,
        left: &Algebra,
        right: &Algebra,
        expression: Option<&Expression>,
        context: &ExecutionContext,
    ) -> QueryResult<SolutionIter> {
        let condition = expression.map(|expression| {
            let evaluator = self.evaluator.clone();
            let expression = expression.clone();
            Box::new(move |solution: &Solution| {
                evaluator
                    .evaluate_ebv(&expression, solution)
                    .unwrap_or(false)
            }) as JoinCondition
        });
        self.probe(JoinKind::LeftOuter, left, right, condition, context)
    }

    pub(super) fn execute_minus(
        &self,
        left: &Algebra,
        right: &Algebra,
        context: &ExecutionContext,
    ) -> QueryResult<SolutionIter> {
        self.probe(JoinKind::Anti, left, right, None, context)
    }

    fn probe(
        &self,
        kind: JoinKind,
        left: &Algebra,
        right: &Algebra,
        condition: Option<JoinCondition>,
        context: &ExecutionContext,
    ) -> QueryResult<SolutionIter> {
        let variables = join_variables(left, right);
        let left = self.execute(left, context)?;
        let factory = self.join_factory(kind, right, variables, context)?;
        tracing::trace!("Probing {factory:?} with a {kind:?} join");

        let mut probe = JoinProbe::new(kind, left, factory, context.clone());
        if let Some(condition) = condition {
            probe = probe.with_condition(condition);
        }
        Ok(Box::new(probe))
    }

    /// Creates the factory for the join workers of `right`.
    ///
    /// A basic graph pattern may be evaluated once per join key with the key bound. The active
    /// graphs are resolved now, as the pattern is evaluated after the current scope is left.
    ///
    /// Only the existence of a match matters for `MINUS`, so its right solutions are
    /// de-duplicated.
    fn join_factory(
        &self,
        kind: JoinKind,
        right: &Algebra,
        variables: Vec<Variable>,
        context: &ExecutionContext,
    ) -> QueryResult<Box<dyn JoinWorkerFactory>> {
        let distinct = kind == JoinKind::Anti;
        if let Algebra::Bgp { patterns } = right {
            if self.options.bind_join_patterns && !variables.is_empty() {
                let graphs: Arc<[_]> = self
                    .dataset
                    .active_graph_names(context.scope_id())?
                    .into();
                let executor = self.clone();
                let patterns = patterns.clone();
                let source: RightSideSource = Arc::new(
                    move |bindings: &Solution,
                          context: &ExecutionContext|
                          -> QueryResult<SolutionIter> {
                        executor.evaluate_bgp(
                            &patterns,
                            Arc::clone(&graphs),
                            bindings.clone(),
                            context,
                        )
                    },
                );
                return Ok(Box::new(
                    ProbeBoundJoinFactory::new(variables, source).with_distinct(distinct),
                ));
            }
        }

        let right = self.execute(right, context)?;
        let decorators = JoinDecorators {
            cache_capacity: self.options.join_cache_capacity,
            distinct,
        };
        Ok(Box::new(
            MaterializedJoinFactory::deferred(variables, right, self.options.join_algorithm)
                .with_decorators(decorators),
        ))
    }
}

/// The variables that may be bound on both sides of a join.
fn join_variables(left: &Algebra, right: &Algebra) -> Vec<Variable> {
    let right = right.variables();
    left.variables()
        .into_iter()
        .filter(|variable| right.contains(variable))
        .collect()
}
