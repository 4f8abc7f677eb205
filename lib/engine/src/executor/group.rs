use super::modifiers::materialize_on_first_pull;
use super::AlgebraExecutor;
use quadflow_common::{ExecutionContext, QueryResult, SolutionIter};
use quadflow_functions::aggregates::AggregateEvaluator;
use quadflow_functions::ExpressionEvaluator;
use quadflow_logical::expr::AggregateExpression;
use quadflow_logical::{Algebra, Executor};
use quadflow_model::{JoinKey, Solution, Variable};
use rustc_hash::FxHashMap;

impl AlgebraExecutor {
    /// Groups the solutions by the values of `variables` when the first group is requested.
    ///
    /// Groups are emitted in the order of their first solution. Without grouping variables, an
    /// empty input still forms a single group.
    pub(super) fn execute_group(
        &self,
        inner: &Algebra,
        variables: &[Variable],
        aggregates: &[(Variable, AggregateExpression)],
        context: &ExecutionContext,
    ) -> QueryResult<SolutionIter> {
        let inner = self.execute(inner, context)?;
        let grouping = Grouping {
            evaluator: self.evaluator.clone(),
            variables: variables.to_vec(),
            aggregates: aggregates.to_vec(),
        };
        Ok(materialize_on_first_pull(inner, move |solutions| {
            grouping.evaluate(solutions)
        }))
    }
}

struct Grouping {
    evaluator: ExpressionEvaluator,
    variables: Vec<Variable>,
    aggregates: Vec<(Variable, AggregateExpression)>,
}

impl Grouping {
    fn evaluate(&self, solutions: SolutionIter) -> QueryResult<Vec<Solution>> {
        let mut positions = FxHashMap::<JoinKey, usize>::default();
        let mut groups = Vec::<(JoinKey, Vec<AggregateEvaluator>)>::new();

        for solution in solutions {
            let solution = solution?;
            let key = solution.join_key(&self.variables);
            let position = *positions.entry(key.clone()).or_insert_with(|| {
                groups.push((key, self.accumulators()));
                groups.len() - 1
            });
            for accumulator in &mut groups[position].1 {
                accumulator.update(&self.evaluator, &solution);
            }
        }

        if groups.is_empty() && self.variables.is_empty() {
            groups.push((Vec::new(), self.accumulators()));
        }
        tracing::trace!("Aggregated {} groups", groups.len());

        Ok(groups
            .into_iter()
            .map(|(key, accumulators)| self.group_solution(key, &accumulators))
            .collect())
    }

    fn accumulators(&self) -> Vec<AggregateEvaluator> {
        self.aggregates
            .iter()
            .map(|(_, aggregate)| AggregateEvaluator::new(aggregate))
            .collect()
    }

    /// Binds the grouping variables and the aggregate results. Failed aggregates stay unbound.
    fn group_solution(&self, key: JoinKey, accumulators: &[AggregateEvaluator]) -> Solution {
        let mut solution = Solution::new();
        for (variable, value) in self.variables.iter().zip(key) {
            if let Some(value) = value {
                solution.set(variable.clone(), value);
            }
        }
        for ((variable, _), accumulator) in self.aggregates.iter().zip(accumulators) {
            if let Some(value) = accumulator.finish() {
                solution.set(variable.clone(), value);
            }
        }
        solution
    }
}
