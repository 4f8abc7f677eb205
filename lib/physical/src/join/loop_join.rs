use crate::join::JoinWorker;
use quadflow_common::{ExecutionContext, QueryResult, SolutionIter};
use quadflow_model::{Solution, Variable};
use std::sync::Arc;

/// Finds compatible solutions by scanning the entire right join input for every probe.
///
/// The right input is held in memory and the found solutions keep its order. As the worker
/// does not depend on the probe, it can always be reused.
#[derive(Clone, Debug)]
pub struct LoopJoinWorker {
    variables: Arc<[Variable]>,
    right: Arc<[Solution]>,
}

impl LoopJoinWorker {
    pub fn new(variables: impl Into<Arc<[Variable]>>, right: impl Into<Arc<[Solution]>>) -> Self {
        Self {
            variables: variables.into(),
            right: right.into(),
        }
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn right(&self) -> &[Solution] {
        &self.right
    }
}

impl JoinWorker for LoopJoinWorker {
    fn find(&self, lhs: &Solution, _context: &ExecutionContext) -> QueryResult<SolutionIter> {
        let variables = Arc::clone(&self.variables);
        let right = Arc::clone(&self.right);
        let lhs = lhs.clone();
        Ok(Box::new((0..right.len()).filter_map(move |i| {
            let candidate = &right[i];
            lhs.is_compatible_with(candidate, &variables)
                .then(|| Ok(candidate.clone()))
        })))
    }

    fn can_reuse(&self, _solution: &Solution, _context: &ExecutionContext) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::join::test_utils::{collect, context, solution, var};

    fn worker() -> LoopJoinWorker {
        LoopJoinWorker::new(
            vec![var("x")],
            vec![
                solution(&[("x", 1), ("y", 10)]),
                solution(&[("x", 2), ("y", 20)]),
                solution(&[("y", 30)]),
                solution(&[("x", 1), ("y", 40)]),
            ],
        )
    }

    #[test]
    fn finds_compatible_solutions_in_order() {
        let found = collect(worker().find(&solution(&[("x", 1)]), &context()));
        assert_eq!(
            found,
            vec![
                solution(&[("x", 1), ("y", 10)]),
                solution(&[("y", 30)]),
                solution(&[("x", 1), ("y", 40)]),
            ]
        );
    }

    #[test]
    fn unbound_probe_matches_everything() {
        let found = collect(worker().find(&solution(&[("z", 1)]), &context()));
        assert_eq!(found.len(), 4);
    }

    #[test]
    fn empty_join_variables_produce_cartesian_product() {
        let worker = LoopJoinWorker::new(
            Vec::<Variable>::new(),
            vec![solution(&[("x", 1)]), solution(&[("x", 2)])],
        );
        let found = collect(worker.find(&solution(&[("x", 3)]), &context()));
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn empty_right_side_finds_nothing() {
        let worker = LoopJoinWorker::new(vec![var("x")], Vec::<Solution>::new());
        assert!(collect(worker.find(&solution(&[("x", 1)]), &context())).is_empty());
        assert!(collect(worker.find(&Solution::new(), &context())).is_empty());
    }

    #[test]
    fn is_always_reusable() {
        let worker = worker();
        assert!(worker.can_reuse(&solution(&[("x", 1)]), &context()));
        assert!(worker.can_reuse(&Solution::new(), &context()));
    }
}
