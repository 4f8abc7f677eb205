use crate::join::{JoinWorker, WrapperJoinWorker};
use quadflow_common::{ExecutionContext, QueryResult, SolutionIter};
use quadflow_model::Solution;
use rustc_hash::FxHashSet;

/// Removes duplicate right solutions from the results of every probe.
#[derive(Debug)]
pub struct DistinctJoinWorker {
    wrapper: WrapperJoinWorker,
}

impl DistinctJoinWorker {
    pub fn new(inner: impl JoinWorker + 'static) -> Self {
        Self {
            wrapper: WrapperJoinWorker::new(inner),
        }
    }
}

impl JoinWorker for DistinctJoinWorker {
    fn find(&self, lhs: &Solution, context: &ExecutionContext) -> QueryResult<SolutionIter> {
        let mut seen = FxHashSet::default();
        Ok(Box::new(self.wrapper.find(lhs, context)?.filter(
            move |solution| match solution {
                Ok(solution) => seen.insert(solution.clone()),
                Err(_) => true,
            },
        )))
    }

    fn can_reuse(&self, solution: &Solution, context: &ExecutionContext) -> bool {
        self.wrapper.can_reuse(solution, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::join::test_utils::{collect, context, solution, var};
    use crate::join::LoopJoinWorker;

    #[test]
    fn removes_duplicates_keeping_first_occurrence() {
        let worker = DistinctJoinWorker::new(LoopJoinWorker::new(
            vec![var("x")],
            vec![
                solution(&[("x", 1), ("y", 2)]),
                solution(&[("x", 1), ("y", 1)]),
                solution(&[("x", 1), ("y", 2)]),
                solution(&[("x", 2), ("y", 2)]),
            ],
        ));

        let found = collect(worker.find(&solution(&[("x", 1)]), &context()));
        assert_eq!(
            found,
            vec![
                solution(&[("x", 1), ("y", 2)]),
                solution(&[("x", 1), ("y", 1)]),
            ]
        );
    }
}
