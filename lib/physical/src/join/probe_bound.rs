use crate::join::JoinWorker;
use quadflow_common::{ExecutionContext, QueryResult, SolutionIter};
use quadflow_model::{JoinKey, Solution, Variable};
use std::sync::Arc;

/// Holds the right solutions that have been computed for a single probe.
///
/// The worker is only valid for probes that bind the join variables to the same values as the
/// probe it has been created for. Usually, the right input is evaluated with the join variables
/// already bound (see [ProbeBoundJoinFactory](crate::join::ProbeBoundJoinFactory)).
#[derive(Clone, Debug)]
pub struct ProbeBoundJoinWorker {
    variables: Arc<[Variable]>,
    key: JoinKey,
    right: Arc<[Solution]>,
}

impl ProbeBoundJoinWorker {
    pub fn new(
        variables: impl Into<Arc<[Variable]>>,
        key: JoinKey,
        right: impl Into<Arc<[Solution]>>,
    ) -> Self {
        Self {
            variables: variables.into(),
            key,
            right: right.into(),
        }
    }

    /// The values of the join variables this worker has been created for.
    pub fn key(&self) -> &JoinKey {
        &self.key
    }
}

impl JoinWorker for ProbeBoundJoinWorker {
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

    fn can_reuse(&self, solution: &Solution, _context: &ExecutionContext) -> bool {
        solution.join_key(&self.variables) == self.key
    }
}
