use crate::join::{JoinWorker, JoinWorkerRef};
use quadflow_common::{ExecutionContext, QueryResult, SolutionIter};
use quadflow_model::Solution;

/// Decorates another [JoinWorker].
///
/// On its own, the wrapper forwards every call to the inner worker. Decorators such as
/// [CachingJoinWorker](crate::join::CachingJoinWorker) embed a wrapper and only replace the
/// behavior they optimize. Reusability is always decided by the innermost worker.
#[derive(Debug)]
pub struct WrapperJoinWorker {
    inner: JoinWorkerRef,
}

impl WrapperJoinWorker {
    pub fn new(inner: impl JoinWorker + 'static) -> Self {
        Self {
            inner: Box::new(inner),
        }
    }

    pub fn inner(&self) -> &dyn JoinWorker {
        self.inner.as_ref()
    }

    pub fn into_inner(self) -> JoinWorkerRef {
        self.inner
    }
}

impl JoinWorker for WrapperJoinWorker {
    fn find(&self, lhs: &Solution, context: &ExecutionContext) -> QueryResult<SolutionIter> {
        self.inner.find(lhs, context)
    }

    fn can_reuse(&self, solution: &Solution, context: &ExecutionContext) -> bool {
        self.inner.can_reuse(solution, context)
    }
}
