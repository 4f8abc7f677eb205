mod caching;
mod distinct;
mod factory;
mod hash;
mod loop_join;
mod probe;
mod probe_bound;
mod wrapper;

pub use caching::CachingJoinWorker;
pub use distinct::DistinctJoinWorker;
pub use factory::{
    JoinAlgorithm, JoinDecorators, JoinWorkerFactory, MaterializedJoinFactory,
    ProbeBoundJoinFactory, RightSideSource,
};
pub use hash::HashJoinWorker;
pub use loop_join::LoopJoinWorker;
pub use probe::{JoinCondition, JoinKind, JoinProbe};
pub use probe_bound::ProbeBoundJoinWorker;
pub use wrapper::WrapperJoinWorker;

use quadflow_common::{ExecutionContext, QueryResult, SolutionIter};
use quadflow_model::Solution;
use std::fmt::Debug;

/// A strategy for finding the solutions of the right join input that are compatible with a
/// solution of the left join input.
///
/// Two solutions are compatible if every join variable that is bound in both solutions is bound
/// to the same value. Workers only *find* the compatible right solutions; merging them with the
/// left solution is the task of the caller (see [JoinProbe]).
pub trait JoinWorker: Debug + Send + Sync {
    /// Returns the right solutions that are compatible with `lhs`.
    fn find(&self, lhs: &Solution, context: &ExecutionContext) -> QueryResult<SolutionIter>;

    /// Returns whether this worker, created for a previous probe, can also answer a probe with
    /// `solution`. If not, a new worker must be created for `solution`.
    fn can_reuse(&self, solution: &Solution, context: &ExecutionContext) -> bool;
}

/// A type-erased [JoinWorker].
pub type JoinWorkerRef = Box<dyn JoinWorker>;

impl<W: JoinWorker + ?Sized> JoinWorker for Box<W> {
    fn find(&self, lhs: &Solution, context: &ExecutionContext) -> QueryResult<SolutionIter> {
        self.as_ref().find(lhs, context)
    }

    fn can_reuse(&self, solution: &Solution, context: &ExecutionContext) -> bool {
        self.as_ref().can_reuse(solution, context)
    }
}
