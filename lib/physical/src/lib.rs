//! Contains the physical building blocks that the executor of
//! [Quadflow](../../quadflow) assembles into lazy solution pipelines.
//!
//! The central abstraction is the [JoinWorker](join::JoinWorker). Given a solution of the left
//! join input, a join worker finds the compatible solutions of the right join input. Workers can
//! be decorated (see [WrapperJoinWorker](join::WrapperJoinWorker)) to add caching or
//! de-duplication without changing the observable results.

mod cancellation;
pub mod join;

pub use cancellation::CancellableIter;
