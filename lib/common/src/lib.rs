mod blank_node_mode;
mod context;
pub mod error;
mod quad_storage;

pub use blank_node_mode::BlankNodeMatchingMode;
pub use context::{CancellationToken, ExecutionContext, ScopeId};
pub use quad_storage::{QuadIter, QuadStorage};

use crate::error::QueryEvaluationError;
use quadflow_model::Solution;

pub type QueryResult<T> = Result<T, QueryEvaluationError>;

/// A lazily evaluated sequence of [Solution]s. Pulling an element performs only the work that is
/// required for producing it.
pub type SolutionIter = Box<dyn Iterator<Item = QueryResult<Solution>>>;
