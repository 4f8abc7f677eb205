//! Contains the [AlgebraExecutor] of [Quadflow](../../quadflow), which turns algebra trees into
//! lazy sequences of solutions.

mod executor;
mod extension;
mod options;

pub use executor::AlgebraExecutor;
pub use extension::ExtensionExecutor;
pub use options::QueryOptions;
