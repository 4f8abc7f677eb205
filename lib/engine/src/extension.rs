use crate::AlgebraExecutor;
use quadflow_common::{ExecutionContext, QueryResult, SolutionIter};
use quadflow_logical::ExtensionNode;

/// Executes the [ExtensionNode]s of a single kind.
///
/// Executors are registered with [AlgebraExecutor::with_extension_executor] and receive every
/// extension node whose [name](quadflow_logical::AlgebraExtension::name) matches
/// [ExtensionExecutor::name]. The inputs of the node can be evaluated with `executor`.
pub trait ExtensionExecutor: Send + Sync {
    fn name(&self) -> &str;

    fn execute(
        &self,
        node: &ExtensionNode,
        executor: &AlgebraExecutor,
        context: &ExecutionContext,
    ) -> QueryResult<SolutionIter>;
}
