use itertools::Itertools;
use quadflow_model::GraphName;

/// The graph scoping state of a single query.
///
/// Both stacks grow when a query enters a nested scope (e.g., a `GRAPH` clause) and shrink when
/// the scope is left again.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct GraphScopes {
    pub default_graphs: Vec<Vec<GraphName>>,
    pub active_graphs: Vec<Vec<GraphName>>,
}

impl GraphScopes {
    pub fn new(initial_default_graphs: Vec<Vec<GraphName>>) -> Self {
        Self {
            default_graphs: initial_default_graphs,
            active_graphs: Vec::new(),
        }
    }

    /// Returns whether the scopes are in the same state as [GraphScopes::new] with
    /// `initial_default_graphs`.
    pub fn is_initial(&self, initial_default_graphs: &[Vec<GraphName>]) -> bool {
        self.active_graphs.is_empty() && self.default_graphs == initial_default_graphs
    }
}

/// Removes duplicate graph names while keeping the order of their first occurrence.
pub(super) fn unique_graph_names(names: impl IntoIterator<Item = GraphName>) -> Vec<GraphName> {
    names.into_iter().unique().collect()
}
