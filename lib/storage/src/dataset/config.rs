use quadflow_model::GraphName;

/// Configures how a [QuadDataset](crate::QuadDataset) resolves its default graph.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DatasetConfig {
    /// If `true`, the default graph is the union of all graphs in the storage unless a query sets
    /// its own default graph.
    pub union_default_graph: bool,
    /// The graph that acts as the default graph if `union_default_graph` is `false`.
    pub default_graph: GraphName,
}

impl DatasetConfig {
    /// Uses the union of all graphs as the default graph.
    pub fn union_default_graph() -> Self {
        Self {
            union_default_graph: true,
            default_graph: GraphName::DefaultGraph,
        }
    }

    /// Uses `graph` as the default graph.
    pub fn with_default_graph(graph: impl Into<GraphName>) -> Self {
        Self {
            union_default_graph: false,
            default_graph: graph.into(),
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self::union_default_graph()
    }
}
