use quadflow_common::BlankNodeMatchingMode;
use quadflow_physical::join::JoinAlgorithm;

/// Options that control how an [AlgebraExecutor](crate::AlgebraExecutor) evaluates queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct QueryOptions {
    /// The algorithm used for joining a materialized right join input.
    pub join_algorithm: JoinAlgorithm,
    /// The number of join keys whose matches are cached per join. Zero disables the cache.
    pub join_cache_capacity: usize,
    /// If `true`, a join whose right input is a basic graph pattern evaluates the pattern once
    /// per join key with the join variables already bound, instead of materializing it.
    pub bind_join_patterns: bool,
    /// How blank nodes in basic graph patterns are matched.
    pub blank_node_mode: BlankNodeMatchingMode,
    /// If `true`, an expression error in a filter aborts the query instead of removing the
    /// solution.
    pub strict_filter_errors: bool,
}

impl QueryOptions {
    #[must_use]
    pub fn with_join_algorithm(mut self, join_algorithm: JoinAlgorithm) -> Self {
        self.join_algorithm = join_algorithm;
        self
    }

    #[must_use]
    pub fn with_join_cache_capacity(mut self, join_cache_capacity: usize) -> Self {
        self.join_cache_capacity = join_cache_capacity;
        self
    }

    #[must_use]
    pub fn with_bind_join_patterns(mut self, bind_join_patterns: bool) -> Self {
        self.bind_join_patterns = bind_join_patterns;
        self
    }

    #[must_use]
    pub fn with_blank_node_mode(mut self, blank_node_mode: BlankNodeMatchingMode) -> Self {
        self.blank_node_mode = blank_node_mode;
        self
    }

    #[must_use]
    pub fn with_strict_filter_errors(mut self, strict_filter_errors: bool) -> Self {
        self.strict_filter_errors = strict_filter_errors;
        self
    }
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            join_algorithm: JoinAlgorithm::Hash,
            join_cache_capacity: 0,
            bind_join_patterns: false,
            blank_node_mode: BlankNodeMatchingMode::Variable,
            strict_filter_errors: false,
        }
    }
}
