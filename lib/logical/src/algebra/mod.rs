mod extension;
mod filter;

pub use extension::{AlgebraExtension, ExtensionNode};
pub use filter::Filter;

use crate::expr::{AggregateExpression, Expression};
use quadflow_common::error::UsageError;
use quadflow_common::{ExecutionContext, QueryResult, SolutionIter};
use quadflow_model::{
    GraphName, NamedNodePattern, Solution, TermPattern, TriplePattern, Variable,
};
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Turns algebra nodes into lazy solution sequences.
pub trait Executor {
    /// Returns a lazy sequence of the solutions of `algebra`. Implementations must not
    /// materialize the results eagerly.
    fn execute(&self, algebra: &Algebra, context: &ExecutionContext)
        -> QueryResult<SolutionIter>;
}

/// A sort key of [Algebra::OrderBy].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum OrderCondition {
    Asc(Expression),
    Desc(Expression),
}

impl OrderCondition {
    pub fn expression(&self) -> &Expression {
        match self {
            OrderCondition::Asc(expression) | OrderCondition::Desc(expression) => expression,
        }
    }
}

impl Display for OrderCondition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderCondition::Asc(expression) => write!(f, "ASC({expression})"),
            OrderCondition::Desc(expression) => write!(f, "DESC({expression})"),
        }
    }
}

/// An immutable query plan node. Inner nodes are shared.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Algebra {
    /// Matches a basic graph pattern against the active graph.
    Bgp { patterns: Vec<TriplePattern> },
    /// A static sequence of solutions.
    Table {
        variables: Vec<Variable>,
        rows: Vec<Solution>,
    },
    Join {
        left: Arc<Algebra>,
        right: Arc<Algebra>,
    },
    LeftJoin {
        left: Arc<Algebra>,
        right: Arc<Algebra>,
        expression: Option<Expression>,
    },
    Minus {
        left: Arc<Algebra>,
        right: Arc<Algebra>,
    },
    Union {
        left: Arc<Algebra>,
        right: Arc<Algebra>,
    },
    Filter(Filter),
    /// Binds `variable` to the value of `expression`.
    Extend {
        inner: Arc<Algebra>,
        variable: Variable,
        expression: Expression,
    },
    Project {
        inner: Arc<Algebra>,
        variables: Vec<Variable>,
    },
    Distinct { inner: Arc<Algebra> },
    Slice {
        inner: Arc<Algebra>,
        offset: usize,
        limit: Option<usize>,
    },
    OrderBy {
        inner: Arc<Algebra>,
        conditions: Vec<OrderCondition>,
    },
    Group {
        inner: Arc<Algebra>,
        variables: Vec<Variable>,
        aggregates: Vec<(Variable, AggregateExpression)>,
    },
    /// Evaluates `inner` with the given graph (or each named graph) as the active graph.
    Graph {
        inner: Arc<Algebra>,
        name: NamedNodePattern,
    },
    /// Evaluates `inner` with `default_graphs` as its default and active graph.
    DatasetScope {
        inner: Arc<Algebra>,
        default_graphs: Vec<GraphName>,
    },
    Extension(ExtensionNode),
}

impl Algebra {
    /// A table with a single empty solution. This is the identity of [Algebra::Join].
    pub fn unit() -> Self {
        Self::Table {
            variables: Vec::new(),
            rows: vec![Solution::new()],
        }
    }

    /// A table without any solutions.
    pub fn empty() -> Self {
        Self::Table {
            variables: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn bgp(patterns: impl IntoIterator<Item = TriplePattern>) -> Self {
        Self::Bgp {
            patterns: patterns.into_iter().collect(),
        }
    }

    pub fn table(variables: Vec<Variable>, rows: Vec<Solution>) -> Self {
        Self::Table { variables, rows }
    }

    pub fn join(left: impl Into<Arc<Algebra>>, right: impl Into<Arc<Algebra>>) -> Self {
        Self::Join {
            left: left.into(),
            right: right.into(),
        }
    }

    pub fn left_join(
        left: impl Into<Arc<Algebra>>,
        right: impl Into<Arc<Algebra>>,
        expression: Option<Expression>,
    ) -> Self {
        Self::LeftJoin {
            left: left.into(),
            right: right.into(),
            expression,
        }
    }

    pub fn minus(left: impl Into<Arc<Algebra>>, right: impl Into<Arc<Algebra>>) -> Self {
        Self::Minus {
            left: left.into(),
            right: right.into(),
        }
    }

    pub fn union(left: impl Into<Arc<Algebra>>, right: impl Into<Arc<Algebra>>) -> Self {
        Self::Union {
            left: left.into(),
            right: right.into(),
        }
    }

    /// Creates a filter using [Filter::create].
    pub fn filter(
        inner: impl Into<Arc<Algebra>>,
        expressions: impl IntoIterator<Item = Expression>,
    ) -> Result<Self, UsageError> {
        Filter::create(inner, expressions).map(Self::Filter)
    }

    pub fn extend(
        inner: impl Into<Arc<Algebra>>,
        variable: Variable,
        expression: Expression,
    ) -> Self {
        Self::Extend {
            inner: inner.into(),
            variable,
            expression,
        }
    }

    pub fn project(inner: impl Into<Arc<Algebra>>, variables: Vec<Variable>) -> Self {
        Self::Project {
            inner: inner.into(),
            variables,
        }
    }

    pub fn distinct(inner: impl Into<Arc<Algebra>>) -> Self {
        Self::Distinct {
            inner: inner.into(),
        }
    }

    pub fn slice(inner: impl Into<Arc<Algebra>>, offset: usize, limit: Option<usize>) -> Self {
        Self::Slice {
            inner: inner.into(),
            offset,
            limit,
        }
    }

    pub fn order_by(inner: impl Into<Arc<Algebra>>, conditions: Vec<OrderCondition>) -> Self {
        Self::OrderBy {
            inner: inner.into(),
            conditions,
        }
    }

    pub fn group(
        inner: impl Into<Arc<Algebra>>,
        variables: Vec<Variable>,
        aggregates: Vec<(Variable, AggregateExpression)>,
    ) -> Self {
        Self::Group {
            inner: inner.into(),
            variables,
            aggregates,
        }
    }

    pub fn graph(inner: impl Into<Arc<Algebra>>, name: impl Into<NamedNodePattern>) -> Self {
        Self::Graph {
            inner: inner.into(),
            name: name.into(),
        }
    }

    pub fn dataset_scope(inner: impl Into<Arc<Algebra>>, default_graphs: Vec<GraphName>) -> Self {
        Self::DatasetScope {
            inner: inner.into(),
            default_graphs,
        }
    }

    pub fn extension(node: impl AlgebraExtension) -> Self {
        Self::Extension(ExtensionNode::new(node))
    }

    /// A short name of the node kind.
    pub fn name(&self) -> &str {
        match self {
            Algebra::Bgp { .. } => "Bgp",
            Algebra::Table { .. } => "Table",
            Algebra::Join { .. } => "Join",
            Algebra::LeftJoin { .. } => "LeftJoin",
            Algebra::Minus { .. } => "Minus",
            Algebra::Union { .. } => "Union",
            Algebra::Filter(_) => "Filter",
            Algebra::Extend { .. } => "Extend",
            Algebra::Project { .. } => "Project",
            Algebra::Distinct { .. } => "Distinct",
            Algebra::Slice { .. } => "Slice",
            Algebra::OrderBy { .. } => "OrderBy",
            Algebra::Group { .. } => "Group",
            Algebra::Graph { .. } => "Graph",
            Algebra::DatasetScope { .. } => "DatasetScope",
            Algebra::Extension(node) => node.node().name(),
        }
    }

    /// Returns the inner nodes.
    pub fn inputs(&self) -> Vec<&Algebra> {
        match self {
            Algebra::Bgp { .. } | Algebra::Table { .. } => Vec::new(),
            Algebra::Join { left, right }
            | Algebra::LeftJoin { left, right, .. }
            | Algebra::Minus { left, right }
            | Algebra::Union { left, right } => vec![left.as_ref(), right.as_ref()],
            Algebra::Filter(filter) => vec![filter.inner().as_ref()],
            Algebra::Extend { inner, .. }
            | Algebra::Project { inner, .. }
            | Algebra::Distinct { inner }
            | Algebra::Slice { inner, .. }
            | Algebra::OrderBy { inner, .. }
            | Algebra::Group { inner, .. }
            | Algebra::Graph { inner, .. }
            | Algebra::DatasetScope { inner, .. } => vec![inner.as_ref()],
            Algebra::Extension(node) => node.node().inputs(),
        }
    }

    /// Returns the variables that may be bound in the solutions of this node in the order of
    /// their first occurrence.
    pub fn variables(&self) -> Vec<Variable> {
        let mut variables = Vec::new();
        self.collect_variables(&mut variables);
        variables
    }

    fn collect_variables(&self, variables: &mut Vec<Variable>) {
        let mut add = |variable: &Variable| {
            if !variables.contains(variable) {
                variables.push(variable.clone());
            }
        };
        match self {
            Algebra::Bgp { patterns } => {
                for pattern in patterns {
                    if let TermPattern::Variable(variable) = &pattern.subject {
                        add(variable);
                    }
                    if let NamedNodePattern::Variable(variable) = &pattern.predicate {
                        add(variable);
                    }
                    if let TermPattern::Variable(variable) = &pattern.object {
                        add(variable);
                    }
                }
            }
            Algebra::Table {
                variables: table_variables,
                ..
            } => table_variables.iter().for_each(add),
            Algebra::Join { left, right }
            | Algebra::LeftJoin { left, right, .. }
            | Algebra::Union { left, right } => {
                left.collect_variables(variables);
                right.collect_variables(variables);
            }
            Algebra::Minus { left, .. } => left.collect_variables(variables),
            Algebra::Filter(filter) => filter.inner().collect_variables(variables),
            Algebra::Extend {
                inner, variable, ..
            } => {
                inner.collect_variables(variables);
                if !variables.contains(variable) {
                    variables.push(variable.clone());
                }
            }
            Algebra::Project {
                variables: projected,
                ..
            } => projected.iter().for_each(add),
            Algebra::Group {
                variables: group_variables,
                aggregates,
                ..
            } => {
                group_variables.iter().for_each(&mut add);
                aggregates.iter().for_each(|(variable, _)| add(variable));
            }
            Algebra::Graph { inner, name } => {
                if let NamedNodePattern::Variable(variable) = name {
                    add(variable);
                }
                inner.collect_variables(variables);
            }
            Algebra::Distinct { inner }
            | Algebra::Slice { inner, .. }
            | Algebra::OrderBy { inner, .. }
            | Algebra::DatasetScope { inner, .. } => inner.collect_variables(variables),
            Algebra::Extension(node) => node.node().variables().iter().for_each(add),
        }
    }

    /// Evaluates this node lazily using `executor`.
    pub fn execute<E: Executor + ?Sized>(
        &self,
        executor: &E,
        context: &ExecutionContext,
    ) -> QueryResult<SolutionIter> {
        executor.execute(self, context)
    }

    fn fmt_node(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Algebra::Bgp { patterns } => {
                f.write_str("Bgp:")?;
                for (i, pattern) in patterns.iter().enumerate() {
                    let separator = if i == 0 { " " } else { ", " };
                    write!(f, "{separator}{pattern}")?;
                }
                Ok(())
            }
            Algebra::Table { variables, rows } => {
                f.write_str("Table: [")?;
                fmt_variables(variables, f)?;
                write!(f, "] rows={}", rows.len())
            }
            Algebra::LeftJoin {
                expression: Some(expression),
                ..
            } => write!(f, "LeftJoin: {expression}"),
            Algebra::Filter(filter) => {
                f.write_str("Filter: ")?;
                for (i, expression) in filter.expressions().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{expression}")?;
                }
                Ok(())
            }
            Algebra::Extend {
                variable,
                expression,
                ..
            } => write!(f, "Extend: {variable} := {expression}"),
            Algebra::Project { variables, .. } => {
                f.write_str("Project: ")?;
                fmt_variables(variables, f)
            }
            Algebra::Slice { offset, limit, .. } => match limit {
                Some(limit) => write!(f, "Slice: offset={offset}, limit={limit}"),
                None => write!(f, "Slice: offset={offset}"),
            },
            Algebra::OrderBy { conditions, .. } => {
                f.write_str("OrderBy: ")?;
                for (i, condition) in conditions.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{condition}")?;
                }
                Ok(())
            }
            Algebra::Group {
                variables,
                aggregates,
                ..
            } => {
                f.write_str("Group: [")?;
                fmt_variables(variables, f)?;
                f.write_str("], [")?;
                for (i, (variable, aggregate)) in aggregates.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{variable} := {aggregate}")?;
                }
                f.write_str("]")
            }
            Algebra::Graph { name, .. } => write!(f, "Graph: {name}"),
            Algebra::DatasetScope { default_graphs, .. } => {
                f.write_str("DatasetScope: ")?;
                for (i, graph) in default_graphs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{graph}")?;
                }
                Ok(())
            }
            Algebra::Extension(node) => node.node().fmt_for_explain(f),
            Algebra::Join { .. }
            | Algebra::LeftJoin { .. }
            | Algebra::Minus { .. }
            | Algebra::Union { .. }
            | Algebra::Distinct { .. } => f.write_str(self.name()),
        }
    }

    fn fmt_indented(&self, f: &mut Formatter<'_>, indent: usize) -> std::fmt::Result {
        write!(f, "{:indent$}", "")?;
        self.fmt_node(f)?;
        for input in self.inputs() {
            writeln!(f)?;
            input.fmt_indented(f, indent + 2)?;
        }
        Ok(())
    }
}

fn fmt_variables(variables: &[Variable], f: &mut Formatter<'_>) -> std::fmt::Result {
    for (i, variable) in variables.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{variable}")?;
    }
    Ok(())
}

/// Renders the node as an indented explain tree.
impl Display for Algebra {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.fmt_indented(f, 0)
    }
}
