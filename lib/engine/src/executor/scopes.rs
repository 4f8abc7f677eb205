use super::AlgebraExecutor;
use quadflow_common::{ExecutionContext, QueryResult, SolutionIter};
use quadflow_logical::{Algebra, Executor};
use quadflow_model::{GraphName, NamedNodePattern, Term, Variable};

impl AlgebraExecutor {
    /// Evaluates `inner` with `name` as the active graph. A variable ranges over all named graphs
    /// of the dataset and is bound to the graph the solutions stem from.
    pub(super) fn execute_graph(
        &self,
        inner: &Algebra,
        name: &NamedNodePattern,
        context: &ExecutionContext,
    ) -> QueryResult<SolutionIter> {
        match name {
            NamedNodePattern::NamedNode(graph) => {
                self.with_active_graph(GraphName::from(graph.clone()), inner, context)
            }
            NamedNodePattern::Variable(variable) => {
                let mut parts = Vec::new();
                for graph in self.dataset.graph_names()? {
                    let term = match &graph {
                        GraphName::NamedNode(node) => Term::from(node.clone()),
                        GraphName::BlankNode(node) => Term::from(node.clone()),
                        GraphName::DefaultGraph => continue,
                    };
                    let solutions = self.with_active_graph(graph, inner, context)?;
                    parts.push(bind_graph(solutions, variable.clone(), term));
                }
                Ok(Box::new(parts.into_iter().flatten()))
            }
        }
    }

    /// Evaluates `inner` with `default_graphs` as its default graph and active graph.
    pub(super) fn execute_dataset_scope(
        &self,
        inner: &Algebra,
        default_graphs: &[GraphName],
        context: &ExecutionContext,
    ) -> QueryResult<SolutionIter> {
        let scope = context.scope_id();
        self.dataset
            .set_default_graph(scope, default_graphs.iter().cloned());
        if let Err(error) = self
            .dataset
            .set_active_graph(scope, default_graphs.iter().cloned())
        {
            self.dataset.reset_default_graph(scope)?;
            return Err(error.into());
        }

        let solutions = self.execute(inner, context);
        self.dataset.reset_active_graph(scope)?;
        self.dataset.reset_default_graph(scope)?;
        solutions
    }

    /// Pushes `graph` as the active graph while the iterator of `inner` is created.
    fn with_active_graph(
        &self,
        graph: GraphName,
        inner: &Algebra,
        context: &ExecutionContext,
    ) -> QueryResult<SolutionIter> {
        let scope = context.scope_id();
        self.dataset.set_active_graph(scope, [graph])?;
        let solutions = self.execute(inner, context);
        self.dataset.reset_active_graph(scope)?;
        solutions
    }
}

/// Binds `variable` to `graph`. Solutions that already bind it to another term are removed.
fn bind_graph(solutions: SolutionIter, variable: Variable, graph: Term) -> SolutionIter {
    Box::new(solutions.filter_map(move |solution| match solution {
        Ok(mut solution) => solution
            .insert(variable.clone(), graph.clone())
            .then_some(Ok(solution)),
        Err(error) => Some(Err(error)),
    }))
}

#[cfg(test)]
mod tests {
    use crate::AlgebraExecutor;
    use quadflow_common::{ExecutionContext, QuadStorage};
    use quadflow_logical::{Algebra, Executor};
    use quadflow_model::{
        GraphName, Literal, NamedNode, NamedNodePattern, Quad, TriplePattern, Variable,
    };
    use quadflow_storage::memory::MemQuadStorage;
    use quadflow_storage::{DatasetConfig, QuadDataset};
    use std::sync::Arc;

    fn iri(name: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("http://example.com/{name}"))
    }

    fn var(name: &str) -> Variable {
        Variable::new_unchecked(name)
    }

    fn dataset(config: DatasetConfig) -> Arc<QuadDataset> {
        let storage = MemQuadStorage::new();
        for (value, graph) in [
            ("default", GraphName::DefaultGraph),
            ("one", iri("g1").into()),
            ("two", iri("g2").into()),
        ] {
            storage
                .insert(
                    Quad::new(iri("s"), iri("p"), Literal::new_simple_literal(value), graph)
                        .as_ref(),
                )
                .unwrap();
        }
        Arc::new(QuadDataset::with_config(Arc::new(storage), config))
    }

    fn values() -> Algebra {
        Algebra::bgp([TriplePattern {
            subject: var("s").into(),
            predicate: iri("p").into(),
            object: var("o").into(),
        }])
    }

    fn evaluate(dataset: &Arc<QuadDataset>, algebra: &Algebra) -> Vec<String> {
        let context = ExecutionContext::new();
        let solutions = AlgebraExecutor::new(Arc::clone(dataset))
            .execute(algebra, &context)
            .unwrap()
            .map(|solution| solution.unwrap().to_string())
            .collect();
        assert_eq!(dataset.open_scopes(), 0);
        solutions
    }

    #[test]
    fn graph_with_iri_restricts_active_graph() {
        let dataset = dataset(DatasetConfig::union_default_graph());
        let algebra = Algebra::graph(values(), iri("g2"));
        insta::assert_debug_snapshot!(evaluate(&dataset, &algebra), @r#"
        [
            "{?o -> \"two\", ?s -> <http://example.com/s>}",
        ]
        "#);
    }

    #[test]
    fn graph_with_variable_iterates_named_graphs() {
        let dataset = dataset(DatasetConfig::with_default_graph(GraphName::DefaultGraph));
        let algebra = Algebra::graph(values(), NamedNodePattern::Variable(var("g")));
        insta::assert_debug_snapshot!(evaluate(&dataset, &algebra), @r#"
        [
            "{?g -> <http://example.com/g1>, ?o -> \"one\", ?s -> <http://example.com/s>}",
            "{?g -> <http://example.com/g2>, ?o -> \"two\", ?s -> <http://example.com/s>}",
        ]
        "#);
    }

    #[test]
    fn dataset_scope_replaces_default_graph() {
        let dataset = dataset(DatasetConfig::with_default_graph(GraphName::DefaultGraph));
        let default_only = evaluate(&dataset, &values());
        assert_eq!(default_only, vec![r#"{?o -> "default", ?s -> <http://example.com/s>}"#]);

        let algebra = Algebra::dataset_scope(values(), vec![iri("g1").into(), iri("g2").into()]);
        insta::assert_debug_snapshot!(evaluate(&dataset, &algebra), @r#"
        [
            "{?o -> \"one\", ?s -> <http://example.com/s>}",
            "{?o -> \"two\", ?s -> <http://example.com/s>}",
        ]
        "#);
    }

    #[test]
    fn scopes_are_released_before_pulling() {
        let dataset = dataset(DatasetConfig::union_default_graph());
        let context = ExecutionContext::new();
        let algebra = Algebra::union(
            Algebra::graph(values(), iri("g1")),
            Algebra::dataset_scope(values(), vec![iri("g2").into()]),
        );
        let solutions = AlgebraExecutor::new(Arc::clone(&dataset))
            .execute(&algebra, &context)
            .unwrap();
        assert_eq!(dataset.open_scopes(), 0);
        assert_eq!(solutions.count(), 2);
    }
}
