use super::AlgebraExecutor;
use quadflow_common::error::QueryEvaluationError;
use quadflow_common::{BlankNodeMatchingMode, ExecutionContext, QueryResult, SolutionIter};
use quadflow_model::{
    BlankNode, GraphName, NamedNode, NamedNodePattern, Solution, Subject, Term, TermPattern,
    Triple, TriplePattern, Variable,
};
use quadflow_storage::QuadDataset;
use std::iter::{from_fn, once};
use std::sync::Arc;

/// Blank nodes of a pattern are matched with variables whose names start with this prefix. The
/// prefix is extended until no variable of the pattern or the seed solution starts with it.
const HIDDEN_VARIABLE_PREFIX: &str = "_bnode_";

impl AlgebraExecutor {
    pub(super) fn execute_bgp(
        &self,
        patterns: &[TriplePattern],
        context: &ExecutionContext,
    ) -> QueryResult<SolutionIter> {
        let graphs = self.dataset.active_graph_names(context.scope_id())?;
        self.evaluate_bgp(patterns, graphs.into(), Solution::new(), context)
    }

    /// Matches `patterns` one after another in `graphs`, starting from `seed`.
    ///
    /// Each solution of a pattern is extended by the matches of the next pattern. Hence, the
    /// solutions are produced in the order of the retrieved triples.
    pub(super) fn evaluate_bgp(
        &self,
        patterns: &[TriplePattern],
        graphs: Arc<[GraphName]>,
        seed: Solution,
        context: &ExecutionContext,
    ) -> QueryResult<SolutionIter> {
        let mode = self.options.blank_node_mode;
        let prefix = hidden_variable_prefix(patterns, &seed);
        let mut hidden = Vec::new();
        let mut solutions: SolutionIter = Box::new(once(Ok(seed)));

        for pattern in patterns {
            let matcher = Arc::new(PatternMatcher::try_new(pattern, mode, &prefix)?);
            hidden.extend(matcher.hidden_variables().cloned());
            let dataset = Arc::clone(&self.dataset);
            let graphs = Arc::clone(&graphs);
            let context = context.clone();
            solutions = Box::new(solutions.flat_map(move |solution| -> SolutionIter {
                match solution {
                    Ok(solution) => matcher.matches(&dataset, &graphs, solution, &context),
                    Err(error) => Box::new(once(Err(error))),
                }
            }));
        }

        if hidden.is_empty() {
            return Ok(solutions);
        }
        Ok(Box::new(solutions.map(move |solution| {
            solution.map(|mut solution| {
                for variable in &hidden {
                    solution.remove(variable);
                }
                solution
            })
        })))
    }
}

#[derive(Debug)]
enum Slot {
    Constant(Term),
    Variable { variable: Variable, hidden: bool },
}

impl Slot {
    fn bound(&self, solution: &Solution) -> Option<Term> {
        match self {
            Slot::Constant(term) => Some(term.clone()),
            Slot::Variable { variable, .. } => solution.get(variable).cloned(),
        }
    }
}

/// A triple pattern whose positions are either constants or variables.
#[derive(Debug)]
struct PatternMatcher {
    subject: Slot,
    predicate: Slot,
    object: Slot,
}

impl PatternMatcher {
    fn try_new(
        pattern: &TriplePattern,
        mode: BlankNodeMatchingMode,
        hidden_prefix: &str,
    ) -> QueryResult<Self> {
        let predicate = match &pattern.predicate {
            NamedNodePattern::NamedNode(node) => Slot::Constant(node.clone().into()),
            NamedNodePattern::Variable(variable) => Slot::Variable {
                variable: variable.clone(),
                hidden: false,
            },
        };
        Ok(Self {
            subject: term_slot(&pattern.subject, mode, hidden_prefix)?,
            predicate,
            object: term_slot(&pattern.object, mode, hidden_prefix)?,
        })
    }

    fn hidden_variables(&self) -> impl Iterator<Item = &Variable> {
        [&self.subject, &self.predicate, &self.object]
            .into_iter()
            .filter_map(|slot| match slot {
                Slot::Variable {
                    variable,
                    hidden: true,
                } => Some(variable),
                _ => None,
            })
    }

    /// Returns the extensions of `solution` by the triples matching this pattern.
    ///
    /// `context` is checked for every retrieved triple, as a single pull may skip many triples
    /// that do not match.
    fn matches(
        self: &Arc<Self>,
        dataset: &QuadDataset,
        graphs: &[GraphName],
        solution: Solution,
        context: &ExecutionContext,
    ) -> SolutionIter {
        let subject = match self.subject.bound(&solution) {
            Some(term) => match as_subject(term) {
                Some(subject) => Some(subject),
                None => return Box::new(std::iter::empty()),
            },
            None => None,
        };
        let predicate = match self.predicate.bound(&solution) {
            Some(Term::NamedNode(node)) => Some(node),
            Some(_) => return Box::new(std::iter::empty()),
            None => None,
        };
        let object = self.object.bound(&solution);

        let mut triples = dataset.triples_in_graphs(
            graphs.to_vec(),
            subject.as_ref().map(Subject::as_ref),
            predicate.as_ref().map(NamedNode::as_ref),
            object.as_ref().map(Term::as_ref),
        );
        let matcher = Arc::clone(self);
        let context = context.clone();
        let mut finished = false;
        Box::new(from_fn(move || {
            if finished {
                return None;
            }
            for triple in triples.by_ref() {
                if let Err(error) = context.check() {
                    finished = true;
                    return Some(Err(error));
                }
                match triple {
                    Ok(triple) => {
                        if let Some(solution) = matcher.bind(&solution, triple) {
                            return Some(Ok(solution));
                        }
                    }
                    Err(error) => return Some(Err(error.into())),
                }
            }
            finished = true;
            None
        }))
    }

    /// Binds the variables of this pattern to `triple`. Returns [None] if a variable occurs
    /// twice with different values.
    fn bind(&self, solution: &Solution, triple: Triple) -> Option<Solution> {
        let mut solution = solution.clone();
        for (slot, value) in [
            (&self.subject, Term::from(triple.subject)),
            (&self.predicate, triple.predicate.into()),
            (&self.object, triple.object),
        ] {
            if let Slot::Variable { variable, .. } = slot {
                if !solution.insert(variable.clone(), value) {
                    return None;
                }
            }
        }
        Some(solution)
    }
}

fn term_slot(
    pattern: &TermPattern,
    mode: BlankNodeMatchingMode,
    hidden_prefix: &str,
) -> QueryResult<Slot> {
    Ok(match pattern {
        TermPattern::NamedNode(node) => Slot::Constant(node.clone().into()),
        TermPattern::Literal(literal) => Slot::Constant(literal.clone().into()),
        TermPattern::Variable(variable) => Slot::Variable {
            variable: variable.clone(),
            hidden: false,
        },
        TermPattern::BlankNode(node) => match mode {
            BlankNodeMatchingMode::Variable => Slot::Variable {
                variable: hidden_variable(hidden_prefix, node),
                hidden: true,
            },
            BlankNodeMatchingMode::Filter => Slot::Constant(node.clone().into()),
        },
        #[allow(unreachable_patterns, reason = "RDF-star patterns are behind a feature flag")]
        _ => {
            return Err(QueryEvaluationError::internal(format!(
                "Unsupported term pattern {pattern}"
            )))
        }
    })
}

fn hidden_variable(prefix: &str, node: &BlankNode) -> Variable {
    Variable::new_unchecked(format!("{prefix}{}", node.as_str()))
}

fn hidden_variable_prefix(patterns: &[TriplePattern], seed: &Solution) -> String {
    let names = patterns
        .iter()
        .flat_map(|pattern| {
            let predicate = match &pattern.predicate {
                NamedNodePattern::Variable(variable) => Some(variable),
                NamedNodePattern::NamedNode(_) => None,
            };
            [term_variable(&pattern.subject), predicate, term_variable(&pattern.object)]
        })
        .flatten()
        .chain(seed.variables())
        .map(Variable::as_str)
        .collect::<Vec<_>>();

    let mut prefix = HIDDEN_VARIABLE_PREFIX.to_owned();
    while names.iter().any(|name| name.starts_with(&prefix)) {
        prefix.insert(0, '_');
    }
    prefix
}

fn term_variable(pattern: &TermPattern) -> Option<&Variable> {
    match pattern {
        TermPattern::Variable(variable) => Some(variable),
        _ => None,
    }
}

/// Literals never occur in subject position.
fn as_subject(term: Term) -> Option<Subject> {
    match term {
        Term::NamedNode(node) => Some(node.into()),
        Term::BlankNode(node) => Some(node.into()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use crate::{AlgebraExecutor, QueryOptions};
    use quadflow_common::{BlankNodeMatchingMode, ExecutionContext, QuadStorage};
    use quadflow_logical::{Algebra, Executor};
    use quadflow_model::{
        BlankNode, GraphName, Literal, NamedNode, Quad, Solution, Term, TermPattern,
        TriplePattern, Variable,
    };
    use quadflow_storage::memory::MemQuadStorage;
    use quadflow_storage::QuadDataset;
    use std::sync::Arc;

    fn iri(name: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("http://example.com/{name}"))
    }

    fn var(name: &str) -> TermPattern {
        Variable::new_unchecked(name).into()
    }

    fn triple(
        subject: impl Into<TermPattern>,
        predicate: NamedNode,
        object: impl Into<TermPattern>,
    ) -> TriplePattern {
        TriplePattern {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    fn executor(mode: BlankNodeMatchingMode) -> AlgebraExecutor {
        let storage = MemQuadStorage::new();
        let knows = iri("knows");
        for (subject, object) in [("a", "b"), ("b", "c"), ("a", "a")] {
            storage
                .insert(
                    Quad::new(iri(subject), knows.clone(), iri(object), GraphName::DefaultGraph)
                        .as_ref(),
                )
                .unwrap();
        }
        storage
            .insert(
                Quad::new(
                    BlankNode::new_unchecked("x"),
                    knows,
                    Literal::from(1_i64),
                    GraphName::DefaultGraph,
                )
                .as_ref(),
            )
            .unwrap();
        let dataset = QuadDataset::new(Arc::new(storage));
        AlgebraExecutor::new(Arc::new(dataset))
            .with_options(QueryOptions::default().with_blank_node_mode(mode))
    }

    fn evaluate(executor: &AlgebraExecutor, patterns: Vec<TriplePattern>) -> Vec<Solution> {
        executor
            .execute(&Algebra::bgp(patterns), &ExecutionContext::new())
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn chained_patterns() {
        let executor = executor(BlankNodeMatchingMode::Variable);
        let solutions = evaluate(
            &executor,
            vec![
                triple(var("x"), iri("knows"), var("y")),
                triple(var("y"), iri("knows"), var("z")),
            ],
        );
        let rendered = solutions.iter().map(ToString::to_string).collect::<Vec<_>>();
        insta::assert_debug_snapshot!(rendered, @r#"
        [
            "{?x -> <http://example.com/a>, ?y -> <http://example.com/b>, ?z -> <http://example.com/c>}",
            "{?x -> <http://example.com/a>, ?y -> <http://example.com/a>, ?z -> <http://example.com/b>}",
            "{?x -> <http://example.com/a>, ?y -> <http://example.com/a>, ?z -> <http://example.com/a>}",
        ]
        "#);
    }

    #[test]
    fn repeated_variable_requires_equal_terms() {
        let executor = executor(BlankNodeMatchingMode::Variable);
        let solutions = evaluate(
            &executor,
            vec![triple(var("x"), iri("knows"), var("x"))],
        );
        assert_eq!(solutions.len(), 1);
        assert_eq!(
            solutions[0].get(&Variable::new_unchecked("x")),
            Some(&Term::from(iri("a")))
        );
    }

    #[test]
    fn empty_pattern_yields_single_empty_solution() {
        let executor = executor(BlankNodeMatchingMode::Variable);
        assert_eq!(evaluate(&executor, Vec::new()), vec![Solution::new()]);
    }

    #[test]
    fn blank_nodes_match_as_hidden_variables() {
        let executor = executor(BlankNodeMatchingMode::Variable);
        let solutions = evaluate(
            &executor,
            vec![triple(
                BlankNode::new_unchecked("anything"),
                iri("knows"),
                var("o"),
            )],
        );
        assert_eq!(solutions.len(), 4);
        assert!(solutions.iter().all(|solution| solution.len() == 1));
    }

    #[test]
    fn hidden_variables_do_not_capture_user_variables() {
        let executor = executor(BlankNodeMatchingMode::Variable);
        for name in ["_bnode_o", "__bnode_o"] {
            let solutions = evaluate(
                &executor,
                vec![triple(BlankNode::new_unchecked("o"), iri("knows"), var(name))],
            );
            assert_eq!(solutions.len(), 4, "{name}");
            assert!(solutions
                .iter()
                .all(|solution| solution.get(&Variable::new_unchecked(name)).is_some()));
        }
    }

    #[test]
    fn blank_nodes_filter_in_filter_mode() {
        let executor = executor(BlankNodeMatchingMode::Filter);
        let solutions = evaluate(
            &executor,
            vec![triple(
                BlankNode::new_unchecked("x"),
                iri("knows"),
                var("o"),
            )],
        );
        assert_eq!(solutions.len(), 1);
        assert_eq!(
            solutions[0].get(&Variable::new_unchecked("o")),
            Some(&Term::from(Literal::from(1_i64)))
        );
    }

    #[test]
    fn literal_subject_matches_nothing() {
        let executor = executor(BlankNodeMatchingMode::Variable);
        let solutions = evaluate(
            &executor,
            vec![
                triple(var("s"), iri("knows"), var("o")),
                triple(var("o"), iri("knows"), var("next")),
            ],
        );
        assert!(solutions.iter().all(|solution| {
            !matches!(
                solution.get(&Variable::new_unchecked("o")),
                Some(Term::Literal(_))
            )
        }));
    }
}
