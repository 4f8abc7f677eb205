use crate::join::{JoinWorkerFactory, JoinWorkerRef};
use quadflow_common::{ExecutionContext, QueryResult, SolutionIter};
use quadflow_model::Solution;

/// How the solutions of a [JoinProbe] are derived from the compatible pairs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JoinKind {
    /// Emits the merged solution of every compatible pair.
    Inner,
    /// Like [JoinKind::Inner], but emits the left solution unchanged if no pair has been emitted
    /// for it.
    LeftOuter,
    /// Emits the left solutions without a compatible right solution that shares a bound variable
    /// with them (SPARQL `MINUS`).
    Anti,
}

/// A predicate on the merged solutions of an inner or left-outer join.
pub type JoinCondition = Box<dyn Fn(&Solution) -> bool>;

struct ProbeState {
    lhs: Solution,
    right: SolutionIter,
    matched: bool,
}

/// Lazily joins a left input with the right input represented by a [JoinWorkerFactory].
///
/// Every pull advances the current probe by at most one right solution or opens the next probe.
/// The worker of the previous probe is reused if it reports that it can answer the next probe.
/// The execution context is checked between pulls. After an error of the context or of the
/// factory, the probe is exhausted.
pub struct JoinProbe {
    kind: JoinKind,
    left: SolutionIter,
    factory: Box<dyn JoinWorkerFactory>,
    context: ExecutionContext,
    condition: Option<JoinCondition>,
    worker: Option<JoinWorkerRef>,
    current: Option<ProbeState>,
    finished: bool,
}

impl JoinProbe {
    pub fn new(
        kind: JoinKind,
        left: SolutionIter,
        factory: Box<dyn JoinWorkerFactory>,
        context: ExecutionContext,
    ) -> Self {
        Self {
            kind,
            left,
            factory,
            context,
            condition: None,
            worker: None,
            current: None,
            finished: false,
        }
    }

    /// Only merged solutions satisfying `condition` are considered a match. Ignored by
    /// [JoinKind::Anti].
    #[must_use]
    pub fn with_condition(mut self, condition: JoinCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    fn open(&mut self, lhs: Solution) -> QueryResult<ProbeState> {
        let worker = match self.worker.take() {
            Some(worker) if worker.can_reuse(&lhs, &self.context) => worker,
            _ => {
                tracing::trace!("Creating join worker for {lhs}");
                self.factory.create(&lhs, &self.context)?
            }
        };
        let right = worker.find(&lhs, &self.context)?;
        self.worker = Some(worker);
        Ok(ProbeState {
            lhs,
            right,
            matched: false,
        })
    }

    fn accepts(&self, solution: &Solution) -> bool {
        self.condition
            .as_ref()
            .map_or(true, |condition| condition(solution))
    }
}

impl Iterator for JoinProbe {
    type Item = QueryResult<Solution>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.finished {
                return None;
            }
            if let Err(error) = self.context.check() {
                tracing::warn!("Stopping join: {error}");
                self.finished = true;
                return Some(Err(error));
            }

            if let Some(mut probe) = self.current.take() {
                match probe.right.next() {
                    Some(Ok(rhs)) => {
                        if self.kind == JoinKind::Anti {
                            let excluded = probe.lhs.shares_variable_with(&rhs)
                                && probe.lhs.is_compatible_with_all(&rhs);
                            if !excluded {
                                self.current = Some(probe);
                            }
                            continue;
                        }
                        let merged = probe
                            .lhs
                            .merge(&rhs)
                            .filter(|merged| self.accepts(merged));
                        if merged.is_some() {
                            probe.matched = true;
                        }
                        self.current = Some(probe);
                        if let Some(merged) = merged {
                            return Some(Ok(merged));
                        }
                    }
                    Some(Err(error)) => {
                        self.current = Some(probe);
                        return Some(Err(error));
                    }
                    None => match self.kind {
                        JoinKind::Inner => {}
                        JoinKind::LeftOuter if probe.matched => {}
                        JoinKind::LeftOuter | JoinKind::Anti => return Some(Ok(probe.lhs)),
                    },
                }
                continue;
            }

            match self.left.next()? {
                Ok(lhs) => match self.open(lhs) {
                    Ok(probe) => self.current = Some(probe),
                    Err(error) => {
                        self.finished = true;
                        return Some(Err(error));
                    }
                },
                Err(error) => return Some(Err(error)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::join::test_utils::{context, int, solution, var};
    use crate::join::{
        JoinAlgorithm, MaterializedJoinFactory, ProbeBoundJoinFactory, RightSideSource,
    };
    use quadflow_common::error::QueryEvaluationError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn left(solutions: Vec<Solution>) -> SolutionIter {
        Box::new(solutions.into_iter().map(Ok))
    }

    fn factory(right: Vec<Solution>) -> Box<dyn JoinWorkerFactory> {
        Box::new(MaterializedJoinFactory::new(
            vec![var("x")],
            right,
            JoinAlgorithm::Hash,
        ))
    }

    fn run(probe: JoinProbe) -> Vec<String> {
        probe
            .map(|solution| solution.unwrap().to_string())
            .collect()
    }

    #[test]
    fn inner_join_merges_compatible_pairs() {
        let probe = JoinProbe::new(
            JoinKind::Inner,
            left(vec![solution(&[("x", 1)]), solution(&[("x", 2)])]),
            factory(vec![
                solution(&[("x", 1), ("y", 10)]),
                solution(&[("x", 1), ("y", 11)]),
                solution(&[("x", 3), ("y", 30)]),
            ]),
            context(),
        );

        insta::assert_debug_snapshot!(run(probe), @r#"
        [
            "{?x -> \"1\"^^<http://www.w3.org/2001/XMLSchema#integer>, ?y -> \"10\"^^<http://www.w3.org/2001/XMLSchema#integer>}",
            "{?x -> \"1\"^^<http://www.w3.org/2001/XMLSchema#integer>, ?y -> \"11\"^^<http://www.w3.org/2001/XMLSchema#integer>}",
        ]
        "#);
    }

    #[test]
    fn left_outer_join_keeps_unmatched_solutions() {
        let y = var("y");
        let probe = JoinProbe::new(
            JoinKind::LeftOuter,
            left(vec![solution(&[("x", 1)]), solution(&[("x", 2)])]),
            factory(vec![
                solution(&[("x", 1), ("y", 10)]),
                solution(&[("x", 2), ("y", 20)]),
            ]),
            context(),
        )
        .with_condition(Box::new(move |solution: &Solution| {
            solution.get(&y) != Some(&int(20))
        }));

        let results = probe.collect::<QueryResult<Vec<_>>>().unwrap();
        assert_eq!(
            results,
            vec![solution(&[("x", 1), ("y", 10)]), solution(&[("x", 2)])]
        );
    }

    #[test]
    fn anti_join_requires_shared_variables() {
        let probe = JoinProbe::new(
            JoinKind::Anti,
            left(vec![
                solution(&[("x", 1)]),
                solution(&[("x", 2)]),
                solution(&[("z", 3)]),
            ]),
            factory(vec![solution(&[("x", 1)])]),
            context(),
        );

        let results = probe.collect::<QueryResult<Vec<_>>>().unwrap();
        assert_eq!(results, vec![solution(&[("x", 2)]), solution(&[("z", 3)])]);
    }

    #[test]
    fn rebuilds_worker_when_key_changes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let source_calls = Arc::clone(&calls);
        let source: RightSideSource = Arc::new(
            move |bindings: &Solution, _: &ExecutionContext| -> QueryResult<SolutionIter> {
                source_calls.fetch_add(1, Ordering::SeqCst);
                let mut solution = bindings.clone();
                let _ = solution.insert(var("y"), int(0));
                Ok(Box::new(std::iter::once(Ok(solution))))
            },
        );
        let probe = JoinProbe::new(
            JoinKind::Inner,
            left(vec![
                solution(&[("x", 1)]),
                solution(&[("x", 1)]),
                solution(&[("x", 2)]),
            ]),
            Box::new(ProbeBoundJoinFactory::new(vec![var("x")], source)),
            context(),
        );

        assert_eq!(probe.count(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn stops_after_cancellation() {
        let context = context();
        let mut probe = JoinProbe::new(
            JoinKind::Inner,
            left(vec![solution(&[("x", 1)]), solution(&[("x", 1)])]),
            factory(vec![solution(&[("x", 1)])]),
            context.clone(),
        );

        assert!(matches!(probe.next(), Some(Ok(_))));
        context.cancel();
        assert!(matches!(
            probe.next(),
            Some(Err(QueryEvaluationError::Cancelled))
        ));
        assert!(probe.next().is_none());
    }
}
