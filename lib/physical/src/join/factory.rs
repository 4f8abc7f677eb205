use crate::join::{
    CachingJoinWorker, DistinctJoinWorker, HashJoinWorker, JoinWorker, JoinWorkerRef,
    LoopJoinWorker, ProbeBoundJoinWorker,
};
use quadflow_common::{ExecutionContext, QueryResult, SolutionIter};
use quadflow_model::{Solution, Variable};
use std::cell::RefCell;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// The algorithm used for joining a materialized right join input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum JoinAlgorithm {
    /// See [LoopJoinWorker].
    Loop,
    /// See [HashJoinWorker].
    #[default]
    Hash,
}

/// The decorators that are stacked on top of a freshly created [JoinWorker].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct JoinDecorators {
    /// The number of join keys cached by a [CachingJoinWorker]. Zero disables the cache.
    pub cache_capacity: usize,
    /// Whether a [DistinctJoinWorker] removes duplicate right solutions.
    pub distinct: bool,
}

impl JoinDecorators {
    pub fn apply(
        self,
        worker: impl JoinWorker + 'static,
        variables: &Arc<[Variable]>,
    ) -> JoinWorkerRef {
        let mut worker: JoinWorkerRef = Box::new(worker);
        if self.distinct {
            worker = Box::new(DistinctJoinWorker::new(worker));
        }
        if self.cache_capacity > 0 {
            worker = Box::new(CachingJoinWorker::new(
                worker,
                Arc::clone(variables),
                self.cache_capacity,
            ));
        }
        worker
    }
}

/// Creates the [JoinWorker] that answers a probe.
///
/// A [JoinProbe](crate::join::JoinProbe) asks the factory for a new worker whenever the current
/// worker cannot be reused for the next left solution.
pub trait JoinWorkerFactory: Debug {
    fn create(&self, lhs: &Solution, context: &ExecutionContext) -> QueryResult<JoinWorkerRef>;
}

enum RightInput {
    /// Not evaluated yet.
    Pending(SolutionIter),
    Ready(Arc<[Solution]>),
}

/// Creates workers over a right join input that is held in memory.
///
/// The created workers are always reusable. Therefore, a probe creates at most one worker. A
/// factory created with [MaterializedJoinFactory::deferred] evaluates the right input once the
/// first worker is created.
pub struct MaterializedJoinFactory {
    variables: Arc<[Variable]>,
    right: RefCell<RightInput>,
    algorithm: JoinAlgorithm,
    decorators: JoinDecorators,
}

impl MaterializedJoinFactory {
    pub fn new(
        variables: impl Into<Arc<[Variable]>>,
        right: impl Into<Arc<[Solution]>>,
        algorithm: JoinAlgorithm,
    ) -> Self {
        Self::with_right_input(variables.into(), RightInput::Ready(right.into()), algorithm)
    }

    /// Creates a factory that collects `right` when the first worker is created.
    pub fn deferred(
        variables: impl Into<Arc<[Variable]>>,
        right: SolutionIter,
        algorithm: JoinAlgorithm,
    ) -> Self {
        Self::with_right_input(variables.into(), RightInput::Pending(right), algorithm)
    }

    fn with_right_input(
        variables: Arc<[Variable]>,
        right: RightInput,
        algorithm: JoinAlgorithm,
    ) -> Self {
        Self {
            variables,
            right: RefCell::new(right),
            algorithm,
            decorators: JoinDecorators::default(),
        }
    }

    #[must_use]
    pub fn with_decorators(mut self, decorators: JoinDecorators) -> Self {
        self.decorators = decorators;
        self
    }

    fn right(&self, context: &ExecutionContext) -> QueryResult<Arc<[Solution]>> {
        let mut right = self.right.borrow_mut();
        let solutions: Arc<[Solution]> = match &mut *right {
            RightInput::Ready(solutions) => return Ok(Arc::clone(solutions)),
            RightInput::Pending(pending) => {
                let mut solutions = Vec::new();
                for solution in pending {
                    context.check()?;
                    solutions.push(solution?);
                }
                solutions.into()
            }
        };
        tracing::trace!("Materialized {} right join solutions", solutions.len());
        *right = RightInput::Ready(Arc::clone(&solutions));
        Ok(solutions)
    }
}

impl Debug for MaterializedJoinFactory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaterializedJoinFactory")
            .field("variables", &self.variables)
            .field("algorithm", &self.algorithm)
            .field("decorators", &self.decorators)
            .finish_non_exhaustive()
    }
}

impl JoinWorkerFactory for MaterializedJoinFactory {
    fn create(&self, _lhs: &Solution, context: &ExecutionContext) -> QueryResult<JoinWorkerRef> {
        let variables = Arc::clone(&self.variables);
        let right = self.right(context)?;
        Ok(match self.algorithm {
            JoinAlgorithm::Loop => self
                .decorators
                .apply(LoopJoinWorker::new(variables, right), &self.variables),
            JoinAlgorithm::Hash => self
                .decorators
                .apply(HashJoinWorker::new(variables, right), &self.variables),
        })
    }
}

/// Evaluates the right join input for the bindings of the join variables of a probe.
pub type RightSideSource =
    Arc<dyn Fn(&Solution, &ExecutionContext) -> QueryResult<SolutionIter> + Send + Sync>;

/// Creates a [ProbeBoundJoinWorker] for every distinct join key of the left input.
///
/// The right input is evaluated with the join variables of the probe already bound, which allows
/// the right input to use these bindings for index lookups. Consecutive probes with the same join
/// key share a worker.
pub struct ProbeBoundJoinFactory {
    variables: Arc<[Variable]>,
    source: RightSideSource,
    distinct: bool,
}

impl ProbeBoundJoinFactory {
    pub fn new(variables: impl Into<Arc<[Variable]>>, source: RightSideSource) -> Self {
        Self {
            variables: variables.into(),
            source,
            distinct: false,
        }
    }

    /// Removes duplicate right solutions. A cache would never be hit as every worker only answers
    /// a single join key.
    #[must_use]
    pub fn with_distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }
}

impl Debug for ProbeBoundJoinFactory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbeBoundJoinFactory")
            .field("variables", &self.variables)
            .field("distinct", &self.distinct)
            .finish_non_exhaustive()
    }
}

impl JoinWorkerFactory for ProbeBoundJoinFactory {
    fn create(&self, lhs: &Solution, context: &ExecutionContext) -> QueryResult<JoinWorkerRef> {
        let bindings = lhs.project(&self.variables);
        let mut right = Vec::new();
        for solution in (self.source)(&bindings, context)? {
            context.check()?;
            right.push(solution?);
        }

        let worker = ProbeBoundJoinWorker::new(
            Arc::clone(&self.variables),
            lhs.join_key(&self.variables),
            right,
        );
        let decorators = JoinDecorators {
            cache_capacity: 0,
            distinct: self.distinct,
        };
        Ok(decorators.apply(worker, &self.variables))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::join::test_utils::{collect, context, solution, var};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn materialized_algorithms_agree() {
        let right = vec![
            solution(&[("x", 1), ("y", 1)]),
            solution(&[("y", 2)]),
            solution(&[("x", 2), ("y", 3)]),
            solution(&[("x", 1), ("y", 1)]),
        ];
        let decorators = JoinDecorators {
            cache_capacity: 2,
            distinct: true,
        };
        let probe = solution(&[("x", 1)]);

        let results = [JoinAlgorithm::Loop, JoinAlgorithm::Hash].map(|algorithm| {
            let factory = MaterializedJoinFactory::new(vec![var("x")], right.clone(), algorithm)
                .with_decorators(decorators);
            let worker = factory.create(&probe, &context()).unwrap();
            collect(worker.find(&probe, &context()))
        });

        assert_eq!(results[0], results[1]);
        assert_eq!(
            results[0],
            vec![solution(&[("x", 1), ("y", 1)]), solution(&[("y", 2)])]
        );
    }

    #[test]
    fn deferred_right_input_is_collected_once() {
        let pulls = Arc::new(AtomicUsize::new(0));
        let counted_pulls = Arc::clone(&pulls);
        let right: SolutionIter = Box::new((1..=3).map(move |i| {
            counted_pulls.fetch_add(1, Ordering::SeqCst);
            Ok(solution(&[("x", i)]))
        }));
        let factory = MaterializedJoinFactory::deferred(vec![var("x")], right, JoinAlgorithm::Loop);
        assert_eq!(pulls.load(Ordering::SeqCst), 0);

        for probe in [solution(&[("x", 1)]), solution(&[("x", 3)])] {
            let worker = factory.create(&probe, &context()).unwrap();
            assert_eq!(collect(worker.find(&probe, &context())), vec![probe]);
        }
        assert_eq!(pulls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn probe_bound_source_receives_join_bindings() {
        let calls = Arc::new(AtomicUsize::new(0));
        let source_calls = Arc::clone(&calls);
        let source: RightSideSource = Arc::new(
            move |bindings: &Solution, _: &ExecutionContext| -> QueryResult<SolutionIter> {
                source_calls.fetch_add(1, Ordering::SeqCst);
                assert_eq!(bindings, &solution(&[("x", 1)]));
                Ok(Box::new(std::iter::once(Ok(solution(&[("x", 1), ("y", 5)])))))
            },
        );
        let factory = ProbeBoundJoinFactory::new(vec![var("x")], source);

        let probe = solution(&[("x", 1), ("z", 9)]);
        let worker = factory.create(&probe, &context()).unwrap();

        assert_eq!(
            collect(worker.find(&probe, &context())),
            vec![solution(&[("x", 1), ("y", 5)])]
        );
        assert!(worker.can_reuse(&solution(&[("x", 1)]), &context()));
        assert!(!worker.can_reuse(&solution(&[("x", 2)]), &context()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
