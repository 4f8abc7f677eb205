use crate::join::{JoinWorker, WrapperJoinWorker};
use quadflow_common::{ExecutionContext, QueryResult, SolutionIter};
use quadflow_model::{JoinKey, Solution, Variable};
use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

/// Memoizes the results of the inner worker per join key.
///
/// The results of a probe only depend on the values of the join variables. Hence, probes with
/// the same join key are answered from the cache. At most `capacity` keys are cached. Once the
/// cache is full, the oldest entry is evicted. A capacity of zero disables caching.
#[derive(Debug)]
pub struct CachingJoinWorker {
    wrapper: WrapperJoinWorker,
    variables: Arc<[Variable]>,
    capacity: usize,
    cache: Mutex<JoinCache>,
}

#[derive(Debug, Default)]
struct JoinCache {
    entries: FxHashMap<JoinKey, Arc<[Solution]>>,
    insertion_order: VecDeque<JoinKey>,
}

impl JoinCache {
    fn insert(&mut self, key: JoinKey, solutions: Arc<[Solution]>, capacity: usize) {
        while self.entries.len() >= capacity {
            let Some(oldest) = self.insertion_order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
        }
        if self.entries.insert(key.clone(), solutions).is_none() {
            self.insertion_order.push_back(key);
        }
    }
}

impl CachingJoinWorker {
    pub fn new(
        inner: impl JoinWorker + 'static,
        variables: impl Into<Arc<[Variable]>>,
        capacity: usize,
    ) -> Self {
        Self {
            wrapper: WrapperJoinWorker::new(inner),
            variables: variables.into(),
            capacity,
            cache: Mutex::new(JoinCache::default()),
        }
    }

    /// Returns the number of cached join keys.
    pub fn cached_keys(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    fn materialize(
        &self,
        lhs: &Solution,
        context: &ExecutionContext,
    ) -> QueryResult<Arc<[Solution]>> {
        let mut solutions = Vec::new();
        for solution in self.wrapper.find(lhs, context)? {
            context.check()?;
            solutions.push(solution?);
        }
        Ok(solutions.into())
    }
}

impl JoinWorker for CachingJoinWorker {
    fn find(&self, lhs: &Solution, context: &ExecutionContext) -> QueryResult<SolutionIter> {
        if self.capacity == 0 {
            return self.wrapper.find(lhs, context);
        }

        let key = lhs.join_key(&self.variables);
        let cached = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .get(&key)
            .cloned();
        let solutions = match cached {
            Some(solutions) => {
                tracing::trace!("Join cache hit for {key:?}");
                solutions
            }
            None => {
                let solutions = self.materialize(lhs, context)?;
                self.cache
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(key, Arc::clone(&solutions), self.capacity);
                solutions
            }
        };

        Ok(Box::new(
            (0..solutions.len()).map(move |i| Ok(solutions[i].clone())),
        ))
    }

    fn can_reuse(&self, solution: &Solution, context: &ExecutionContext) -> bool {
        self.wrapper.can_reuse(solution, context)
    }
}
