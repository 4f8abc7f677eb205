use quadflow_common::error::QueryEvaluationError;
use quadflow_common::{ExecutionContext, QueryResult, SolutionIter};
use quadflow_model::Solution;

/// Wraps a [SolutionIter] such that the [ExecutionContext] is checked before every pull.
///
/// Once the context or the inner iterator reports a cancellation or a timeout, the error is
/// returned once and the iterator is exhausted afterward. The inner iterator is not pulled again.
pub struct CancellableIter {
    inner: SolutionIter,
    context: ExecutionContext,
    finished: bool,
}

impl CancellableIter {
    pub fn new(inner: SolutionIter, context: ExecutionContext) -> Self {
        Self {
            inner,
            context,
            finished: false,
        }
    }

    /// Boxes the iterator into a [SolutionIter].
    pub fn boxed(inner: SolutionIter, context: ExecutionContext) -> SolutionIter {
        Box::new(Self::new(inner, context))
    }
}

impl Iterator for CancellableIter {
    type Item = QueryResult<Solution>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if let Err(error) = self.context.check() {
            tracing::warn!("Stopping query evaluation: {error}");
            self.finished = true;
            return Some(Err(error));
        }
        let next = self.inner.next();
        if matches!(
            next,
            None | Some(Err(QueryEvaluationError::Cancelled | QueryEvaluationError::Timeout))
        ) {
            self.finished = true;
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solutions(count: usize) -> SolutionIter {
        Box::new((0..count).map(|_| Ok(Solution::new())))
    }

    #[test]
    fn passes_solutions_through() {
        let iter = CancellableIter::new(solutions(3), ExecutionContext::new());
        assert_eq!(iter.count(), 3);
    }

    #[test]
    fn stops_after_cancellation() {
        let context = ExecutionContext::new();
        let mut iter = CancellableIter::new(solutions(3), context.clone());

        assert!(matches!(iter.next(), Some(Ok(_))));
        context.cancel();
        assert!(matches!(
            iter.next(),
            Some(Err(QueryEvaluationError::Cancelled))
        ));
        assert!(iter.next().is_none());
    }

    #[test]
    fn stops_after_inner_timeout() {
        let inner: SolutionIter = Box::new(
            [
                Ok(Solution::new()),
                Err(QueryEvaluationError::Timeout),
                Ok(Solution::new()),
            ]
            .into_iter(),
        );
        let mut iter = CancellableIter::new(inner, ExecutionContext::new());

        assert!(matches!(iter.next(), Some(Ok(_))));
        assert!(matches!(iter.next(), Some(Err(QueryEvaluationError::Timeout))));
        assert!(iter.next().is_none());
    }
}
