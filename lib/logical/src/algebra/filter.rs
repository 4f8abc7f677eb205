use crate::algebra::{Algebra, Executor};
use crate::expr::Expression;
use quadflow_common::error::UsageError;
use quadflow_common::{ExecutionContext, QueryResult, SolutionIter};
use std::sync::Arc;

/// Restricts the solutions of its inner algebra to those for which every expression has an
/// effective boolean value of `true`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Filter {
    inner: Arc<Algebra>,
    expressions: Vec<Expression>,
}

impl Filter {
    /// Creates a filter over `inner`.
    ///
    /// If `inner` is a filter itself, its expressions are merged with `expressions` and the
    /// result is placed directly over the inner filter's input. The expressions of `inner` come
    /// first.
    pub fn create(
        inner: impl Into<Arc<Algebra>>,
        expressions: impl IntoIterator<Item = Expression>,
    ) -> Result<Self, UsageError> {
        let inner = inner.into();
        match inner.as_ref() {
            Algebra::Filter(filter) => {
                let expressions = filter
                    .expressions
                    .iter()
                    .cloned()
                    .chain(expressions)
                    .collect::<Vec<_>>();
                Self::wrap(Arc::clone(&filter.inner), expressions)
            }
            _ => Self::wrap(inner, expressions),
        }
    }

    /// Creates a filter directly over `inner` without merging nested filters.
    ///
    /// Returns an error if `expressions` is empty.
    pub fn wrap(
        inner: impl Into<Arc<Algebra>>,
        expressions: impl IntoIterator<Item = Expression>,
    ) -> Result<Self, UsageError> {
        let expressions = expressions.into_iter().collect::<Vec<_>>();
        if expressions.is_empty() {
            return Err(UsageError::EmptyFilterExpressions);
        }
        Ok(Self {
            inner: inner.into(),
            expressions,
        })
    }

    pub fn inner(&self) -> &Arc<Algebra> {
        &self.inner
    }

    /// The filter expressions in evaluation order.
    pub fn expressions(&self) -> &[Expression] {
        &self.expressions
    }

    /// Evaluates this filter lazily using `executor`.
    pub fn execute<E: Executor + ?Sized>(
        &self,
        executor: &E,
        context: &ExecutionContext,
    ) -> QueryResult<SolutionIter> {
        executor.execute(&Algebra::Filter(self.clone()), context)
    }
}

impl From<Filter> for Algebra {
    fn from(filter: Filter) -> Self {
        Algebra::Filter(filter)
    }
}
