use super::AlgebraExecutor;
use quadflow_common::{ExecutionContext, QueryResult, SolutionIter};
use quadflow_functions::{compare_terms, ExpressionEvaluator};
use quadflow_logical::{Algebra, Executor, Expression, Filter, OrderCondition};
use quadflow_model::{Solution, Term, Variable};
use rustc_hash::FxHashSet;
use std::cmp::Ordering;

impl AlgebraExecutor {
    /// Keeps the solutions for which every expression is `true`.
    ///
    /// A solution for which an expression cannot be evaluated is removed, unless
    /// [QueryOptions::strict_filter_errors](crate::QueryOptions::strict_filter_errors) is set.
    pub(super) fn execute_filter(
        &self,
        filter: &Filter,
        context: &ExecutionContext,
    ) -> QueryResult<SolutionIter> {
        let inner = self.execute(filter.inner(), context)?;
        let evaluator = self.evaluator.clone();
        let expressions = filter.expressions().to_vec();
        let strict = self.options.strict_filter_errors;

        Ok(Box::new(inner.filter_map(move |solution| {
            let solution = match solution {
                Ok(solution) => solution,
                Err(error) => return Some(Err(error)),
            };
            for expression in &expressions {
                match evaluator.evaluate_ebv(expression, &solution) {
                    Ok(true) => {}
                    Ok(false) => return None,
                    Err(error) if strict => return Some(Err(error.into())),
                    Err(error) => {
                        tracing::trace!("Removing {solution} from filter: {error}");
                        return None;
                    }
                }
            }
            Some(Ok(solution))
        })))
    }

    /// An already bound variable is kept. If the expression fails, the variable stays unbound.
    pub(super) fn execute_extend(
        &self,
        inner: &Algebra,
        variable: &Variable,
        expression: &Expression,
        context: &ExecutionContext,
    ) -> QueryResult<SolutionIter> {
        let inner = self.execute(inner, context)?;
        let evaluator = self.evaluator.clone();
        let variable = variable.clone();
        let expression = expression.clone();

        Ok(Box::new(inner.map(move |solution| {
            let mut solution = solution?;
            if !solution.contains(&variable) {
                if let Ok(value) = evaluator.evaluate(&expression, &solution) {
                    solution.set(variable.clone(), value);
                }
            }
            Ok(solution)
        })))
    }

    pub(super) fn execute_project(
        &self,
        inner: &Algebra,
        variables: &[Variable],
        context: &ExecutionContext,
    ) -> QueryResult<SolutionIter> {
        let inner = self.execute(inner, context)?;
        let variables = variables.to_vec();
        Ok(Box::new(inner.map(move |solution| {
            solution.map(|solution| solution.project(&variables))
        })))
    }

    pub(super) fn execute_distinct(
        &self,
        inner: &Algebra,
        context: &ExecutionContext,
    ) -> QueryResult<SolutionIter> {
        let inner = self.execute(inner, context)?;
        let mut seen = FxHashSet::default();
        Ok(Box::new(inner.filter(move |solution| match solution {
            Ok(solution) => seen.insert(solution.clone()),
            Err(_) => true,
        })))
    }

    pub(super) fn execute_slice(
        &self,
        inner: &Algebra,
        offset: usize,
        limit: Option<usize>,
        context: &ExecutionContext,
    ) -> QueryResult<SolutionIter> {
        let inner = self.execute(inner, context)?.skip(offset);
        Ok(match limit {
            Some(limit) => Box::new(inner.take(limit)),
            None => Box::new(inner),
        })
    }

    /// Sorts all solutions when the first one is requested. Solutions with equal keys keep their
    /// relative order.
    pub(super) fn execute_order_by(
        &self,
        inner: &Algebra,
        conditions: &[OrderCondition],
        context: &ExecutionContext,
    ) -> QueryResult<SolutionIter> {
        let inner = self.execute(inner, context)?;
        let evaluator = self.evaluator.clone();
        let conditions = conditions.to_vec();
        Ok(materialize_on_first_pull(inner, move |solutions| {
            sort_solutions(solutions, &evaluator, &conditions)
        }))
    }
}

/// Defers `compute` until the first solution is pulled from the returned iterator.
pub(super) fn materialize_on_first_pull(
    inner: SolutionIter,
    compute: impl FnOnce(SolutionIter) -> QueryResult<Vec<Solution>> + 'static,
) -> SolutionIter {
    let mut pending = Some((inner, compute));
    let mut computed = Vec::new().into_iter();
    Box::new(std::iter::from_fn(move || {
        if let Some((inner, compute)) = pending.take() {
            match compute(inner) {
                Ok(solutions) => computed = solutions.into_iter(),
                Err(error) => return Some(Err(error)),
            }
        }
        computed.next().map(Ok)
    }))
}

fn sort_solutions(
    solutions: SolutionIter,
    evaluator: &ExpressionEvaluator,
    conditions: &[OrderCondition],
) -> QueryResult<Vec<Solution>> {
    let mut keyed = Vec::new();
    for solution in solutions {
        let solution = solution?;
        let keys = conditions
            .iter()
            .map(|condition| evaluator.evaluate(condition.expression(), &solution).ok())
            .collect::<Vec<_>>();
        keyed.push((keys, solution));
    }

    keyed.sort_by(|(lhs, _), (rhs, _)| compare_keys(lhs, rhs, conditions));
    tracing::trace!("Sorted {} solutions", keyed.len());
    Ok(keyed.into_iter().map(|(_, solution)| solution).collect())
}

fn compare_keys(
    lhs: &[Option<Term>],
    rhs: &[Option<Term>],
    conditions: &[OrderCondition],
) -> Ordering {
    for ((lhs, rhs), condition) in lhs.iter().zip(rhs).zip(conditions) {
        let ordering = compare_terms(lhs.as_ref(), rhs.as_ref());
        let ordering = match condition {
            OrderCondition::Asc(_) => ordering,
            OrderCondition::Desc(_) => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}
