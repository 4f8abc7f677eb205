//! Accumulators for the SPARQL aggregate functions.

mod accumulators;

pub use accumulators::*;

use crate::ExpressionEvaluator;
use quadflow_logical::expr::{AggregateExpression, AggregateFunction};
use quadflow_logical::Expression;
use quadflow_model::{Solution, Term};
use rustc_hash::FxHashSet;

/// Accumulates the values of an aggregate for a single group.
pub trait Accumulator: std::fmt::Debug {
    /// Adds the value of the aggregated expression for one solution. `None` represents an
    /// unbound value or an evaluation error.
    fn update(&mut self, value: Option<&Term>);

    /// Returns the aggregated value. `None` if the aggregate is undefined for the group.
    fn finish(&self) -> Option<Term>;
}

/// Creates an accumulator for `function`. `count_all` selects `COUNT(*)` semantics.
pub fn create_accumulator(function: &AggregateFunction, count_all: bool) -> Box<dyn Accumulator> {
    match function {
        AggregateFunction::Count => Box::new(CountAccumulator::new(count_all)),
        AggregateFunction::Sum => Box::new(SumAccumulator::default()),
        AggregateFunction::Avg => Box::new(AvgAccumulator::default()),
        AggregateFunction::Min => Box::new(MinMaxAccumulator::min()),
        AggregateFunction::Max => Box::new(MinMaxAccumulator::max()),
        AggregateFunction::Sample => Box::new(SampleAccumulator::default()),
        AggregateFunction::GroupConcat { separator } => {
            Box::new(GroupConcatAccumulator::new(separator.clone()))
        }
    }
}

/// Evaluates an [AggregateExpression] over the solutions of one group.
#[derive(Debug)]
pub struct AggregateEvaluator {
    argument: Option<Expression>,
    distinct: bool,
    seen_values: FxHashSet<Term>,
    seen_solutions: FxHashSet<Solution>,
    accumulator: Box<dyn Accumulator>,
}

impl AggregateEvaluator {
    pub fn new(aggregate: &AggregateExpression) -> Self {
        Self {
            argument: aggregate.argument().cloned(),
            distinct: aggregate.distinct,
            seen_values: FxHashSet::default(),
            seen_solutions: FxHashSet::default(),
            accumulator: create_accumulator(&aggregate.function, aggregate.argument.is_none()),
        }
    }

    /// Adds a solution of the group.
    pub fn update(&mut self, evaluator: &ExpressionEvaluator, solution: &Solution) {
        let Some(argument) = &self.argument else {
            if !self.distinct || self.seen_solutions.insert(solution.clone()) {
                self.accumulator.update(None);
            }
            return;
        };

        let value = evaluator.evaluate(argument, solution).ok();
        if let (true, Some(value)) = (self.distinct, &value) {
            if !self.seen_values.insert(value.clone()) {
                return;
            }
        }
        self.accumulator.update(value.as_ref());
    }

    pub fn finish(&self) -> Option<Term> {
        self.accumulator.finish()
    }
}
