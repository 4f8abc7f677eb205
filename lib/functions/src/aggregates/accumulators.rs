use crate::aggregates::Accumulator;
use crate::compare_terms;
use quadflow_model::{Literal, Numeric, Term, TypedValue};
use std::cmp::Ordering;

/// `COUNT`. Counts bound values or, for `COUNT(*)`, every solution.
#[derive(Debug)]
pub struct CountAccumulator {
    count: i64,
    count_all: bool,
}

impl CountAccumulator {
    pub fn new(count_all: bool) -> Self {
        Self {
            count: 0,
            count_all,
        }
    }
}

impl Accumulator for CountAccumulator {
    fn update(&mut self, value: Option<&Term>) {
        if self.count_all || value.is_some() {
            self.count += 1;
        }
    }

    fn finish(&self) -> Option<Term> {
        Some(Literal::from(self.count).into())
    }
}

fn numeric(value: Option<&Term>) -> Option<Numeric> {
    match TypedValue::from_term(value?) {
        TypedValue::NumericLiteral(value) => Some(value),
        _ => None,
    }
}

/// `SUM`. A single non-numeric value makes the sum undefined.
#[derive(Debug)]
pub struct SumAccumulator {
    sum: Option<Numeric>,
}

impl Default for SumAccumulator {
    fn default() -> Self {
        Self {
            sum: Some(Numeric::from(0)),
        }
    }
}

impl Accumulator for SumAccumulator {
    fn update(&mut self, value: Option<&Term>) {
        self.sum = match (self.sum, numeric(value)) {
            (Some(sum), Some(value)) => sum.checked_add(value).ok(),
            _ => None,
        };
    }

    fn finish(&self) -> Option<Term> {
        self.sum.map(|sum| sum.to_literal().into())
    }
}

/// `AVG`. The average of an empty group is `0`.
#[derive(Debug, Default)]
pub struct AvgAccumulator {
    sum: SumAccumulator,
    count: i64,
}

impl Accumulator for AvgAccumulator {
    fn update(&mut self, value: Option<&Term>) {
        self.sum.update(value);
        self.count += 1;
    }

    fn finish(&self) -> Option<Term> {
        let sum = self.sum.sum?;
        if self.count == 0 {
            return Some(Literal::from(0_i64).into());
        }
        sum.checked_div(Numeric::from(self.count))
            .ok()
            .map(|avg| avg.to_literal().into())
    }
}

/// `MIN` and `MAX` using the ordering of `ORDER BY`. Unbound values are ignored.
#[derive(Debug)]
pub struct MinMaxAccumulator {
    keep: Ordering,
    value: Option<Term>,
}

impl MinMaxAccumulator {
    pub fn min() -> Self {
        Self {
            keep: Ordering::Less,
            value: None,
        }
    }

    pub fn max() -> Self {
        Self {
            keep: Ordering::Greater,
            value: None,
        }
    }
}

impl Accumulator for MinMaxAccumulator {
    fn update(&mut self, value: Option<&Term>) {
        let Some(value) = value else {
            return;
        };
        let replace = match &self.value {
            None => true,
            Some(current) => compare_terms(Some(value), Some(current)) == self.keep,
        };
        if replace {
            self.value = Some(value.clone());
        }
    }

    fn finish(&self) -> Option<Term> {
        self.value.clone()
    }
}

/// `SAMPLE`. Returns the first bound value.
#[derive(Debug, Default)]
pub struct SampleAccumulator {
    value: Option<Term>,
}

impl Accumulator for SampleAccumulator {
    fn update(&mut self, value: Option<&Term>) {
        if self.value.is_none() {
            self.value = value.cloned();
        }
    }

    fn finish(&self) -> Option<Term> {
        self.value.clone()
    }
}

/// `GROUP_CONCAT`. Non-string values make the result undefined. The language is kept if all
/// values share it.
#[derive(Debug)]
pub struct GroupConcatAccumulator {
    separator: String,
    values: Option<Vec<(String, Option<String>)>>,
}

impl GroupConcatAccumulator {
    pub fn new(separator: String) -> Self {
        Self {
            separator,
            values: Some(Vec::new()),
        }
    }
}

impl Accumulator for GroupConcatAccumulator {
    fn update(&mut self, value: Option<&Term>) {
        let Some(values) = &mut self.values else {
            return;
        };
        let string = value.map(TypedValue::from_term).and_then(|value| match value {
            TypedValue::SimpleLiteral(value) => Some((value, None)),
            TypedValue::LanguageStringLiteral { value, language } => Some((value, Some(language))),
            _ => None,
        });
        match string {
            Some(string) => values.push(string),
            None => self.values = None,
        }
    }

    fn finish(&self) -> Option<Term> {
        let values = self.values.as_ref()?;
        let value = values
            .iter()
            .map(|(value, _)| value.as_str())
            .collect::<Vec<_>>()
            .join(&self.separator);
        let language = match values.split_first() {
            Some(((_, Some(language)), rest))
                if rest.iter().all(|(_, other)| other.as_ref() == Some(language)) =>
            {
                Some(language)
            }
            _ => None,
        };
        Some(match language {
            Some(language) => {
                Literal::new_language_tagged_literal_unchecked(value, language.as_str()).into()
            }
            None => Literal::new_simple_literal(value).into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregates::create_accumulator;
    use quadflow_logical::expr::AggregateFunction;
    use quadflow_model::vocab::xsd;

    fn integer(value: i64) -> Term {
        Literal::from(value).into()
    }

    fn aggregate(function: AggregateFunction, values: &[Option<Term>]) -> Option<Term> {
        let mut accumulator = create_accumulator(&function, false);
        for value in values {
            accumulator.update(value.as_ref());
        }
        accumulator.finish()
    }

    #[test]
    fn count_skips_unbound() {
        let values = [Some(integer(1)), None, Some(integer(3))];
        assert_eq!(aggregate(AggregateFunction::Count, &values), Some(integer(2)));

        let mut count_all = CountAccumulator::new(true);
        count_all.update(None);
        assert_eq!(count_all.finish(), Some(integer(1)));
    }

    #[test]
    fn sum_and_avg() {
        let values = [Some(integer(1)), Some(integer(2))];
        assert_eq!(aggregate(AggregateFunction::Sum, &values), Some(integer(3)));
        assert_eq!(
            aggregate(AggregateFunction::Avg, &values),
            Some(Literal::new_typed_literal("1.5", xsd::DECIMAL).into())
        );
        assert_eq!(aggregate(AggregateFunction::Avg, &[]), Some(integer(0)));

        let values = [Some(integer(1)), Some(Literal::new_simple_literal("a").into())];
        assert_eq!(aggregate(AggregateFunction::Sum, &values), None);
    }

    #[test]
    fn min_and_max() {
        let values = [Some(integer(3)), None, Some(integer(1)), Some(integer(2))];
        assert_eq!(aggregate(AggregateFunction::Min, &values), Some(integer(1)));
        assert_eq!(aggregate(AggregateFunction::Max, &values), Some(integer(3)));
    }

    #[test]
    fn group_concat() {
        let values = [
            Some(Literal::new_simple_literal("a").into()),
            Some(Literal::new_simple_literal("b").into()),
        ];
        assert_eq!(
            aggregate(
                AggregateFunction::GroupConcat {
                    separator: ", ".to_owned()
                },
                &values
            ),
            Some(Literal::new_simple_literal("a, b").into())
        );
    }
}
