use crate::expr::Expression;
use std::fmt::{Display, Formatter};

/// The function of an [AggregateExpression].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AggregateFunction {
    Count,
    Sum,
    Avg,
    Min,
    Max,
    Sample,
    GroupConcat { separator: String },
}

impl AggregateFunction {
    pub fn name(&self) -> &'static str {
        match self {
            AggregateFunction::Count => "COUNT",
            AggregateFunction::Sum => "SUM",
            AggregateFunction::Avg => "AVG",
            AggregateFunction::Min => "MIN",
            AggregateFunction::Max => "MAX",
            AggregateFunction::Sample => "SAMPLE",
            AggregateFunction::GroupConcat { .. } => "GROUP_CONCAT",
        }
    }
}

/// An aggregate that is evaluated over a group of solutions.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AggregateExpression {
    pub function: AggregateFunction,
    /// The aggregated expression. `None` represents `*` and is only valid for `COUNT`.
    pub argument: Option<Box<Expression>>,
    /// Whether duplicate values are removed before aggregating.
    pub distinct: bool,
}

impl AggregateExpression {
    pub fn new(function: AggregateFunction, argument: Expression, distinct: bool) -> Self {
        Self {
            function,
            argument: Some(Box::new(argument)),
            distinct,
        }
    }

    /// Creates `COUNT(*)`.
    pub fn count_all(distinct: bool) -> Self {
        Self {
            function: AggregateFunction::Count,
            argument: None,
            distinct,
        }
    }

    pub fn argument(&self) -> Option<&Expression> {
        self.argument.as_deref()
    }
}

impl Display for AggregateExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}(", self.function.name())?;
        if self.distinct {
            f.write_str("DISTINCT ")?;
        }
        match &self.argument {
            None => f.write_str("*")?,
            Some(argument) => write!(f, "{argument}")?,
        }
        if let AggregateFunction::GroupConcat { separator } = &self.function {
            write!(f, "; SEPARATOR={separator:?}")?;
        }
        f.write_str(")")
    }
}
