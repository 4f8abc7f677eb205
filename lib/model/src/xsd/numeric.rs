use crate::xsd::is_integer_datatype;
use crate::{ThinError, ThinResult};
use oxrdf::vocab::xsd;
use oxrdf::{Literal, LiteralRef};
use oxsdatatypes::{Decimal, Double, Float, Integer};
use std::cmp::Ordering;
use std::str::FromStr;

/// A value of one of the numeric XSD types that take part in SPARQL's numeric type promotion.
#[derive(Copy, Clone, Debug)]
pub enum Numeric {
    Integer(Integer),
    Decimal(Decimal),
    Float(Float),
    Double(Double),
}

impl Numeric {
    /// Parses the lexical form of `literal` if its datatype is numeric.
    pub fn from_literal(literal: LiteralRef<'_>) -> ThinResult<Self> {
        let datatype = literal.datatype();
        let value = literal.value().trim();
        if is_integer_datatype(datatype) {
            Ok(Numeric::Integer(Integer::from(i64::from_str(value)?)))
        } else if datatype == xsd::DECIMAL {
            Ok(Numeric::Decimal(Decimal::from_str(value)?))
        } else if datatype == xsd::FLOAT {
            Ok(Numeric::Float(Float::from(parse_xsd_float::<f32>(value)?)))
        } else if datatype == xsd::DOUBLE {
            Ok(Numeric::Double(Double::from(parse_xsd_float::<f64>(value)?)))
        } else {
            ThinError::expected()
        }
    }

    /// Returns the canonical literal of this value.
    pub fn to_literal(self) -> Literal {
        match self {
            Numeric::Integer(value) => Literal::new_typed_literal(value.to_string(), xsd::INTEGER),
            Numeric::Decimal(value) => Literal::new_typed_literal(value.to_string(), xsd::DECIMAL),
            Numeric::Float(value) => Literal::new_typed_literal(value.to_string(), xsd::FLOAT),
            Numeric::Double(value) => Literal::new_typed_literal(value.to_string(), xsd::DOUBLE),
        }
    }

    /// Returns whether the value is zero or NaN. This is the negation of its effective boolean
    /// value.
    pub fn is_zero_or_nan(self) -> bool {
        match self {
            Numeric::Integer(value) => i64::from(value) == 0,
            Numeric::Decimal(value) => value == Decimal::from(0_i64),
            Numeric::Float(value) => {
                let value = f32::from(value);
                value == 0.0 || value.is_nan()
            }
            Numeric::Double(value) => {
                let value = f64::from(value);
                value == 0.0 || value.is_nan()
            }
        }
    }

    /// Converts the value to an `f64`. Large integers and decimals may lose precision.
    pub fn to_f64(self) -> f64 {
        f64::from(to_double(self))
    }

    /// [op:numeric-add](https://www.w3.org/TR/xpath-functions-31/#func-numeric-add)
    pub fn checked_add(self, rhs: Self) -> ThinResult<Self> {
        match NumericPair::with_casts_from(self, rhs) {
            NumericPair::Integer(lhs, rhs) => lhs.checked_add(rhs).map(Numeric::Integer),
            NumericPair::Decimal(lhs, rhs) => lhs.checked_add(rhs).map(Numeric::Decimal),
            NumericPair::Float(lhs, rhs) => Some(Numeric::Float(Float::from(
                f32::from(lhs) + f32::from(rhs),
            ))),
            NumericPair::Double(lhs, rhs) => Some(Numeric::Double(Double::from(
                f64::from(lhs) + f64::from(rhs),
            ))),
        }
        .ok_or(ThinError)
    }

    /// [op:numeric-subtract](https://www.w3.org/TR/xpath-functions-31/#func-numeric-subtract)
    pub fn checked_sub(self, rhs: Self) -> ThinResult<Self> {
        match NumericPair::with_casts_from(self, rhs) {
            NumericPair::Integer(lhs, rhs) => lhs.checked_sub(rhs).map(Numeric::Integer),
            NumericPair::Decimal(lhs, rhs) => lhs.checked_sub(rhs).map(Numeric::Decimal),
            NumericPair::Float(lhs, rhs) => Some(Numeric::Float(Float::from(
                f32::from(lhs) - f32::from(rhs),
            ))),
            NumericPair::Double(lhs, rhs) => Some(Numeric::Double(Double::from(
                f64::from(lhs) - f64::from(rhs),
            ))),
        }
        .ok_or(ThinError)
    }

    /// [op:numeric-multiply](https://www.w3.org/TR/xpath-functions-31/#func-numeric-multiply)
    pub fn checked_mul(self, rhs: Self) -> ThinResult<Self> {
        match NumericPair::with_casts_from(self, rhs) {
            NumericPair::Integer(lhs, rhs) => lhs.checked_mul(rhs).map(Numeric::Integer),
            NumericPair::Decimal(lhs, rhs) => lhs.checked_mul(rhs).map(Numeric::Decimal),
            NumericPair::Float(lhs, rhs) => Some(Numeric::Float(Float::from(
                f32::from(lhs) * f32::from(rhs),
            ))),
            NumericPair::Double(lhs, rhs) => Some(Numeric::Double(Double::from(
                f64::from(lhs) * f64::from(rhs),
            ))),
        }
        .ok_or(ThinError)
    }

    /// [op:numeric-divide](https://www.w3.org/TR/xpath-functions-31/#func-numeric-divide)
    ///
    /// Dividing two integers yields a decimal. Returns `Err` on a division of an integer or decimal
    /// by zero.
    pub fn checked_div(self, rhs: Self) -> ThinResult<Self> {
        match NumericPair::with_casts_from(self, rhs) {
            NumericPair::Integer(lhs, rhs) => Decimal::from(lhs)
                .checked_div(Decimal::from(rhs))
                .map(Numeric::Decimal),
            NumericPair::Decimal(lhs, rhs) => lhs.checked_div(rhs).map(Numeric::Decimal),
            NumericPair::Float(lhs, rhs) => Some(Numeric::Float(Float::from(
                f32::from(lhs) / f32::from(rhs),
            ))),
            NumericPair::Double(lhs, rhs) => Some(Numeric::Double(Double::from(
                f64::from(lhs) / f64::from(rhs),
            ))),
        }
        .ok_or(ThinError)
    }

    /// [op:numeric-unary-minus](https://www.w3.org/TR/xpath-functions-31/#func-numeric-unary-minus)
    pub fn checked_neg(self) -> ThinResult<Self> {
        match self {
            Numeric::Integer(value) => value.checked_neg().map(Numeric::Integer),
            Numeric::Decimal(value) => value.checked_neg().map(Numeric::Decimal),
            Numeric::Float(value) => Some(Numeric::Float(Float::from(-f32::from(value)))),
            Numeric::Double(value) => Some(Numeric::Double(Double::from(-f64::from(value)))),
        }
        .ok_or(ThinError)
    }
}

impl PartialEq for Numeric {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Numeric {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match NumericPair::with_casts_from(*self, *other) {
            NumericPair::Integer(lhs, rhs) => Some(lhs.cmp(&rhs)),
            NumericPair::Decimal(lhs, rhs) => Some(lhs.cmp(&rhs)),
            NumericPair::Float(lhs, rhs) => f32::from(lhs).partial_cmp(&f32::from(rhs)),
            NumericPair::Double(lhs, rhs) => f64::from(lhs).partial_cmp(&f64::from(rhs)),
        }
    }
}

impl From<i64> for Numeric {
    fn from(value: i64) -> Self {
        Numeric::Integer(Integer::from(value))
    }
}

/// Two numeric values promoted to their common type.
pub enum NumericPair {
    Integer(Integer, Integer),
    Decimal(Decimal, Decimal),
    Float(Float, Float),
    Double(Double, Double),
}

impl NumericPair {
    /// Promotes `lhs` and `rhs` following the XPath numeric type promotion rules.
    pub fn with_casts_from(lhs: Numeric, rhs: Numeric) -> NumericPair {
        match (lhs, rhs) {
            (Numeric::Integer(lhs), Numeric::Integer(rhs)) => NumericPair::Integer(lhs, rhs),
            (Numeric::Integer(lhs), Numeric::Decimal(rhs)) => {
                NumericPair::Decimal(Decimal::from(lhs), rhs)
            }
            (Numeric::Decimal(lhs), Numeric::Integer(rhs)) => {
                NumericPair::Decimal(lhs, Decimal::from(rhs))
            }
            (Numeric::Decimal(lhs), Numeric::Decimal(rhs)) => NumericPair::Decimal(lhs, rhs),

            (Numeric::Double(lhs), rhs) => NumericPair::Double(lhs, to_double(rhs)),
            (lhs, Numeric::Double(rhs)) => NumericPair::Double(to_double(lhs), rhs),

            (Numeric::Float(lhs), rhs) => NumericPair::Float(lhs, to_float(rhs)),
            (lhs, Numeric::Float(rhs)) => NumericPair::Float(to_float(lhs), rhs),
        }
    }
}

#[allow(clippy::cast_precision_loss, reason = "XPath promotion is lossy by definition")]
fn to_double(value: Numeric) -> Double {
    match value {
        Numeric::Integer(value) => Double::from(i64::from(value) as f64),
        Numeric::Decimal(value) => Double::from(value),
        Numeric::Float(value) => Double::from(f64::from(f32::from(value))),
        Numeric::Double(value) => value,
    }
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    reason = "XPath promotion is lossy by definition"
)]
fn to_float(value: Numeric) -> Float {
    match value {
        Numeric::Integer(value) => Float::from(i64::from(value) as f32),
        Numeric::Decimal(value) => Float::from(f64::from(Double::from(value)) as f32),
        Numeric::Float(value) => value,
        Numeric::Double(value) => Float::from(f64::from(value) as f32),
    }
}

/// Parses the lexical space of `xsd:float` and `xsd:double`, which spells the special values
/// differently than Rust.
fn parse_xsd_float<T: FromStr>(value: &str) -> ThinResult<T> {
    let value = match value {
        "INF" | "+INF" => "inf",
        "-INF" => "-inf",
        "NaN" => "NaN",
        "inf" | "+inf" | "-inf" | "infinity" | "+infinity" | "-infinity" | "nan" => {
            return ThinError::expected()
        }
        value => value,
    };
    T::from_str(value).map_err(|_| ThinError)
}
