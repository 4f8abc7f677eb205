use quadflow_common::error::ExpressionError;
use quadflow_model::{Numeric, NumericPair, Term, TypedValue};

pub fn numeric(term: &Term) -> Result<Numeric, ExpressionError> {
    match TypedValue::from_term(term) {
        TypedValue::NumericLiteral(value) => Ok(value),
        _ => Err(ExpressionError::type_error(format!(
            "{term} is not a numeric literal"
        ))),
    }
}

fn to_term(value: Numeric) -> Term {
    value.to_literal().into()
}

fn overflow(operator: &str) -> ExpressionError {
    ExpressionError::type_error(format!("Overflow in numeric operator {operator}"))
}

pub fn plus(value: &Term) -> Result<Term, ExpressionError> {
    numeric(value).map(to_term)
}

pub fn minus(value: &Term) -> Result<Term, ExpressionError> {
    numeric(value)?
        .checked_neg()
        .map(to_term)
        .map_err(|_| overflow("-"))
}

pub fn add(lhs: &Term, rhs: &Term) -> Result<Term, ExpressionError> {
    numeric(lhs)?
        .checked_add(numeric(rhs)?)
        .map(to_term)
        .map_err(|_| overflow("+"))
}

pub fn subtract(lhs: &Term, rhs: &Term) -> Result<Term, ExpressionError> {
    numeric(lhs)?
        .checked_sub(numeric(rhs)?)
        .map(to_term)
        .map_err(|_| overflow("-"))
}

pub fn multiply(lhs: &Term, rhs: &Term) -> Result<Term, ExpressionError> {
    numeric(lhs)?
        .checked_mul(numeric(rhs)?)
        .map(to_term)
        .map_err(|_| overflow("*"))
}

/// Integer and decimal division by zero is an error. Float and double division follow IEEE 754.
pub fn divide(lhs: &Term, rhs: &Term) -> Result<Term, ExpressionError> {
    let lhs = numeric(lhs)?;
    let rhs = numeric(rhs)?;
    let exact = matches!(
        NumericPair::with_casts_from(lhs, rhs),
        NumericPair::Integer(..) | NumericPair::Decimal(..)
    );
    if exact && rhs.is_zero_or_nan() {
        return Err(ExpressionError::DivisionByZero);
    }
    lhs.checked_div(rhs).map(to_term).map_err(|_| overflow("/"))
}
