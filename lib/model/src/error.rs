use oxsdatatypes::ParseDecimalError;
use std::num::{ParseFloatError, ParseIntError, TryFromIntError};
use thiserror::Error;

pub type ThinResult<T> = Result<T, ThinError>;

/// A failed conversion of a term into a typed value, e.g., an ill-typed literal or an arithmetic
/// overflow.
///
/// The expression evaluator maps every such failure to the same evaluation error. Hence, no
/// details are kept.
#[derive(Clone, Copy, Debug, Default, Error, PartialEq, Eq)]
#[error("The value cannot be represented in the requested type")]
pub struct ThinError;

impl ThinError {
    pub fn expected<T>() -> ThinResult<T> {
        Err(ThinError)
    }
}

impl From<ParseIntError> for ThinError {
    fn from(_: ParseIntError) -> Self {
        ThinError
    }
}

impl From<ParseFloatError> for ThinError {
    fn from(_: ParseFloatError) -> Self {
        ThinError
    }
}

impl From<ParseDecimalError> for ThinError {
    fn from(_: ParseDecimalError) -> Self {
        ThinError
    }
}

impl From<TryFromIntError> for ThinError {
    fn from(_: TryFromIntError) -> Self {
        ThinError
    }
}
