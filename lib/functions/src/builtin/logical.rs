use quadflow_common::error::ExpressionError;

/// Logical `||` with SPARQL's error semantics.
///
/// If the left operand fails, the right operand is evaluated. A right operand of `true` masks the
/// error. Otherwise, the left error is raised again. Errors of the right operand count as `false`
/// in this case.
pub fn or(
    lhs: Result<bool, ExpressionError>,
    rhs: impl FnOnce() -> Result<bool, ExpressionError>,
) -> Result<bool, ExpressionError> {
    match lhs {
        Ok(true) => Ok(true),
        Ok(false) => rhs(),
        Err(error) => {
            if rhs().unwrap_or(false) {
                Ok(true)
            } else {
                Err(error.into_evaluation_error())
            }
        }
    }
}

/// Logical `&&` with SPARQL's error semantics.
///
/// Mirrors [or]: an error of the left operand is masked if the right operand is `false`.
pub fn and(
    lhs: Result<bool, ExpressionError>,
    rhs: impl FnOnce() -> Result<bool, ExpressionError>,
) -> Result<bool, ExpressionError> {
    match lhs {
        Ok(false) => Ok(false),
        Ok(true) => rhs(),
        Err(error) => {
            if rhs().is_ok_and(|value| !value) {
                Ok(false)
            } else {
                Err(error.into_evaluation_error())
            }
        }
    }
}
