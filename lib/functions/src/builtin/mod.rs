//! Implementations of the built-in operators on already evaluated arguments.

pub mod logical;
pub mod numeric;
pub mod strings;
pub mod terms;

use quadflow_model::{Literal, Term};

pub fn boolean(value: bool) -> Term {
    Literal::from(value).into()
}
