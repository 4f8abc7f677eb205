use crate::builtin::boolean;
use quadflow_common::error::ExpressionError;
use quadflow_model::{Literal, Term, TypedValue};

pub fn is_iri(value: &Term) -> Term {
    boolean(matches!(value, Term::NamedNode(_)))
}

pub fn is_blank(value: &Term) -> Term {
    boolean(matches!(value, Term::BlankNode(_)))
}

pub fn is_literal(value: &Term) -> Term {
    boolean(matches!(value, Term::Literal(_)))
}

pub fn is_numeric(value: &Term) -> Term {
    boolean(matches!(
        TypedValue::from_term(value),
        TypedValue::NumericLiteral(_)
    ))
}

pub fn str(value: &Term) -> Result<Term, ExpressionError> {
    match value {
        Term::NamedNode(node) => Ok(Literal::new_simple_literal(node.as_str()).into()),
        Term::Literal(literal) => Ok(Literal::new_simple_literal(literal.value()).into()),
        _ => Err(ExpressionError::type_error(format!(
            "STR is not defined for {value}"
        ))),
    }
}

pub fn lang(value: &Term) -> Result<Term, ExpressionError> {
    match value {
        Term::Literal(literal) => {
            Ok(Literal::new_simple_literal(literal.language().unwrap_or_default()).into())
        }
        _ => Err(ExpressionError::type_error(format!(
            "LANG is not defined for {value}"
        ))),
    }
}

pub fn datatype(value: &Term) -> Result<Term, ExpressionError> {
    match value {
        Term::Literal(literal) => Ok(literal.datatype().into_owned().into()),
        _ => Err(ExpressionError::type_error(format!(
            "DATATYPE is not defined for {value}"
        ))),
    }
}
