use crate::builtin::boolean;
use quadflow_common::error::ExpressionError;
use quadflow_model::vocab::xsd;
use quadflow_model::{Literal, Numeric, Term, TypedValue};

/// The lexical form and language of a simple, `xsd:string` or language-tagged literal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StringArg<'a> {
    pub value: &'a str,
    pub language: Option<&'a str>,
}

impl<'a> StringArg<'a> {
    pub fn try_from_term(term: &'a Term) -> Result<Self, ExpressionError> {
        match term {
            Term::Literal(literal) => match literal.language() {
                Some(language) => Ok(Self {
                    value: literal.value(),
                    language: Some(language),
                }),
                None if literal.datatype() == xsd::STRING => Ok(Self {
                    value: literal.value(),
                    language: None,
                }),
                None => Err(not_a_string(term)),
            },
            _ => Err(not_a_string(term)),
        }
    }

    /// Creates a literal with the language of this argument.
    pub fn with_value(self, value: impl Into<String>) -> Term {
        match self.language {
            Some(language) => {
                Literal::new_language_tagged_literal_unchecked(value, language).into()
            }
            None => Literal::new_simple_literal(value).into(),
        }
    }
}

fn not_a_string(term: &Term) -> ExpressionError {
    ExpressionError::type_error(format!("{term} is not a string literal"))
}

/// Checks whether two strings are
/// [argument compatible](https://www.w3.org/TR/sparql11-query/#func-arg-compatibility).
fn compatible_args<'a>(
    lhs: &'a Term,
    rhs: &'a Term,
) -> Result<(StringArg<'a>, StringArg<'a>), ExpressionError> {
    let lhs_arg = StringArg::try_from_term(lhs)?;
    let rhs_arg = StringArg::try_from_term(rhs)?;
    match (lhs_arg.language, rhs_arg.language) {
        (_, None) => Ok((lhs_arg, rhs_arg)),
        (Some(lhs_language), Some(rhs_language))
            if lhs_language.eq_ignore_ascii_case(rhs_language) =>
        {
            Ok((lhs_arg, rhs_arg))
        }
        _ => Err(ExpressionError::type_error(format!(
            "{lhs} and {rhs} are not argument compatible"
        ))),
    }
}

pub fn strlen(value: &Term) -> Result<Term, ExpressionError> {
    let arg = StringArg::try_from_term(value)?;
    let length = i64::try_from(arg.value.chars().count())
        .map_err(|_| ExpressionError::type_error("String too long"))?;
    Ok(Literal::from(length).into())
}

pub fn ucase(value: &Term) -> Result<Term, ExpressionError> {
    let arg = StringArg::try_from_term(value)?;
    Ok(arg.with_value(arg.value.to_uppercase()))
}

pub fn lcase(value: &Term) -> Result<Term, ExpressionError> {
    let arg = StringArg::try_from_term(value)?;
    Ok(arg.with_value(arg.value.to_lowercase()))
}

pub fn str_starts(lhs: &Term, rhs: &Term) -> Result<Term, ExpressionError> {
    let (lhs, rhs) = compatible_args(lhs, rhs)?;
    Ok(boolean(lhs.value.starts_with(rhs.value)))
}

pub fn str_ends(lhs: &Term, rhs: &Term) -> Result<Term, ExpressionError> {
    let (lhs, rhs) = compatible_args(lhs, rhs)?;
    Ok(boolean(lhs.value.ends_with(rhs.value)))
}

pub fn contains(lhs: &Term, rhs: &Term) -> Result<Term, ExpressionError> {
    let (lhs, rhs) = compatible_args(lhs, rhs)?;
    Ok(boolean(lhs.value.contains(rhs.value)))
}

/// Implements `langMatches` with basic filtering as defined in RFC 4647.
pub fn lang_matches(tag: &Term, range: &Term) -> Result<Term, ExpressionError> {
    let tag = simple_literal(tag)?.to_ascii_lowercase();
    let range = simple_literal(range)?.to_ascii_lowercase();
    let matches = if range == "*" {
        !tag.is_empty()
    } else {
        tag.strip_prefix(range.as_str())
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('-'))
    };
    Ok(boolean(matches))
}

fn simple_literal(term: &Term) -> Result<&str, ExpressionError> {
    match StringArg::try_from_term(term)? {
        StringArg {
            value,
            language: None,
        } => Ok(value),
        StringArg { .. } => Err(ExpressionError::type_error(format!(
            "{term} is not a simple literal"
        ))),
    }
}

/// Implements `SUBSTR` with XPath's `fn:substring` semantics. Positions are 1-based and
/// rounded.
pub fn substr(
    source: &Term,
    start: &Term,
    length: Option<&Term>,
) -> Result<Term, ExpressionError> {
    let arg = StringArg::try_from_term(source)?;
    let start = integer_position(start)?.round();
    let end = match length {
        Some(length) => start + integer_position(length)?.round(),
        None => f64::INFINITY,
    };

    let value = arg
        .value
        .chars()
        .zip(1_u32..)
        .filter(|(_, position)| {
            let position = f64::from(*position);
            position >= start && position < end
        })
        .map(|(c, _)| c)
        .collect::<String>();
    Ok(arg.with_value(value))
}

fn integer_position(term: &Term) -> Result<f64, ExpressionError> {
    match TypedValue::from_term(term) {
        TypedValue::NumericLiteral(value) => Ok(Numeric::to_f64(value)),
        _ => Err(ExpressionError::type_error(format!(
            "{term} is not a numeric literal"
        ))),
    }
}

/// Concatenates string literals. The result keeps the language if all arguments share it.
pub fn concat(values: &[Term]) -> Result<Term, ExpressionError> {
    let args = values
        .iter()
        .map(StringArg::try_from_term)
        .collect::<Result<Vec<_>, _>>()?;
    let value = args.iter().map(|arg| arg.value).collect::<String>();
    let language = match args.split_first() {
        Some((first, rest)) if rest.iter().all(|arg| arg.language == first.language) => {
            first.language
        }
        _ => None,
    };
    Ok(StringArg {
        value: "",
        language,
    }
    .with_value(value))
}
