use crate::{Numeric, ThinError, ThinResult};
use oxrdf::vocab::{rdf, xsd};
use oxrdf::{BlankNode, Literal, NamedNode, Term};

/// The typed view of an RDF term that expression evaluation operates on.
///
/// Literals with a supported datatype are parsed into their value space. Ill-typed literals (e.g.,
/// `"abc"^^xsd:integer`) and literals of unsupported datatypes are kept as
/// [TypedValue::OtherLiteral].
#[derive(Clone, PartialEq, Debug)]
pub enum TypedValue {
    NamedNode(NamedNode),
    BlankNode(BlankNode),
    BooleanLiteral(bool),
    NumericLiteral(Numeric),
    /// A simple literal or a literal with the datatype `xsd:string`.
    SimpleLiteral(String),
    LanguageStringLiteral { value: String, language: String },
    OtherLiteral(Literal),
}

impl TypedValue {
    /// Creates the typed view of `term`.
    pub fn from_term(term: &Term) -> Self {
        match term {
            Term::NamedNode(node) => TypedValue::NamedNode(node.clone()),
            Term::BlankNode(node) => TypedValue::BlankNode(node.clone()),
            Term::Literal(literal) => Self::from_literal(literal),
            #[allow(unreachable_patterns, reason = "RDF-star terms are behind a feature flag")]
            _ => TypedValue::OtherLiteral(Literal::new_simple_literal(term.to_string())),
        }
    }

    fn from_literal(literal: &Literal) -> Self {
        let datatype = literal.datatype();
        if let Some(language) = literal.language() {
            return TypedValue::LanguageStringLiteral {
                value: literal.value().to_owned(),
                language: language.to_owned(),
            };
        }

        if datatype == xsd::STRING {
            return TypedValue::SimpleLiteral(literal.value().to_owned());
        }

        if datatype == xsd::BOOLEAN {
            return match literal.value() {
                "true" | "1" => TypedValue::BooleanLiteral(true),
                "false" | "0" => TypedValue::BooleanLiteral(false),
                _ => TypedValue::OtherLiteral(literal.clone()),
            };
        }

        match Numeric::from_literal(literal.as_ref()) {
            Ok(numeric) => TypedValue::NumericLiteral(numeric),
            Err(_) => TypedValue::OtherLiteral(literal.clone()),
        }
    }

    /// Converts the value back into an RDF term.
    pub fn into_term(self) -> Term {
        match self {
            TypedValue::NamedNode(node) => Term::NamedNode(node),
            TypedValue::BlankNode(node) => Term::BlankNode(node),
            TypedValue::BooleanLiteral(value) => Term::Literal(Literal::from(value)),
            TypedValue::NumericLiteral(value) => Term::Literal(value.to_literal()),
            TypedValue::SimpleLiteral(value) => Term::Literal(Literal::new_simple_literal(value)),
            TypedValue::LanguageStringLiteral { value, language } => Term::Literal(
                Literal::new_language_tagged_literal_unchecked(value, language),
            ),
            TypedValue::OtherLiteral(literal) => Term::Literal(literal),
        }
    }

    /// Returns the [effective boolean value](https://www.w3.org/TR/sparql11-query/#ebv).
    pub fn effective_boolean_value(&self) -> ThinResult<bool> {
        match self {
            TypedValue::BooleanLiteral(value) => Ok(*value),
            TypedValue::NumericLiteral(value) => Ok(!value.is_zero_or_nan()),
            TypedValue::SimpleLiteral(value) => Ok(!value.is_empty()),
            // Ill-typed booleans and numerics have an effective boolean value of false.
            TypedValue::OtherLiteral(literal)
                if literal.datatype() == xsd::BOOLEAN
                    || crate::is_numeric_datatype(literal.datatype()) =>
            {
                Ok(false)
            }
            _ => ThinError::expected(),
        }
    }

    /// Returns the lexical form and language tag of string-like literals.
    pub fn as_string_literal(&self) -> ThinResult<(&str, Option<&str>)> {
        match self {
            TypedValue::SimpleLiteral(value) => Ok((value, None)),
            TypedValue::LanguageStringLiteral { value, language } => Ok((value, Some(language))),
            _ => ThinError::expected(),
        }
    }

    /// Returns the datatype IRI of a literal.
    pub fn datatype(&self) -> ThinResult<NamedNode> {
        match self {
            TypedValue::BooleanLiteral(_) => Ok(xsd::BOOLEAN.into_owned()),
            TypedValue::NumericLiteral(value) => Ok(value.to_literal().datatype().into_owned()),
            TypedValue::SimpleLiteral(_) => Ok(xsd::STRING.into_owned()),
            TypedValue::LanguageStringLiteral { .. } => Ok(rdf::LANG_STRING.into_owned()),
            TypedValue::OtherLiteral(literal) => Ok(literal.datatype().into_owned()),
            TypedValue::NamedNode(_) | TypedValue::BlankNode(_) => ThinError::expected(),
        }
    }
}
