use quadflow_common::error::ExpressionError;
use quadflow_model::{Term, TypedValue};
use std::cmp::Ordering;

/// Returns the [effective boolean value](https://www.w3.org/TR/sparql11-query/#ebv) of `term`.
pub fn effective_boolean_value(term: &Term) -> Result<bool, ExpressionError> {
    TypedValue::from_term(term)
        .effective_boolean_value()
        .map_err(|_| ExpressionError::type_error(format!("{term} has no effective boolean value")))
}

/// Implements the `=` operator.
///
/// Values of known datatypes are compared in their value space. Two literals that are not the
/// same term and whose values cannot be compared produce a type error.
pub fn equal_values(lhs: &Term, rhs: &Term) -> Result<bool, ExpressionError> {
    let lhs_value = TypedValue::from_term(lhs);
    let rhs_value = TypedValue::from_term(rhs);
    match (&lhs_value, &rhs_value) {
        (TypedValue::NumericLiteral(lhs), TypedValue::NumericLiteral(rhs)) => Ok(lhs == rhs),
        (TypedValue::BooleanLiteral(lhs), TypedValue::BooleanLiteral(rhs)) => Ok(lhs == rhs),
        (TypedValue::SimpleLiteral(lhs), TypedValue::SimpleLiteral(rhs)) => Ok(lhs == rhs),
        (
            TypedValue::LanguageStringLiteral {
                value: lhs_value,
                language: lhs_language,
            },
            TypedValue::LanguageStringLiteral {
                value: rhs_value,
                language: rhs_language,
            },
        ) => Ok(lhs_value == rhs_value && lhs_language.eq_ignore_ascii_case(rhs_language)),
        _ if lhs == rhs => Ok(true),
        (TypedValue::OtherLiteral(_), other) | (other, TypedValue::OtherLiteral(_))
            if is_literal(other) =>
        {
            Err(ExpressionError::type_error(format!(
                "Cannot compare {lhs} and {rhs} for equality"
            )))
        }
        _ => Ok(false),
    }
}

fn is_literal(value: &TypedValue) -> bool {
    !matches!(value, TypedValue::NamedNode(_) | TypedValue::BlankNode(_))
}

/// Compares two terms for the operators `<`, `<=`, `>` and `>=`.
///
/// Returns `None` if the values are not ordered (e.g., `NaN`) and an error if the values cannot
/// be compared.
pub fn compare_values(lhs: &Term, rhs: &Term) -> Result<Option<Ordering>, ExpressionError> {
    match (TypedValue::from_term(lhs), TypedValue::from_term(rhs)) {
        (TypedValue::NumericLiteral(lhs), TypedValue::NumericLiteral(rhs)) => {
            Ok(lhs.partial_cmp(&rhs))
        }
        (TypedValue::BooleanLiteral(lhs), TypedValue::BooleanLiteral(rhs)) => {
            Ok(Some(lhs.cmp(&rhs)))
        }
        (TypedValue::SimpleLiteral(lhs), TypedValue::SimpleLiteral(rhs)) => {
            Ok(Some(lhs.cmp(&rhs)))
        }
        (
            TypedValue::LanguageStringLiteral {
                value: lhs_value,
                language: lhs_language,
            },
            TypedValue::LanguageStringLiteral {
                value: rhs_value,
                language: rhs_language,
            },
        ) if lhs_language.eq_ignore_ascii_case(&rhs_language) => {
            Ok(Some(lhs_value.cmp(&rhs_value)))
        }
        _ => Err(ExpressionError::type_error(format!(
            "Cannot compare {lhs} and {rhs}"
        ))),
    }
}

/// A total order over optional terms that is used for sorting solutions.
///
/// Unbound values come first, followed by blank nodes, IRIs and literals. Literals are grouped by
/// kind: numbers, `NaN`, booleans, strings, language-tagged strings and all other literals.
/// Numbers and booleans are ordered by value. Ties are broken by the lexical form, the datatype
/// and the language.
pub fn compare_terms(lhs: Option<&Term>, rhs: Option<&Term>) -> Ordering {
    match (lhs, rhs) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(lhs), Some(rhs)) => match (lhs, rhs) {
            (Term::BlankNode(lhs), Term::BlankNode(rhs)) => lhs.as_str().cmp(rhs.as_str()),
            (Term::NamedNode(lhs), Term::NamedNode(rhs)) => lhs.as_str().cmp(rhs.as_str()),
            (Term::Literal(lhs_literal), Term::Literal(rhs_literal)) => {
                let lhs_value = TypedValue::from_term(lhs);
                let rhs_value = TypedValue::from_term(rhs);
                literal_rank(&lhs_value)
                    .cmp(&literal_rank(&rhs_value))
                    .then_with(|| compare_ranked_values(&lhs_value, &rhs_value))
                    .then_with(|| lhs_literal.value().cmp(rhs_literal.value()))
                    .then_with(|| {
                        lhs_literal
                            .datatype()
                            .as_str()
                            .cmp(rhs_literal.datatype().as_str())
                    })
                    .then_with(|| lhs_literal.language().cmp(&rhs_literal.language()))
            }
            _ => term_kind(lhs).cmp(&term_kind(rhs)),
        },
    }
}

fn literal_rank(value: &TypedValue) -> u8 {
    match value {
        TypedValue::NumericLiteral(value) if value.partial_cmp(value).is_some() => 0,
        TypedValue::NumericLiteral(_) => 1,
        TypedValue::BooleanLiteral(_) => 2,
        TypedValue::SimpleLiteral(_) => 3,
        TypedValue::LanguageStringLiteral { .. } => 4,
        _ => 5,
    }
}

/// Compares two values of the same [literal_rank].
fn compare_ranked_values(lhs: &TypedValue, rhs: &TypedValue) -> Ordering {
    match (lhs, rhs) {
        (TypedValue::NumericLiteral(lhs), TypedValue::NumericLiteral(rhs)) => {
            lhs.partial_cmp(rhs).unwrap_or(Ordering::Equal)
        }
        (TypedValue::BooleanLiteral(lhs), TypedValue::BooleanLiteral(rhs)) => lhs.cmp(rhs),
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadflow_model::vocab::xsd;
    use quadflow_model::{BlankNode, Literal, NamedNode};

    fn integer(value: i64) -> Term {
        Literal::from(value).into()
    }

    #[test]
    fn numeric_equality_uses_promotion() {
        let decimal = Literal::new_typed_literal("1.0", xsd::DECIMAL).into();
        assert!(equal_values(&integer(1), &decimal).unwrap());
        assert!(!equal_values(&integer(1), &integer(2)).unwrap());
    }

    #[test]
    fn unknown_literals_are_not_comparable() {
        let date = Literal::new_typed_literal("2020-01-01", xsd::DATE).into();
        let other = Literal::new_typed_literal("2021-01-01", xsd::DATE).into();
        assert!(equal_values(&date, &other).is_err());
        assert!(equal_values(&date, &date).unwrap());

        let iri = NamedNode::new_unchecked("http://example.com/a").into();
        assert!(!equal_values(&date, &iri).unwrap());
    }

    #[test]
    fn comparison_of_incompatible_values_fails() {
        let string = Literal::new_simple_literal("a").into();
        assert!(compare_values(&integer(1), &string).is_err());
        assert_eq!(
            compare_values(&integer(1), &integer(2)).unwrap(),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn total_order_of_terms() {
        let blank = Term::from(BlankNode::new_unchecked("b"));
        let iri = Term::from(NamedNode::new_unchecked("http://example.com/a"));
        let mut terms = vec![
            Some(integer(10)),
            Some(iri.clone()),
            None,
            Some(integer(2)),
            Some(blank.clone()),
        ];
        terms.sort_by(|lhs, rhs| compare_terms(lhs.as_ref(), rhs.as_ref()));
        assert_eq!(
            terms,
            vec![None, Some(blank), Some(iri), Some(integer(2)), Some(integer(10))]
        );
    }

    #[test]
    fn literals_of_mixed_kinds_are_totally_ordered() {
        let string = |value: &str| Term::from(Literal::new_simple_literal(value));
        assert_eq!(
            compare_terms(Some(&integer(10)), Some(&integer(9))),
            Ordering::Greater
        );
        assert_eq!(
            compare_terms(Some(&integer(9)), Some(&string("5"))),
            Ordering::Less
        );
        assert_eq!(
            compare_terms(Some(&integer(10)), Some(&string("5"))),
            Ordering::Less
        );

        let mut terms = (0..2000_i64)
            .map(|i| (i * 7919) % 2000)
            .map(|i| {
                let term = if i % 2 == 0 {
                    integer(i)
                } else {
                    string(&i.to_string())
                };
                Some(term)
            })
            .collect::<Vec<_>>();
        terms.sort_by(|lhs, rhs| compare_terms(lhs.as_ref(), rhs.as_ref()));

        assert!(terms
            .windows(2)
            .all(|pair| compare_terms(pair[0].as_ref(), pair[1].as_ref()) != Ordering::Greater));
        assert_eq!(terms[0], Some(integer(0)));
        assert_eq!(terms[999], Some(integer(1998)));
        assert_eq!(terms[1000], Some(string("1")));
        assert_eq!(terms[1999], Some(string("999")));
    }

    #[test]
    fn nan_is_ordered_after_numbers() {
        let nan = Term::from(Literal::from(f64::NAN));
        let mut terms = vec![Some(nan.clone()), Some(integer(3)), Some(integer(-1))];
        terms.sort_by(|lhs, rhs| compare_terms(lhs.as_ref(), rhs.as_ref()));
        assert_eq!(terms, vec![Some(integer(-1)), Some(integer(3)), Some(nan)]);
    }
}
