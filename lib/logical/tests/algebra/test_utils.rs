use quadflow_logical::expr::BinaryOperator;
use quadflow_logical::Expression;
use quadflow_model::{
    Literal, NamedNode, NamedNodePattern, Solution, Term, TermPattern, TriplePattern, Variable,
};

pub fn var(name: &str) -> Variable {
    Variable::new_unchecked(name)
}

pub fn iri(name: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("http://example.com/{name}"))
}

pub fn pattern(subject: &str, predicate: &str, object: &str) -> TriplePattern {
    TriplePattern {
        subject: TermPattern::Variable(var(subject)),
        predicate: NamedNodePattern::NamedNode(iri(predicate)),
        object: TermPattern::Variable(var(object)),
    }
}

pub fn compare(operator: BinaryOperator, variable: &str, value: i64) -> Expression {
    Expression::binary(operator, var(variable).into(), Literal::from(value).into())
}

pub fn row(variable: &str, value: i64) -> Solution {
    [(var(variable), Term::from(Literal::from(value)))]
        .into_iter()
        .collect()
}
