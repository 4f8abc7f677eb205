use crate::test_utils::{compare, iri, pattern, var};
use quadflow_logical::expr::{AggregateExpression, BinaryOperator};
use quadflow_logical::Algebra;
use quadflow_model::Variable;

#[test]
fn test_bgp_variables_in_order_of_occurrence() {
    let plan = Algebra::join(
        Algebra::bgp([pattern("s", "p", "o"), pattern("o", "q", "v")]),
        Algebra::graph(Algebra::bgp([pattern("s", "r", "w")]), var("g")),
    );
    assert_eq!(
        plan.variables(),
        vec![var("s"), var("o"), var("v"), var("g"), var("w")]
    );
}

#[test]
fn test_minus_and_project_restrict_variables() {
    let minus = Algebra::minus(
        Algebra::bgp([pattern("s", "p", "o")]),
        Algebra::bgp([pattern("s", "q", "x")]),
    );
    assert_eq!(minus.variables(), vec![var("s"), var("o")]);

    let project = Algebra::project(minus, vec![var("o")]);
    assert_eq!(project.variables(), vec![var("o")]);
}

#[test]
fn test_extend_group_and_filter_variables() {
    let filtered = Algebra::filter(
        Algebra::bgp([pattern("s", "p", "o")]),
        [compare(BinaryOperator::Greater, "o", 1)],
    )
    .unwrap();
    let extended = Algebra::extend(filtered, var("z"), var("o").into());
    assert_eq!(extended.variables(), vec![var("s"), var("o"), var("z")]);

    let grouped = Algebra::group(
        extended,
        vec![var("s")],
        vec![(var("c"), AggregateExpression::count_all(false))],
    );
    assert_eq!(grouped.variables(), vec![var("s"), var("c")]);
}

#[test]
fn test_named_graph_does_not_add_variables() {
    let plan = Algebra::graph(Algebra::bgp([pattern("s", "p", "o")]), iri("g"));
    assert_eq!(
        plan.variables(),
        vec![Variable::new_unchecked("s"), Variable::new_unchecked("o")]
    );
}
