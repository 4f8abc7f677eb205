use crate::test_utils::{compare, iri, pattern, row, var};
use quadflow_common::error::UsageError;
use quadflow_logical::algebra::OrderCondition;
use quadflow_logical::expr::{
    AggregateExpression, AggregateFunction, BinaryOperator, UnaryOperator,
};
use quadflow_logical::{Algebra, Expression};
use quadflow_model::GraphName;

#[test]
fn test_explain_filter() -> Result<(), UsageError> {
    let table = Algebra::table(vec![var("x")], vec![row("x", 5), row("x", 15)]);
    let plan = Algebra::filter(
        table,
        [
            compare(BinaryOperator::Greater, "x", 0),
            compare(BinaryOperator::Less, "x", 10),
        ],
    )?;

    insta::assert_snapshot!(plan, @r"
    Filter: (?x > 0), (?x < 10)
      Table: [?x] rows=2
    ");

    Ok(())
}

#[test]
fn test_explain_nested_filters_are_flattened() -> Result<(), UsageError> {
    let bgp = Algebra::bgp([pattern("s", "p", "o")]);
    let inner = Algebra::filter(bgp, [compare(BinaryOperator::Greater, "o", 0)])?;
    let plan = Algebra::filter(inner, [compare(BinaryOperator::Less, "o", 10)])?;

    insta::assert_snapshot!(plan, @r"
    Filter: (?o > 0), (?o < 10)
      Bgp: ?s <http://example.com/p> ?o
    ");

    Ok(())
}

#[test]
fn test_explain_graph_and_optional() {
    let plan = Algebra::project(
        Algebra::left_join(
            Algebra::bgp([pattern("s", "p", "o")]),
            Algebra::graph(Algebra::bgp([pattern("s", "q", "v")]), iri("g")),
            Some(Expression::unary(UnaryOperator::Bound, var("v").into())),
        ),
        vec![var("s"), var("v")],
    );

    insta::assert_snapshot!(plan, @r"
    Project: ?s, ?v
      LeftJoin: BOUND(?v)
        Bgp: ?s <http://example.com/p> ?o
        Graph: <http://example.com/g>
          Bgp: ?s <http://example.com/q> ?v
    ");
}

#[test]
fn test_explain_solution_modifiers() {
    let grouped = Algebra::group(
        Algebra::bgp([pattern("s", "p", "o")]),
        vec![var("s")],
        vec![(
            var("count"),
            AggregateExpression::new(AggregateFunction::Count, var("o").into(), true),
        )],
    );
    let plan = Algebra::slice(
        Algebra::distinct(Algebra::order_by(
            grouped,
            vec![OrderCondition::Desc(var("count").into())],
        )),
        1,
        Some(10),
    );

    insta::assert_snapshot!(plan, @r"
    Slice: offset=1, limit=10
      Distinct
        OrderBy: DESC(?count)
          Group: [?s], [?count := COUNT(DISTINCT ?o)]
            Bgp: ?s <http://example.com/p> ?o
    ");
}

#[test]
fn test_explain_dataset_scope() {
    let plan = Algebra::dataset_scope(
        Algebra::union(
            Algebra::extend(Algebra::unit(), var("x"), compare(BinaryOperator::Add, "y", 1)),
            Algebra::minus(Algebra::empty(), Algebra::unit()),
        ),
        vec![iri("g1").into(), GraphName::DefaultGraph],
    );

    insta::assert_snapshot!(plan, @r"
    DatasetScope: <http://example.com/g1>, DEFAULT
      Union
        Extend: ?x := (?y + 1)
          Table: [] rows=1
        Minus
          Table: [] rows=0
          Table: [] rows=1
    ");
}
