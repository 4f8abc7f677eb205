use crate::test_utils::{pattern, var};
use quadflow_logical::{Algebra, AlgebraExtension};
use quadflow_model::Variable;
use std::any::Any;
use std::fmt::Formatter;

/// Binds `?rank` to the position of each solution of its input.
#[derive(Debug, PartialEq)]
struct RankNode {
    input: Algebra,
}

impl AlgebraExtension for RankNode {
    fn name(&self) -> &str {
        "Rank"
    }

    fn inputs(&self) -> Vec<&Algebra> {
        vec![&self.input]
    }

    fn variables(&self) -> Vec<Variable> {
        let mut variables = self.input.variables();
        variables.push(var("rank"));
        variables
    }

    fn fmt_for_explain(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Rank: ?rank")
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn AlgebraExtension) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|other| self == other)
    }
}

fn rank(predicate: &str) -> Algebra {
    Algebra::extension(RankNode {
        input: Algebra::bgp([pattern("s", predicate, "o")]),
    })
}

#[test]
fn test_extension_explain() {
    let plan = Algebra::distinct(rank("p"));
    insta::assert_snapshot!(plan, @r"
    Distinct
      Rank: ?rank
        Bgp: ?s <http://example.com/p> ?o
    ");
}

#[test]
fn test_extension_equality_and_variables() {
    assert_eq!(rank("p"), rank("p"));
    assert_ne!(rank("p"), rank("q"));
    assert_eq!(rank("p").variables(), vec![var("s"), var("o"), var("rank")]);

    let Algebra::Extension(node) = rank("p") else {
        panic!("expected an extension node");
    };
    assert!(node.downcast_ref::<RankNode>().is_some());
}
