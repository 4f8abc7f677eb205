mod error;
mod solution;
mod typed_value;
mod xsd;

pub use error::*;
pub use solution::*;
pub use typed_value::*;
pub use xsd::*;

// Re-export some oxrdf types.
pub use oxrdf::vocab;
pub use oxrdf::{
    BlankNode, BlankNodeRef, GraphName, GraphNameRef, Literal, LiteralRef, NamedNode,
    NamedNodeRef, NamedOrBlankNode, NamedOrBlankNodeRef, Quad, QuadRef, Subject, SubjectRef,
    Term, TermRef, Triple, TripleRef, Variable, VariableNameParseError, VariableRef,
};

// Re-export the pattern types of spargebra.
pub use spargebra::term::{NamedNodePattern, TermPattern, TriplePattern};
