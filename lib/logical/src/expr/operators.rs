use std::fmt::{Display, Formatter};

/// Operators and built-in functions that take a single argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Not,
    Plus,
    Minus,
    Bound,
    IsIri,
    IsBlank,
    IsLiteral,
    IsNumeric,
    Str,
    Lang,
    Datatype,
    StrLen,
    UCase,
    LCase,
}

impl UnaryOperator {
    pub fn name(self) -> &'static str {
        match self {
            UnaryOperator::Not => "!",
            UnaryOperator::Plus => "+",
            UnaryOperator::Minus => "-",
            UnaryOperator::Bound => "BOUND",
            UnaryOperator::IsIri => "isIRI",
            UnaryOperator::IsBlank => "isBlank",
            UnaryOperator::IsLiteral => "isLiteral",
            UnaryOperator::IsNumeric => "isNumeric",
            UnaryOperator::Str => "STR",
            UnaryOperator::Lang => "LANG",
            UnaryOperator::Datatype => "DATATYPE",
            UnaryOperator::StrLen => "STRLEN",
            UnaryOperator::UCase => "UCASE",
            UnaryOperator::LCase => "LCASE",
        }
    }

    /// Returns whether the operator is written in prefix notation (e.g., `!?x`).
    pub fn is_prefix(self) -> bool {
        matches!(
            self,
            UnaryOperator::Not | UnaryOperator::Plus | UnaryOperator::Minus
        )
    }
}

impl Display for UnaryOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Operators and built-in functions that take two arguments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Or,
    And,
    Equal,
    SameTerm,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
    StrStarts,
    StrEnds,
    Contains,
    LangMatches,
}

impl BinaryOperator {
    pub fn name(self) -> &'static str {
        match self {
            BinaryOperator::Or => "||",
            BinaryOperator::And => "&&",
            BinaryOperator::Equal => "=",
            BinaryOperator::SameTerm => "sameTerm",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterOrEqual => ">=",
            BinaryOperator::Less => "<",
            BinaryOperator::LessOrEqual => "<=",
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::StrStarts => "STRSTARTS",
            BinaryOperator::StrEnds => "STRENDS",
            BinaryOperator::Contains => "CONTAINS",
            BinaryOperator::LangMatches => "langMatches",
        }
    }

    /// Returns whether the operator is written in infix notation (e.g., `?a + ?b`).
    pub fn is_infix(self) -> bool {
        !matches!(
            self,
            BinaryOperator::SameTerm
                | BinaryOperator::StrStarts
                | BinaryOperator::StrEnds
                | BinaryOperator::Contains
                | BinaryOperator::LangMatches
        )
    }
}

impl Display for BinaryOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Built-in functions that take three arguments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TernaryOperator {
    If,
    Substr,
}

impl Display for TernaryOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TernaryOperator::If => f.write_str("IF"),
            TernaryOperator::Substr => f.write_str("SUBSTR"),
        }
    }
}

/// Functions that take an arbitrary number of arguments.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NaryOperator {
    Coalesce,
    Concat,
    /// The first argument is tested for membership in the remaining arguments.
    In,
    /// A function identified by an IRI that is resolved through a function registry.
    Function(quadflow_model::NamedNode),
}

impl Display for NaryOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            NaryOperator::Coalesce => f.write_str("COALESCE"),
            NaryOperator::Concat => f.write_str("CONCAT"),
            NaryOperator::In => f.write_str("IN"),
            NaryOperator::Function(name) => write!(f, "{name}"),
        }
    }
}
