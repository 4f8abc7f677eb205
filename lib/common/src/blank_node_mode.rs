/// Defines how blank nodes in a basic graph pattern are matched against the data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlankNodeMatchingMode {
    /// The blank node matches any term, like a variable whose binding is not visible outside
    /// the pattern.
    #[default]
    Variable,
    /// The blank node only matches itself.
    Filter,
}
