use oxrdf::{Term, Variable};
use std::fmt::{Display, Formatter};

/// The values of a set of variables that identify a join partner. `None` represents an unbound
/// variable.
pub type JoinKey = Vec<Option<Term>>;

/// A (partial) mapping from variables to [Term]s produced during query evaluation.
///
/// Bindings are kept ordered by variable name. Hence, two solutions with the same bindings are
/// equal and hash equally, regardless of the order in which the bindings were added.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Solution {
    bindings: Vec<(Variable, Term)>,
}

impl Solution {
    /// Creates a solution without any bindings.
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Result<usize, usize> {
        self.bindings
            .binary_search_by(|(variable, _)| variable.as_str().cmp(name))
    }

    /// Returns the value bound to `variable`.
    pub fn get(&self, variable: &Variable) -> Option<&Term> {
        self.get_by_name(variable.as_str())
    }

    /// Returns the value bound to the variable with the given `name` (without the leading `?`).
    pub fn get_by_name(&self, name: &str) -> Option<&Term> {
        self.position(name)
            .ok()
            .map(|position| &self.bindings[position].1)
    }

    /// Returns whether `variable` is bound.
    pub fn contains(&self, variable: &Variable) -> bool {
        self.position(variable.as_str()).is_ok()
    }

    /// Binds `variable` to `value`.
    ///
    /// Returns `false` and leaves the solution unchanged if `variable` is already bound to a
    /// different value.
    #[must_use]
    pub fn insert(&mut self, variable: Variable, value: Term) -> bool {
        match self.position(variable.as_str()) {
            Ok(position) => self.bindings[position].1 == value,
            Err(position) => {
                self.bindings.insert(position, (variable, value));
                true
            }
        }
    }

    /// Binds `variable` to `value`, replacing any previous binding.
    pub fn set(&mut self, variable: Variable, value: Term) -> Option<Term> {
        match self.position(variable.as_str()) {
            Ok(position) => Some(std::mem::replace(&mut self.bindings[position].1, value)),
            Err(position) => {
                self.bindings.insert(position, (variable, value));
                None
            }
        }
    }

    /// Removes the binding of `variable`.
    pub fn remove(&mut self, variable: &Variable) -> Option<Term> {
        self.position(variable.as_str())
            .ok()
            .map(|position| self.bindings.remove(position).1)
    }

    /// Returns the number of bound variables.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns whether no variable is bound.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Iterates over the bindings ordered by variable name.
    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &Term)> {
        self.bindings.iter().map(|(variable, value)| (variable, value))
    }

    /// Iterates over the bound variables ordered by name.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.bindings.iter().map(|(variable, _)| variable)
    }

    /// Checks whether `self` and `other` are compatible over `variables`.
    ///
    /// Two solutions are compatible if every variable in `variables` that is bound in both
    /// solutions is bound to the same value. Variables that are unbound on either side are
    /// compatible with any value.
    pub fn is_compatible_with(&self, other: &Solution, variables: &[Variable]) -> bool {
        variables.iter().all(|variable| {
            match (self.get(variable), other.get(variable)) {
                (Some(lhs), Some(rhs)) => lhs == rhs,
                _ => true,
            }
        })
    }

    /// Checks whether `self` and `other` are compatible over all of their variables.
    pub fn is_compatible_with_all(&self, other: &Solution) -> bool {
        self.bindings
            .iter()
            .all(|(variable, value)| match other.get(variable) {
                Some(other) => other == value,
                None => true,
            })
    }

    /// Returns whether at least one variable is bound in both solutions.
    pub fn shares_variable_with(&self, other: &Solution) -> bool {
        self.variables().any(|variable| other.contains(variable))
    }

    /// Merges two solutions. Returns `None` if they are not compatible.
    pub fn merge(&self, other: &Solution) -> Option<Solution> {
        let (mut result, smaller) = if self.len() >= other.len() {
            (self.clone(), other)
        } else {
            (other.clone(), self)
        };
        for (variable, value) in &smaller.bindings {
            if !result.insert(variable.clone(), value.clone()) {
                return None;
            }
        }
        Some(result)
    }

    /// Restricts the solution to `variables`.
    #[must_use]
    pub fn project(&self, variables: &[Variable]) -> Solution {
        self.bindings
            .iter()
            .filter(|(variable, _)| variables.contains(variable))
            .cloned()
            .collect()
    }

    /// Returns the values of `variables` in the order of `variables`.
    pub fn join_key(&self, variables: &[Variable]) -> JoinKey {
        variables
            .iter()
            .map(|variable| self.get(variable).cloned())
            .collect()
    }
}

impl FromIterator<(Variable, Term)> for Solution {
    /// Later bindings of the same variable replace earlier ones.
    fn from_iter<T: IntoIterator<Item = (Variable, Term)>>(iter: T) -> Self {
        let mut solution = Solution::new();
        for (variable, value) in iter {
            solution.set(variable, value);
        }
        solution
    }
}

impl<'a> IntoIterator for &'a Solution {
    type Item = &'a (Variable, Term);
    type IntoIter = std::slice::Iter<'a, (Variable, Term)>;

    fn into_iter(self) -> Self::IntoIter {
        self.bindings.iter()
    }
}

impl IntoIterator for Solution {
    type Item = (Variable, Term);
    type IntoIter = std::vec::IntoIter<(Variable, Term)>;

    fn into_iter(self) -> Self::IntoIter {
        self.bindings.into_iter()
    }
}

impl Display for Solution {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("{")?;
        for (i, (variable, value)) in self.bindings.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{variable} -> {value}")?;
        }
        f.write_str("}")
    }
}
