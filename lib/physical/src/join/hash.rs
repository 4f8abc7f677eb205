use crate::join::JoinWorker;
use itertools::Itertools;
use quadflow_common::{ExecutionContext, QueryResult, SolutionIter};
use quadflow_model::{Solution, Term, Variable};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Finds compatible solutions by looking up the values of the join variables in a hash index
/// over the right join input.
///
/// Right solutions that leave a join variable unbound cannot be indexed. They are kept in a
/// separate list and checked for compatibility on every probe. Probes that leave a join variable
/// unbound fall back to checking every right solution. In all cases, the found solutions keep the
/// order of the right input.
#[derive(Debug)]
pub struct HashJoinWorker {
    variables: Arc<[Variable]>,
    right: Arc<[Solution]>,
    /// Maps the values of the join variables to the positions of the matching right solutions.
    index: FxHashMap<Vec<Term>, Vec<usize>>,
    /// Positions of the right solutions that do not bind all join variables.
    unindexed: Vec<usize>,
}

impl HashJoinWorker {
    pub fn new(variables: impl Into<Arc<[Variable]>>, right: impl Into<Arc<[Solution]>>) -> Self {
        let variables = variables.into();
        let right = right.into();

        let mut index = FxHashMap::<Vec<Term>, Vec<usize>>::default();
        let mut unindexed = Vec::new();
        for (position, solution) in right.iter().enumerate() {
            match bound_key(solution, &variables) {
                Some(key) => index.entry(key).or_default().push(position),
                None => unindexed.push(position),
            }
        }

        Self {
            variables,
            right,
            index,
            unindexed,
        }
    }

    /// Returns the positions of the right solutions that may be compatible with `lhs`.
    fn candidates(&self, lhs: &Solution) -> Vec<usize> {
        match bound_key(lhs, &self.variables) {
            Some(key) => {
                let bucket = self.index.get(&key).map(Vec::as_slice).unwrap_or_default();
                bucket
                    .iter()
                    .copied()
                    .merge(self.unindexed.iter().copied())
                    .collect()
            }
            None => (0..self.right.len()).collect(),
        }
    }
}

/// Returns the values of `variables` if all of them are bound in `solution`.
fn bound_key(solution: &Solution, variables: &[Variable]) -> Option<Vec<Term>> {
    variables
        .iter()
        .map(|variable| solution.get(variable).cloned())
        .collect()
}

impl JoinWorker for HashJoinWorker {
    fn find(&self, lhs: &Solution, _context: &ExecutionContext) -> QueryResult<SolutionIter> {
        let candidates = self.candidates(lhs);
        let variables = Arc::clone(&self.variables);
        let right = Arc::clone(&self.right);
        let lhs = lhs.clone();
        Ok(Box::new(candidates.into_iter().filter_map(move |i| {
            let candidate = &right[i];
            lhs.is_compatible_with(candidate, &variables)
                .then(|| Ok(candidate.clone()))
        })))
    }

    fn can_reuse(&self, _solution: &Solution, _context: &ExecutionContext) -> bool {
        true
    }
}
