//! Column name deduplication.

use crate::config::FIRST_DUPLICATE_SUFFIX;
use hashbrown::HashSet;

/// Makes an ordered list of column names unique.
///
/// The first occurrence of a name is kept as is. Every later duplicate gets
/// the first suffix `_2`, `_3`, ... that is not already taken by a name
/// assigned earlier in the output, so `[a, a, a_2]` becomes
/// `[a, a_2, a_2_2]` rather than colliding on `a_2`.
pub fn uniquify<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut assigned: HashSet<String> = HashSet::with_capacity(names.len());
    let mut result = Vec::with_capacity(names.len());

    for name in names {
        let name = name.as_ref();
        let mut candidate = name.to_string();
        let mut suffix = FIRST_DUPLICATE_SUFFIX;

        while assigned.contains(&candidate) {
            candidate = format!("{}_{}", name, suffix);
            suffix += 1;
        }

        assigned.insert(candidate.clone());
        result.push(candidate);
    }

    result
}
