//! Dense 1-based positions for the branches of one feature.
//!
//! These are pure mappings; persisting them atomically is the store's job
//! (see [`crate::db::Database::reorder_branches`]).

use std::collections::{BTreeMap, HashSet};

use crate::error::StackError;

/// Position for a branch appended to the end of a stack.
///
/// Returns `max(existing) + 1`, or `1` for an empty stack.
pub fn append_position(existing: &[i64]) -> i64 {
    existing.iter().copied().max().map_or(1, |max| max + 1)
}

/// Assign position `i + 1` to the identifier at index `i`.
///
/// Fails with [`StackError::InvalidInput`] if an identifier appears twice.
/// Membership is not checked: the caller must pass exactly the feature's
/// stacked branch ids.
pub fn reorder(ordered_ids: &[i64]) -> Result<BTreeMap<i64, i64>, StackError> {
    let mut seen = HashSet::with_capacity(ordered_ids.len());
    if let Some(dup) = ordered_ids.iter().find(|id| !seen.insert(**id)) {
        return Err(StackError::invalid(format!(
            "duplicate branch id {} in reorder",
            dup
        )));
    }

    Ok(compact(ordered_ids))
}

/// Renumber an already-unique order to `1..N`, preserving it.
pub fn compact(ordered_ids: &[i64]) -> BTreeMap<i64, i64> {
    ordered_ids
        .iter()
        .enumerate()
        .map(|(index, id)| (*id, index as i64 + 1))
        .collect()
}

/// Whether `positions` is a permutation of `1..=positions.len()`.
pub fn is_dense(positions: &[i64]) -> bool {
    let mut sorted = positions.to_vec();
    sorted.sort_unstable();
    sorted
        .iter()
        .enumerate()
        .all(|(index, position)| *position == index as i64 + 1)
}
