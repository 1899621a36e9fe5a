//! Pure checks over positions and reorder requests

use std::collections::HashSet;

use uuid::Uuid;

use super::OrderedCollection;
use crate::backend::error::{BackendError, BackendResult};

/// Whether `positions` are exactly `0..n-1` in some order
pub fn is_dense(positions: &[i64]) -> bool {
    let mut sorted = positions.to_vec();
    sorted.sort_unstable();
    sorted
        .iter()
        .enumerate()
        .all(|(index, position)| *position == index as i64)
}

/// Check that `requested` names every current child exactly once.
///
/// Reorder is a full replacement of the ordering, so a partial list, an
/// unknown id or a repeated id is rejected rather than interpreted.
pub fn validate_membership(
    collection: OrderedCollection,
    existing: &[Uuid],
    requested: &[Uuid],
) -> BackendResult<()> {
    let field = collection.ids_field();
    let children = collection.child_table();
    let parent = collection.parent_entity().to_lowercase();

    if requested.is_empty() {
        return Err(BackendError::invalid_input(format!(
            "{field} must be a non-empty array"
        )));
    }

    let mut seen = HashSet::with_capacity(requested.len());
    if !requested.iter().all(|id| seen.insert(*id)) {
        return Err(BackendError::invalid_input(format!("{field} must be unique")));
    }

    if existing.len() != requested.len() {
        return Err(BackendError::invalid_input(format!(
            "{field} does not match {children} for the {parent}"
        )));
    }

    let current: HashSet<&Uuid> = existing.iter().collect();
    if !requested.iter().all(|id| current.contains(id)) {
        return Err(BackendError::invalid_input(format!(
            "{field} must reference {children} belonging to the {parent}"
        )));
    }

    Ok(())
}
