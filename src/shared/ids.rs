//! Identifier and scalar field parsing
//!
//! All entity identifiers travel as hyphenated RFC 4122 UUID strings. Anything
//! else is rejected here, before a request ever reaches the store.

use std::collections::HashSet;

use serde_json::Value;
use uuid::{Uuid, Variant};

use crate::shared::error::SharedError;

/// Length of the hyphenated textual form (`8-4-4-4-12`)
const HYPHENATED_LEN: usize = 36;

/// Parse a textual identifier, returning `None` when it is not a
/// hyphenated RFC 4122 UUID of version 1 through 5.
pub fn parse_uuid(value: &str) -> Option<Uuid> {
    if value.len() != HYPHENATED_LEN {
        return None;
    }

    let id = Uuid::try_parse(value).ok()?;
    let version_ok = (1..=5).contains(&id.get_version_num());

    (version_ok && id.get_variant() == Variant::RFC4122).then_some(id)
}

/// Whether `value` is an acceptable entity identifier
pub fn is_entity_id(value: &str) -> bool {
    parse_uuid(value).is_some()
}

/// Parse a path parameter such as `courseId`
pub fn parse_entity_id(field: &str, value: &str) -> Result<Uuid, SharedError> {
    parse_uuid(value)
        .ok_or_else(|| SharedError::validation(field, format!("{field} must be a valid UUID")))
}

/// Parse the id list of a reorder request.
///
/// The list must be a non-empty array of distinct UUID strings. Membership
/// against the parent's current children is checked later, inside the
/// transaction.
pub fn parse_id_list(field: &str, value: Option<&Value>) -> Result<Vec<Uuid>, SharedError> {
    let items = match value {
        Some(Value::Array(items)) if !items.is_empty() => items,
        _ => {
            return Err(SharedError::validation(
                field,
                format!("{field} must be a non-empty array"),
            ))
        }
    };

    let mut ids = Vec::with_capacity(items.len());
    for item in items {
        let text = match item {
            Value::String(text) if !text.is_empty() => text,
            _ => {
                return Err(SharedError::validation(
                    field,
                    format!("{field} must contain only strings"),
                ))
            }
        };
        let id = parse_uuid(text).ok_or_else(|| {
            SharedError::validation(field, format!("{field} must contain only valid UUIDs"))
        })?;
        ids.push(id);
    }

    let mut seen = HashSet::with_capacity(ids.len());
    if !ids.iter().all(|id| seen.insert(*id)) {
        return Err(SharedError::validation(field, format!("{field} must be unique")));
    }

    Ok(ids)
}

/// Read a required, trimmed string field from an untyped body
pub fn required_text(field: &str, payload: &Value) -> Result<String, SharedError> {
    let text = payload
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();

    if text.is_empty() {
        return Err(SharedError::validation(field, format!("{field} is required")));
    }

    Ok(text.to_string())
}
