//! Content block types and payload normalization
//!
//! A lesson's blocks arrive as an untyped JSON array. Every entry is shaped
//! into a [`BlockDraft`] here: the type is checked against the closed set,
//! the content is normalized per type, and the client identifier is either
//! reused or replaced with a fresh one.
//!
//! Version bumps are decided by comparing normalized content, so the same
//! normalization is applied to stored rows when they are read back
//! (see [`BlockContent::normalize`]).
//!
//! # Content shapes
//!
//! | type      | content                                  |
//! |-----------|------------------------------------------|
//! | `text`    | `{ text }`                               |
//! | `heading` | `{ text, level }` with `level` in 1..=6  |
//! | `list`    | `{ items, style }`, style `bulleted`/`numbered` |

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::shared::error::SharedError;
use crate::shared::ids::parse_uuid;

/// Heading level used when the payload carries none, or a non-integer
pub const DEFAULT_HEADING_LEVEL: u8 = 2;
/// Smallest heading level
pub const MIN_HEADING_LEVEL: u8 = 1;
/// Largest heading level
pub const MAX_HEADING_LEVEL: u8 = 6;

/// The closed set of block kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    Text,
    Heading,
    List,
}

impl BlockType {
    /// All accepted block types, in display order
    pub const ALL: [BlockType; 3] = [BlockType::Text, BlockType::Heading, BlockType::List];

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Text => "text",
            BlockType::Heading => "heading",
            BlockType::List => "list",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockType {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockType::ALL
            .into_iter()
            .find(|block_type| block_type.as_str() == s)
            .ok_or_else(|| SharedError::validation("type", format!("unknown block type '{s}'")))
    }
}

/// Marker style of a list block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListStyle {
    #[default]
    Bulleted,
    Numbered,
}

/// Type-specific block content.
///
/// Serialized untagged so the wire and stored shape is the bare content
/// object; the block's `type` travels beside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BlockContent {
    Text { text: String },
    Heading { text: String, level: u8 },
    List { items: Vec<String>, style: ListStyle },
}

impl BlockContent {
    /// Normalize an untyped content object for the given block type.
    ///
    /// Missing or non-string text becomes `""`. Heading levels are clamped
    /// into 1..=6 and default to 2 when absent or not an integer; `null`,
    /// `false` and blank text read as 0 and so clamp to 1. List items are
    /// coerced to display strings with carriage returns removed, and the
    /// style is `numbered` only when spelled exactly so.
    pub fn normalize(block_type: BlockType, content: &Value) -> BlockContent {
        match block_type {
            BlockType::Text => BlockContent::Text {
                text: text_field(content),
            },
            BlockType::Heading => BlockContent::Heading {
                text: text_field(content),
                level: heading_level(content.get("level")),
            },
            BlockType::List => {
                let items = content
                    .get("items")
                    .and_then(Value::as_array)
                    .map(|items| items.iter().map(list_item).collect())
                    .unwrap_or_default();
                let style = match content.get("style").and_then(Value::as_str) {
                    Some("numbered") => ListStyle::Numbered,
                    _ => ListStyle::Bulleted,
                };
                BlockContent::List { items, style }
            }
        }
    }

    /// The block type this content belongs to
    pub fn block_type(&self) -> BlockType {
        match self {
            BlockContent::Text { .. } => BlockType::Text,
            BlockContent::Heading { .. } => BlockType::Heading,
            BlockContent::List { .. } => BlockType::List,
        }
    }

    /// Canonical JSON text, as written to the store
    pub fn to_json_string(&self) -> Result<String, SharedError> {
        Ok(serde_json::to_string(self)?)
    }
}

fn text_field(content: &Value) -> String {
    content
        .get("text")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Level from the raw `level` value. Anything that reads as an integer
/// number is clamped; absent or non-integer values get the default.
fn heading_level(raw: Option<&Value>) -> u8 {
    let Some(raw) = raw else {
        return DEFAULT_HEADING_LEVEL;
    };

    let number = numeric_value(raw);
    if number.is_finite() && number.fract() == 0.0 {
        number.clamp(MIN_HEADING_LEVEL as f64, MAX_HEADING_LEVEL as f64) as u8
    } else {
        DEFAULT_HEADING_LEVEL
    }
}

/// Numeric reading of a JSON value: null and `false` are 0, `true` is 1,
/// blank text is 0, other text must be a decimal, hex, octal or
/// binary literal, arrays read through their joined text, objects are NaN.
fn numeric_value(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(flag) => f64::from(u8::from(*flag)),
        Value::Number(number) => number.as_f64().unwrap_or(f64::NAN),
        Value::String(text) => numeric_text(text),
        Value::Array(_) => numeric_text(&display_text(value)),
        Value::Object(_) => f64::NAN,
    }
}

fn numeric_text(text: &str) -> f64 {
    let text = text.trim();
    if text.is_empty() {
        return 0.0;
    }

    let radix = match text.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return u64::from_str_radix(&text[2..], radix).map_or(f64::NAN, |n| n as f64);
    }

    // only plain decimal literals; rejects "inf", "nan" and the like
    let decimal = text
        .trim_start_matches(['+', '-'])
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    match text {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ if decimal => text.parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

/// Display text of a JSON value: whole numbers print without a fraction,
/// arrays join their items with `,` (null items empty), objects print as
/// `[object Object]`.
fn display_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::String(text) => text.clone(),
        Value::Number(number) => match (number.as_i64(), number.as_u64(), number.as_f64()) {
            (Some(n), _, _) => n.to_string(),
            (_, Some(n), _) => n.to_string(),
            // adding 0.0 turns -0.0 into 0.0
            (_, _, Some(f)) if f.fract() == 0.0 && f.abs() < 1e21 => format!("{:.0}", f + 0.0),
            (_, _, Some(f)) => f.to_string(),
            _ => number.to_string(),
        },
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => display_text(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn list_item(item: &Value) -> String {
    let text = match item {
        Value::Null => String::new(),
        other => display_text(other),
    };
    text.replace('\r', "")
}

/// One entry of a ReplaceBlocks request after normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDraft {
    /// Reused client id, or a freshly minted one
    pub block_id: Uuid,
    pub content: BlockContent,
}

impl BlockDraft {
    pub fn block_type(&self) -> BlockType {
        self.content.block_type()
    }
}

/// Shape a ReplaceBlocks body (`{ "blocks": [...] }`) into drafts.
///
/// The drafts keep request order; a draft's index is its target position.
pub fn parse_blocks(payload: &Value) -> Result<Vec<BlockDraft>, SharedError> {
    if !payload.is_object() {
        return Err(SharedError::validation(
            "body",
            "Request body must be an object",
        ));
    }

    let entries = payload
        .get("blocks")
        .and_then(Value::as_array)
        .ok_or_else(|| SharedError::validation("blocks", "blocks must be an array"))?;

    let mut seen = HashSet::with_capacity(entries.len());
    let mut drafts = Vec::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        let draft = parse_block(index, entry)?;
        if !seen.insert(draft.block_id) {
            return Err(SharedError::validation(
                "blocks",
                "Duplicate blockId detected in blocks payload",
            ));
        }
        drafts.push(draft);
    }

    Ok(drafts)
}

fn parse_block(index: usize, entry: &Value) -> Result<BlockDraft, SharedError> {
    let field = format!("blocks[{index}]");
    let raw = entry
        .as_object()
        .ok_or_else(|| SharedError::validation(&field, format!("{field} must be an object")))?;

    let block_type = raw
        .get("type")
        .and_then(Value::as_str)
        .and_then(|name| name.parse::<BlockType>().ok())
        .ok_or_else(|| {
            let allowed: Vec<&str> = BlockType::ALL.iter().map(BlockType::as_str).collect();
            SharedError::validation(
                format!("{field}.type"),
                format!("{field}.type must be one of {}", allowed.join(", ")),
            )
        })?;

    let block_id = raw
        .get("blockId")
        .and_then(Value::as_str)
        .and_then(parse_uuid)
        .unwrap_or_else(Uuid::new_v4);

    let content = raw
        .get("content")
        .filter(|content| content.is_object())
        .ok_or_else(|| {
            SharedError::validation(
                format!("{field}.content"),
                format!("{field}.content must be an object"),
            )
        })?;

    Ok(BlockDraft {
        block_id,
        content: BlockContent::normalize(block_type, content),
    })
}
