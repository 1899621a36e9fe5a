//! Course hierarchy records
//!
//! Wire shapes for courses, modules, lessons and blocks. Field names are
//! camelCase on the wire (`courseId`, `createdAt`, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::block::{BlockContent, BlockType};

/// Course without its modules
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub course_id: Uuid,
    pub title: String,
    pub language: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full course tree: modules, their lessons and the lessons' blocks
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(flatten)]
    pub summary: CourseSummary,
    pub modules: Vec<Module>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub module_id: Uuid,
    pub title: String,
    pub position: i64,
    pub lessons: Vec<Lesson>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub lesson_id: Uuid,
    pub title: String,
    pub position: i64,
    pub blocks: Vec<Block>,
}

/// A stored content block
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub block_id: Uuid,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    pub content: BlockContent,
    pub version: i64,
    pub position: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A child entry in a reorder response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderedChild {
    pub id: Uuid,
    pub title: String,
    pub position: i64,
}

/// Response of ReorderModules
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleOrder {
    pub course_id: Uuid,
    pub modules: Vec<ModuleEntry>,
}

/// Response of ReorderLessons
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonOrder {
    pub module_id: Uuid,
    pub lessons: Vec<LessonEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleEntry {
    pub module_id: Uuid,
    pub title: String,
    pub position: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonEntry {
    pub lesson_id: Uuid,
    pub title: String,
    pub position: i64,
}

impl From<OrderedChild> for ModuleEntry {
    fn from(child: OrderedChild) -> Self {
        Self {
            module_id: child.id,
            title: child.title,
            position: child.position,
        }
    }
}

impl From<OrderedChild> for LessonEntry {
    fn from(child: OrderedChild) -> Self {
        Self {
            lesson_id: child.id,
            title: child.title,
            position: child.position,
        }
    }
}

/// Response of ListBlocks and ReplaceBlocks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockList {
    pub blocks: Vec<Block>,
}
