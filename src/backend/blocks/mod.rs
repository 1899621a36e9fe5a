//! Blocks Module
//!
//! A lesson's content blocks are replaced wholesale: the client submits the
//! full ordered list, [`reconcile`] diffs it against what is stored, and
//! [`db::replace_blocks`] applies the diff in one transaction.
//!
//! A block's `version` counts content changes only. It is informational and
//! is not checked on write, so concurrent replacements of one lesson are
//! last-committed-wins.

pub mod db;
pub mod handlers;
pub mod reconcile;

pub use handlers::*;
pub use reconcile::{plan_reconciliation, ReconcilePlan, StoredBlock};
