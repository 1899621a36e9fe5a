//! Courses Module
//!
//! Courses and the two titled levels below them (modules, lessons): create,
//! read the full tree, reorder and delete.

pub mod db;
pub mod handlers;

pub use handlers::*;
