//! # Todo Testkit
//!
//! Test utilities for the to-do pages service.
//!
//! This crate provides:
//! - Test fixtures with in-memory and temporary-directory notebooks
//! - Seeded notebook scenarios
//! - Property-based generators for item data and operation sequences
//! - A model-based runner for checking referential integrity
//!
//! ## Usage
//!
//! ```rust
//! use todo_testkit::prelude::*;
//!
//! with_notebook(|nb| {
//!     let page = nb.create_page().unwrap();
//!     assert!(nb.list_items_in_page(page.id).unwrap().is_empty());
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
