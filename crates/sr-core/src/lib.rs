//! sr-core: shared domain types, errors, configuration, and ranking.
//!
//! This crate is the foundational dependency for the other sr-* crates. It
//! holds the series/season/episode model, the unified error type, the
//! application configuration, title validation, and the pure season-ranking
//! algorithm.

pub mod config;
pub mod error;
pub mod model;
pub mod ranking;
pub mod validation;

// Re-export the most commonly used items at the crate root.
pub use error::{Error, Result};
pub use model::*;
