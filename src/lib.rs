//! Meal Finder Library
//!
//! A Rust library for searching TheMealDB recipe API and keeping a local list
//! of favorite meals. Searches cascade from name to area to category, partial
//! results are enriched with full details, and results are published through
//! observable state so any front end can render them.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod prelude;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};
