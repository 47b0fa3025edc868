//! # pgstats Domain
//!
//! Domain types and models for pgstats.
//!
//! This crate contains:
//! - Metric value and result types (gauges, counters, per-table maps)
//! - Raw query row types returned by the database boundary
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other pgstats crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
