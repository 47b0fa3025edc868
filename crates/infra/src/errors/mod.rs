//! Error conversions for infrastructure adapters

pub mod conversions;

pub use conversions::{map_postgres_error, Stage};
