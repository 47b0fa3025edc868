//! Shared test helpers for `pgstats-core` integration tests.
//!
//! In-memory sessions and executors so that connection and handler tests can
//! focus on behaviour instead of a running server.

#![allow(dead_code)]

pub mod executor;
pub mod sessions;

pub use executor::{empty_executor, FnExecutor, QueryCall};
pub use sessions::{MockSessionFactory, SessionEvent};
