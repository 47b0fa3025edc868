//! Database implementations

pub mod postgres_session;

pub use postgres_session::{PostgresSession, PostgresSessionFactory};
