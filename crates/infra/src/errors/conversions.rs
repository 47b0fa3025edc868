//! Conversions from PostgreSQL driver errors into domain errors.

use pgstats_domain::StatsError;
use postgres::Error as PgError;

/// Point in a session's life at which the driver failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Opening the session: DNS, TCP, TLS negotiation, authentication.
    Connect,
    /// Running a statement or decoding its rows.
    Query,
}

/* -------------------------------------------------------------------------- */
/* postgres::Error → StatsError */
/* -------------------------------------------------------------------------- */

/// Map a driver error raised during `stage`.
///
/// Server-reported errors keep their SQLSTATE so that permission problems
/// (`42501`) and missing objects (`3D000`, `42P01`) stay recognizable.
pub fn map_postgres_error(err: &PgError, stage: Stage) -> StatsError {
    let message = match err.as_db_error() {
        Some(db) => with_sqlstate(db.message(), Some(db.code().code())),
        None if err.is_closed() => format!("connection closed: {err}"),
        None => err.to_string(),
    };

    match stage {
        Stage::Connect => StatsError::Connection(message),
        Stage::Query => StatsError::Query(message),
    }
}

fn with_sqlstate(message: &str, code: Option<&str>) -> String {
    match code {
        Some(code) => format!("{message} (SQLSTATE {code})"),
        None => message.to_string(),
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
