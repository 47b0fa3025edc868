//! Connection manager: at most one live session, keyed by database name.
//!
//! [`ConnectionState`] is the only place a session handle lives, and
//! [`ConnectionManager::connect`] is its only mutator. Reuse is an
//! optimization: a handle is handed out only while it still targets the
//! requested database and reports itself open.

use std::fmt;

use pgstats_domain::{Result, StatsConfig, StatsError};
use tracing::{debug, info, warn};

use crate::ports::{DatabaseSession, SessionFactory};

/// Current target database and its session, if any.
///
/// Invariant: `live_connection` is `Some` iff `target_database` is `Some`,
/// and it was opened against exactly that database.
#[derive(Default)]
pub struct ConnectionState {
    target_database: Option<String>,
    live_connection: Option<Box<dyn DatabaseSession>>,
}

impl ConnectionState {
    pub fn target_database(&self) -> Option<&str> {
        self.target_database.as_deref()
    }

    /// Whether a usable session is held.
    pub fn is_live(&self) -> bool {
        self.live_connection.as_ref().is_some_and(|session| !session.is_closed())
    }

    fn is_live_for(&self, database: &str) -> bool {
        self.target_database.as_deref() == Some(database) && self.is_live()
    }

    fn establish(&mut self, database: &str, session: Box<dyn DatabaseSession>) {
        self.target_database = Some(database.to_string());
        self.live_connection = Some(session);
    }

    fn take(&mut self) -> Option<Box<dyn DatabaseSession>> {
        self.target_database = None;
        self.live_connection.take()
    }

    fn session_mut(&mut self) -> Option<&mut (dyn DatabaseSession + 'static)> {
        self.live_connection.as_deref_mut()
    }
}

impl fmt::Debug for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionState")
            .field("target_database", &self.target_database)
            .field("live", &self.is_live())
            .finish()
    }
}

/// Owns the single live session and reopens it when the target changes.
///
/// Not meant to be shared across threads: callers that collect in parallel
/// use one manager per execution context.
pub struct ConnectionManager<F> {
    factory: F,
    config: StatsConfig,
    state: ConnectionState,
}

impl<F: SessionFactory> ConnectionManager<F> {
    pub fn new(factory: F, config: StatsConfig) -> Self {
        Self { factory, config, state: ConnectionState::default() }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn config(&self) -> &StatsConfig {
        &self.config
    }

    /// Ensure a live session against `database`.
    ///
    /// No-op when the current session already targets `database` and is
    /// open. Otherwise the previous session (if any) is closed first, then a
    /// new one is opened with the configured host and credentials.
    ///
    /// # Errors
    /// Returns `StatsError::Connection` when the session cannot be opened; the
    /// manager is then left with no session at all.
    pub fn connect(&mut self, database: &str) -> Result<()> {
        if self.state.is_live_for(database) {
            return Ok(());
        }

        if let Some(previous) = self.state.take() {
            let previous_database = previous.database().to_string();
            match previous.close() {
                Ok(()) => debug!(database = %previous_database, "closed previous session"),
                Err(err) => warn!(
                    database = %previous_database,
                    error = %err,
                    "failed to close previous session cleanly"
                ),
            }
        }

        let params = self.config.connection_params(database);
        let session = self.factory.open(&params).map_err(|err| match err {
            StatsError::Connection(_) => err,
            other => StatsError::Connection(format!("{database}: {other}")),
        })?;

        info!(database, host = %params.host, port = params.port, "session opened");
        self.state.establish(database, session);
        Ok(())
    }

    /// Connect (if needed) and borrow the session for `database`.
    pub fn session_for(
        &mut self,
        database: &str,
    ) -> Result<&mut (dyn DatabaseSession + 'static)> {
        self.connect(database)?;
        self.state.session_mut().ok_or_else(|| {
            StatsError::Connection(format!("no live session for database '{database}'"))
        })
    }

    /// Close the current session, if any.
    pub fn disconnect(&mut self) -> Result<()> {
        match self.state.take() {
            Some(session) => session.close(),
            None => Ok(()),
        }
    }
}

impl<F> fmt::Debug for ConnectionManager<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("host", &self.config.host)
            .field("port", &self.config.port)
            .field("state", &self.state)
            .finish()
    }
}
