//! Mock session factory
//!
//! Records every open and close in order, can refuse to open selected
//! databases, and can sever or expire the most recently opened session.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use pgstats_core::{DatabaseSession, SessionFactory};
use pgstats_domain::{ConnectionParams, Result, Row, StatsError};

type Responder = dyn Fn(&str, &str, &[&str]) -> Result<Vec<Row>> + Send + Sync;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Opened(String),
    Closed(String),
}

#[derive(Default)]
struct SessionFlags {
    /// Queries fail as if the server dropped the socket mid-statement.
    severed: AtomicBool,
    /// The session reports itself closed.
    expired: AtomicBool,
}

/// In-memory `SessionFactory`.
#[derive(Clone)]
pub struct MockSessionFactory {
    events: Arc<Mutex<Vec<SessionEvent>>>,
    refused: Arc<Mutex<BTreeSet<String>>>,
    latest: Arc<Mutex<Option<Arc<SessionFlags>>>>,
    responder: Arc<Responder>,
}

impl MockSessionFactory {
    /// Factory whose sessions answer every statement with no rows.
    pub fn new() -> Self {
        Self::with_responder(|_, _, _| Ok(Vec::new()))
    }

    /// Factory whose sessions answer through `responder(database, sql, params)`.
    pub fn with_responder(
        responder: impl Fn(&str, &str, &[&str]) -> Result<Vec<Row>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            events: Arc::default(),
            refused: Arc::default(),
            latest: Arc::default(),
            responder: Arc::new(responder),
        }
    }

    /// Refuse to open sessions against `database`.
    pub fn refuse(&self, database: &str) {
        self.refused.lock().unwrap().insert(database.to_string());
    }

    pub fn events(&self) -> Vec<SessionEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn opens(&self) -> usize {
        self.events().iter().filter(|e| matches!(e, SessionEvent::Opened(_))).count()
    }

    pub fn closes(&self) -> usize {
        self.events().iter().filter(|e| matches!(e, SessionEvent::Closed(_))).count()
    }

    /// Make the latest session fail its next statements.
    pub fn sever_latest(&self) {
        if let Some(flags) = self.latest.lock().unwrap().as_ref() {
            flags.severed.store(true, Ordering::SeqCst);
        }
    }

    /// Make the latest session report itself closed.
    pub fn expire_latest(&self) {
        if let Some(flags) = self.latest.lock().unwrap().as_ref() {
            flags.expired.store(true, Ordering::SeqCst);
        }
    }
}

impl Default for MockSessionFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionFactory for MockSessionFactory {
    fn open(&self, params: &ConnectionParams) -> Result<Box<dyn DatabaseSession>> {
        if self.refused.lock().unwrap().contains(&params.database) {
            return Err(StatsError::Connection(format!(
                "FATAL: database \"{}\" does not exist",
                params.database
            )));
        }

        let flags = Arc::new(SessionFlags::default());
        *self.latest.lock().unwrap() = Some(Arc::clone(&flags));
        self.events.lock().unwrap().push(SessionEvent::Opened(params.database.clone()));

        Ok(Box::new(MockSession {
            database: params.database.clone(),
            flags,
            events: Arc::clone(&self.events),
            responder: Arc::clone(&self.responder),
        }))
    }
}

struct MockSession {
    database: String,
    flags: Arc<SessionFlags>,
    events: Arc<Mutex<Vec<SessionEvent>>>,
    responder: Arc<Responder>,
}

impl DatabaseSession for MockSession {
    fn database(&self) -> &str {
        &self.database
    }

    fn query(&mut self, sql: &str, params: &[&str]) -> Result<Vec<Row>> {
        if self.flags.severed.load(Ordering::SeqCst) {
            return Err(StatsError::Connection(
                "server closed the connection unexpectedly".to_string(),
            ));
        }
        (self.responder)(&self.database, sql, params)
    }

    fn is_closed(&self) -> bool {
        self.flags.expired.load(Ordering::SeqCst)
    }

    fn close(self: Box<Self>) -> Result<()> {
        self.events.lock().unwrap().push(SessionEvent::Closed(self.database.clone()));
        Ok(())
    }
}
