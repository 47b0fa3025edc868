//! Closure-backed `QueryExecutor`

use pgstats_core::QueryExecutor;
use pgstats_domain::{Result, Row};

/// One recorded `run_query` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryCall {
    pub database: String,
    pub sql: String,
    pub params: Vec<String>,
}

/// Answers statements with `respond(database, sql, params)` and records
/// every call.
pub struct FnExecutor<F> {
    respond: F,
    calls: Vec<QueryCall>,
}

impl<F> FnExecutor<F> {
    pub fn new(respond: F) -> Self
    where
        F: FnMut(&str, &str, &[&str]) -> Result<Vec<Row>>,
    {
        Self { respond, calls: Vec::new() }
    }

    pub fn calls(&self) -> &[QueryCall] {
        &self.calls
    }
}

/// Executor that answers every statement with no rows.
pub fn empty_executor() -> FnExecutor<impl FnMut(&str, &str, &[&str]) -> Result<Vec<Row>>> {
    FnExecutor::new(|_: &str, _: &str, _: &[&str]| Ok(Vec::new()))
}

impl<F> QueryExecutor for FnExecutor<F>
where
    F: FnMut(&str, &str, &[&str]) -> Result<Vec<Row>>,
{
    fn run_query(&mut self, database: &str, sql: &str, params: &[&str]) -> Result<Vec<Row>> {
        self.calls.push(QueryCall {
            database: database.to_string(),
            sql: sql.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
        });
        (self.respond)(database, sql, params)
    }
}
