//! PostgreSQL sessions backed by the blocking `postgres` client.

use pgstats_core::{DatabaseSession, SessionFactory};
use pgstats_domain::{ConnectionParams, FieldValue, Result, Row, StatsError};
use postgres::types::{ToSql, Type};
use postgres::{Client, Config, NoTls};
use tracing::{debug, trace};

use crate::errors::{map_postgres_error, Stage};

const DEFAULT_APPLICATION_NAME: &str = "pgstats";

/// Opens plain-TCP sessions with the configured credentials.
#[derive(Debug, Clone)]
pub struct PostgresSessionFactory {
    application_name: String,
}

impl PostgresSessionFactory {
    pub fn new() -> Self {
        Self { application_name: DEFAULT_APPLICATION_NAME.to_string() }
    }

    /// Name reported in `pg_stat_activity.application_name`.
    pub fn with_application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = name.into();
        self
    }

    fn client_config(&self, params: &ConnectionParams) -> Config {
        let mut config = Config::new();
        config
            .host(&params.host)
            .port(params.port)
            .user(&params.user)
            .dbname(&params.database)
            .application_name(&self.application_name);
        if let Some(password) = &params.password {
            config.password(password);
        }
        if let Some(timeout) = params.connect_timeout {
            config.connect_timeout(timeout);
        }
        config
    }
}

impl Default for PostgresSessionFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionFactory for PostgresSessionFactory {
    fn open(&self, params: &ConnectionParams) -> Result<Box<dyn DatabaseSession>> {
        debug!(host = %params.host, port = params.port, database = %params.database, "connecting");

        let client = self
            .client_config(params)
            .connect(NoTls)
            .map_err(|err| map_postgres_error(&err, Stage::Connect))?;

        Ok(Box::new(PostgresSession { database: params.database.clone(), client }))
    }
}

/// One client bound to one database.
pub struct PostgresSession {
    database: String,
    client: Client,
}

impl DatabaseSession for PostgresSession {
    fn database(&self) -> &str {
        &self.database
    }

    fn query(&mut self, sql: &str, params: &[&str]) -> Result<Vec<Row>> {
        let bound: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|param| param as &(dyn ToSql + Sync)).collect();

        let rows = self
            .client
            .query(sql, &bound)
            .map_err(|err| map_postgres_error(&err, Stage::Query))?;

        trace!(database = %self.database, rows = rows.len(), "rows fetched");
        rows.iter().map(decode_row).collect()
    }

    fn is_closed(&self) -> bool {
        self.client.is_closed()
    }

    fn close(self: Box<Self>) -> Result<()> {
        self.client.close().map_err(|err| map_postgres_error(&err, Stage::Query))
    }
}

impl std::fmt::Debug for PostgresSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresSession")
            .field("database", &self.database)
            .field("closed", &self.client.is_closed())
            .finish()
    }
}

/* -------------------------------------------------------------------------- */
/* Row decoding */
/* -------------------------------------------------------------------------- */

fn decode_row(row: &postgres::Row) -> Result<Row> {
    row.columns()
        .iter()
        .enumerate()
        .map(|(idx, column)| -> Result<(String, FieldValue)> {
            let value = decode_value(row, idx, column.type_()).map_err(|err| match err {
                StatsError::Query(message) => {
                    StatsError::Query(format!("column '{}': {message}", column.name()))
                }
                other => other,
            })?;
            Ok((column.name().to_string(), value))
        })
        .collect()
}

fn decode_value(row: &postgres::Row, idx: usize, ty: &Type) -> Result<FieldValue> {
    fn get<'a, T: postgres::types::FromSql<'a>>(
        row: &'a postgres::Row,
        idx: usize,
    ) -> Result<Option<T>> {
        row.try_get::<_, Option<T>>(idx).map_err(|err| map_postgres_error(&err, Stage::Query))
    }

    let value = match *ty {
        Type::BOOL => get::<bool>(row, idx)?.map(FieldValue::Bool),
        Type::CHAR => get::<i8>(row, idx)?.map(|v| FieldValue::Int(i64::from(v))),
        Type::INT2 => get::<i16>(row, idx)?.map(|v| FieldValue::Int(i64::from(v))),
        Type::INT4 => get::<i32>(row, idx)?.map(|v| FieldValue::Int(i64::from(v))),
        Type::INT8 => get::<i64>(row, idx)?.map(FieldValue::Int),
        Type::OID => get::<u32>(row, idx)?.map(|v| FieldValue::Int(i64::from(v))),
        Type::FLOAT4 => get::<f32>(row, idx)?.map(|v| FieldValue::Float(f64::from(v))),
        Type::FLOAT8 => get::<f64>(row, idx)?.map(FieldValue::Float),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
            get::<String>(row, idx)?.map(FieldValue::Text)
        }
        _ => {
            return Err(StatsError::Query(format!(
                "unsupported column type {}; cast it to bigint, float8 or text",
                ty.name()
            )))
        }
    };

    Ok(value.unwrap_or(FieldValue::Null))
}
