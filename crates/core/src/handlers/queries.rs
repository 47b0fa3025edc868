//! SQL text behind each metric.
//!
//! Every statement is a read-only `SELECT`. Database and table names are
//! bound as `$1`; nothing is interpolated into the text.

/// Per-table statistics function applied to every visible user table.
macro_rules! visible_table_stat {
    ($function:literal) => {
        concat!(
            "SELECT c.relname, ",
            $function,
            "(c.oid) FROM pg_catalog.pg_class c \
             LEFT JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace \
             WHERE c.relkind IN ('r','') AND n.nspname NOT IN ('pg_catalog', 'pg_toast') \
             AND pg_catalog.pg_table_is_visible(c.oid)"
        )
    };
}

/// One column of `pg_stat_user_tables` joined with its I/O counters.
macro_rules! user_table_stat {
    ($column:literal) => {
        concat!(
            "SELECT stat.relname AS relname, ",
            $column,
            " FROM pg_stat_user_tables stat \
             RIGHT JOIN pg_statio_user_tables statio ON stat.relid = statio.relid"
        )
    };
}

/// Database-wide statistics function for the database named by `$1`.
macro_rules! database_stat {
    ($function:literal) => {
        concat!("SELECT ", $function, "(oid) FROM pg_database WHERE datname = $1")
    };
}

/* -------------------------------------------------------------------------- */
/* Catalog listings */
/* -------------------------------------------------------------------------- */

pub const LIST_DATABASES: &str = r#"
    SELECT pg_database.datname AS "Database", pg_user.usename AS "Owner"
    FROM pg_database, pg_user
    WHERE pg_database.datdba = pg_user.usesysid
    UNION
    SELECT pg_database.datname AS "Database", NULL AS "Owner"
    FROM pg_database
    WHERE pg_database.datdba NOT IN (SELECT usesysid FROM pg_user)
    ORDER BY "Database"
"#;

pub const LIST_TABLES: &str = "
    SELECT c.relname FROM pg_catalog.pg_class c
    LEFT JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
    WHERE c.relkind IN ('r','') AND n.nspname NOT IN ('pg_catalog', 'pg_toast')
    AND pg_catalog.pg_table_is_visible(c.oid)
";

/* -------------------------------------------------------------------------- */
/* Table gauges */
/* -------------------------------------------------------------------------- */

/// Size expression evaluated for every visible user table.
macro_rules! visible_table_size {
    ($size:literal) => {
        concat!(
            "SELECT c.relname::text AS table_name, ",
            $size,
            "::bigint AS size FROM pg_catalog.pg_class c \
             LEFT JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace \
             WHERE c.relkind IN ('r','') AND n.nspname NOT IN ('pg_catalog', 'pg_toast') \
             AND pg_catalog.pg_table_is_visible(c.oid)"
        )
    };
}

pub const TABLE_SIZES: &str = visible_table_size!("pg_relation_size(c.oid)");

/// Indexes and TOAST: everything the table owns beyond its main fork.
pub const INDEX_SIZES: &str =
    visible_table_size!("(pg_total_relation_size(c.oid) - pg_relation_size(c.oid))");

/// Planner statistics for one table, resolved from its name in `$1`.
pub const TABLE_PLANNER_STATS: &str = "
    SELECT c.reltuples::float8 AS reltuples, c.relpages::bigint AS relpages,
        pg_relation_size(c.oid) AS relation_size
    FROM pg_catalog.pg_class c
    WHERE c.oid = quote_ident($1)::regclass
";

pub const DEAD_TUPLES: &str = visible_table_stat!("pg_stat_get_dead_tuples");

pub const LAST_AUTOVACUUM: &str = "
    SELECT current_database() AS datname, nspname AS sname, relname AS tname,
        (CASE WHEN v IS NULL THEN -1 ELSE round(extract(epoch FROM now() - v)) END)::bigint AS ltime
    FROM (
        SELECT nspname, relname, pg_stat_get_last_autovacuum_time(c.oid) AS v
        FROM pg_class c, pg_namespace n
        WHERE relkind = 'r'
        AND n.oid = c.relnamespace
        AND n.nspname <> 'information_schema'
        AND n.nspname = 'public'
        ORDER BY 3
    ) AS foo
";

/* -------------------------------------------------------------------------- */
/* Table counters */
/* -------------------------------------------------------------------------- */

pub const TUPLES_INSERTED: &str = visible_table_stat!("pg_stat_get_tuples_inserted");
pub const TUPLES_UPDATED: &str = visible_table_stat!("pg_stat_get_tuples_updated");
pub const TUPLES_DELETED: &str = visible_table_stat!("pg_stat_get_tuples_deleted");
pub const TUPLES_HOT_UPDATED: &str = visible_table_stat!("pg_stat_get_tuples_hot_updated");
pub const TUPLES_RETURNED: &str = visible_table_stat!("pg_stat_get_tuples_returned");
pub const TUPLES_FETCHED: &str = visible_table_stat!("pg_stat_get_tuples_fetched");

pub const SEQ_SCANS: &str = user_table_stat!("seq_scan");
pub const SEQ_TUPLES_READ: &str = user_table_stat!("seq_tup_read");
pub const INDEX_SCANS: &str = user_table_stat!("idx_scan");
pub const INDEX_TUPLES_FETCHED: &str = user_table_stat!("idx_tup_fetch");
pub const HEAP_BLOCKS_READ: &str = user_table_stat!("heap_blks_read");
pub const HEAP_BLOCKS_HIT: &str = user_table_stat!("heap_blks_hit");
pub const INDEX_BLOCKS_READ: &str = user_table_stat!("idx_blks_read");
pub const INDEX_BLOCKS_HIT: &str = user_table_stat!("idx_blks_hit");

/* -------------------------------------------------------------------------- */
/* Database-scoped */
/* -------------------------------------------------------------------------- */

pub const CONNECTIONS_PER_DATABASE: &str =
    "SELECT datname, count(*) FROM pg_stat_activity GROUP BY datname";

pub const LOCKS: &str = "
    SELECT pid, virtualxid, datname, relname, locktype, mode
    FROM pg_locks l
    LEFT JOIN pg_database d ON (d.oid = l.database)
    LEFT JOIN pg_class c ON (c.oid = l.relation)
    WHERE datname = $1 AND NOT relname ~ 'pg_'
";

pub const DB_BLOCKS_FETCHED: &str = database_stat!("pg_stat_get_db_blocks_fetched");
pub const DB_BLOCKS_HIT: &str = database_stat!("pg_stat_get_db_blocks_hit");
pub const DB_COMMITS: &str = database_stat!("pg_stat_get_db_xact_commit");
pub const DB_ROLLBACKS: &str = database_stat!("pg_stat_get_db_xact_rollback");
pub const DB_TUPLES_INSERTED: &str = database_stat!("pg_stat_get_db_tuples_inserted");
pub const DB_TUPLES_UPDATED: &str = database_stat!("pg_stat_get_db_tuples_updated");
pub const DB_TUPLES_DELETED: &str = database_stat!("pg_stat_get_db_tuples_deleted");
