//! Domain constants
//!
//! Centralized location for the fixed values shared by the catalog, the
//! connection layer and configuration defaults.

// Connection defaults
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 5432;
pub const DEFAULT_USER: &str = "postgres";

/// Database used for cluster-wide queries (database listing, connection
/// counts).
pub const MAINTENANCE_DATABASE: &str = "postgres";

/// Page size assumed by the row estimate, matching a default PostgreSQL build.
pub const PAGE_SIZE_BYTES: f64 = 8192.0;

// Logging defaults
pub const DEFAULT_LOG_LEVEL: &str = "INFO";
