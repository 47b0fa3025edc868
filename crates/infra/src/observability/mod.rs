//! Observability infrastructure
//!
//! Structured logging for the host process. The collector itself only emits
//! `tracing` events; this module decides where they end up.

pub mod logging;

pub use logging::{init_logging, resolve, LogPlan, LogSettingsError, LogTarget, LoggingGuard};
