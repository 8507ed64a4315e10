//! Process infrastructure for the vesta binary.
//!
//! - [`args`] - CLI argument structs for infrastructure configuration
//! - [`config`] - Figment-based configuration loading
//! - [`logging`] - Logging initialization
//! - [`metrics`] - Prometheus recorder installation
//!
//! Discovery semantics live in `vesta-discovery`; this crate only wires
//! process-level concerns around it.

pub mod args;
pub mod config;
pub mod logging;
pub mod metrics;

/// Crate version, as reported by `--version` and the startup log line.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
