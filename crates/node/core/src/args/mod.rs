//! CLI argument structs for process infrastructure.
//!
//! These args serve dual purposes:
//! - CLI parsing via clap (`#[derive(Args)]`)
//! - Configuration serialization via serde (`#[derive(Serialize, Deserialize)]`)

mod log;

pub use log::LogArgs;
