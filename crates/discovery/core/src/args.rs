//! Discovery CLI arguments.

use std::{str::FromStr, time::Duration};

use clap::Args;
use serde::{Deserialize, Serialize};
use vesta_discovery_api::{
    DEFAULT_REQUEST_TIMEOUT, DEFAULT_SHARD_LOOKUP_TIMEOUT, DEFAULT_URL_RESOLVE_TIMEOUT,
    DiscoveryConfig, PermissionLayerId,
};

/// Discovery configuration.
///
/// Bounds every collaborator call and selects the layer used for the
/// marketplace report.
#[derive(Debug, Args, Clone, Serialize, Deserialize)]
#[command(next_help_heading = "Discovery")]
#[serde(default)]
pub struct DiscoveryArgs {
    /// Timeout for resolving missing SP URLs, in milliseconds.
    #[arg(long = "discovery.url-timeout-ms", default_value_t = duration_ms(DEFAULT_URL_RESOLVE_TIMEOUT), value_name = "MS")]
    pub url_timeout_ms: u64,

    /// Timeout for shard holder lookups across all layers, in milliseconds.
    #[arg(long = "discovery.shard-timeout-ms", default_value_t = duration_ms(DEFAULT_SHARD_LOOKUP_TIMEOUT), value_name = "MS")]
    pub shard_timeout_ms: u64,

    /// Timeout for registry fetches, announcements and earnings, in milliseconds.
    #[arg(long = "discovery.request-timeout-ms", default_value_t = duration_ms(DEFAULT_REQUEST_TIMEOUT), value_name = "MS")]
    pub request_timeout_ms: u64,

    /// Permission layer whose registry feeds the marketplace report (eth, neo, none).
    #[arg(
        long = "discovery.report-layer",
        default_value_t = PermissionLayerId::Eth,
        value_parser = PermissionLayerId::from_str,
        value_name = "LAYER"
    )]
    pub report_layer: PermissionLayerId,
}

const fn duration_ms(duration: Duration) -> u64 {
    duration.as_millis() as u64
}

impl Default for DiscoveryArgs {
    fn default() -> Self {
        Self {
            url_timeout_ms: duration_ms(DEFAULT_URL_RESOLVE_TIMEOUT),
            shard_timeout_ms: duration_ms(DEFAULT_SHARD_LOOKUP_TIMEOUT),
            request_timeout_ms: duration_ms(DEFAULT_REQUEST_TIMEOUT),
            report_layer: PermissionLayerId::Eth,
        }
    }
}

impl DiscoveryConfig for DiscoveryArgs {
    fn url_resolve_timeout(&self) -> Duration {
        Duration::from_millis(self.url_timeout_ms)
    }

    fn shard_lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.shard_timeout_ms)
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    fn report_layer(&self) -> PermissionLayerId {
        self.report_layer
    }
}
