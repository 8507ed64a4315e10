//! Discovery configuration.

use std::time::Duration;

use crate::PermissionLayerId;

/// Default bound for the batched URL backfill.
pub const DEFAULT_URL_RESOLVE_TIMEOUT: Duration = Duration::from_secs(2);

/// Default bound for multi-layer shard holder lookups.
pub const DEFAULT_SHARD_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Default bound for collaborator calls without their own timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the discovery engine.
#[auto_impl::auto_impl(&, Arc)]
pub trait DiscoveryConfig: Send + Sync {
    /// Timeout for resolving missing URLs while aggregating profiles.
    fn url_resolve_timeout(&self) -> Duration {
        DEFAULT_URL_RESOLVE_TIMEOUT
    }

    /// Timeout for shard holder lookups.
    fn shard_lookup_timeout(&self) -> Duration {
        DEFAULT_SHARD_LOOKUP_TIMEOUT
    }

    /// Timeout for registry fetches, announcements, version data and earnings.
    fn request_timeout(&self) -> Duration {
        DEFAULT_REQUEST_TIMEOUT
    }

    /// Layer whose registry feeds the marketplace report.
    fn report_layer(&self) -> PermissionLayerId {
        PermissionLayerId::Eth
    }
}

/// Default configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDiscoveryConfig;

impl DiscoveryConfig for DefaultDiscoveryConfig {}
