//! Named failure strategies for collaborator lookups.

use tracing::warn;
use vesta_discovery_api::DiscoveryResult;

/// How a failed collaborator lookup affects the surrounding operation.
///
/// Both strategies are in use and must stay distinct:
///
/// - Shard holder lookups ([`FailurePolicy::Degrade`]): discovery is
///   best-effort, a failure yields an empty answer and the caller owns retries.
/// - URL backfill during aggregation ([`FailurePolicy::Abort`]): address
///   resolution is required infrastructure, so the whole aggregation fails
///   rather than returning a partial roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum FailurePolicy {
    /// Log and substitute an empty result.
    Degrade,
    /// Log and propagate the error unchanged.
    Abort,
}

impl FailurePolicy {
    /// Policy for multi-layer shard holder lookups.
    pub const HOLDER_LOOKUP: Self = Self::Degrade;

    /// Policy for the URL backfill round of profile aggregation.
    pub const URL_BACKFILL: Self = Self::Abort;

    /// Apply this policy to the outcome of `operation`.
    pub fn apply<T: Default>(
        self,
        operation: &'static str,
        result: DiscoveryResult<T>,
    ) -> DiscoveryResult<T> {
        let error = match result {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        metrics::counter!(
            "discovery_lookup_failures_total",
            "operation" => operation,
            "policy" => self.to_string(),
        )
        .increment(1);
        warn!(operation, policy = %self, error = %error, "discovery lookup failed");

        match self {
            Self::Degrade => Ok(T::default()),
            Self::Abort => Err(error),
        }
    }
}
