//! Multi-layer storage provider discovery.
//!
//! The [`Discovery`] engine sits on top of a permission-layered DHT client and
//! turns raw per-layer answers into something a marketplace view can use:
//!
//! - [`Discovery::merged_download_urls`] - deduplicated holder URLs for a shard
//! - [`Discovery::aggregate_profiles`] - a layer's roster of addressable SPs
//! - [`Discovery::announce`] - version-stamped "stored" announcement
//! - [`Discovery::report`] - ask price statistics and this node's standing
//!
//! # Failure Policies
//!
//! Holder lookups and URL backfill fail differently on purpose, see
//! [`FailurePolicy`]. Shard lookups degrade to an empty answer; a failed
//! backfill aborts the aggregation.

#![warn(missing_docs)]

mod aggregator;
mod announce;
mod args;
mod engine;
mod merger;
mod policy;
mod profile;
mod report;

#[cfg(test)]
mod testing;

pub use args::DiscoveryArgs;
pub use engine::Discovery;
pub use merger::merge_holder_urls;
pub use policy::FailurePolicy;
pub use profile::{DiscardedEntry, ProfileAggregation, SpProfile, StorageProviders};
pub use report::{Earnings, MarketReport, OwnStanding, PriceStats};

pub use vesta_discovery_api as api;
