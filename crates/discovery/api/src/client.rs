//! Collaborator traits: the DHT layer client and the earnings source.

use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;

use crate::{
    DiscoveryResult, NodeId, PermissionLayerId, RawSpEntry, ShardKey, U256, VersionData,
    WalletAddress,
};

/// URLs of holders, per layer, as reported by the DHT.
pub type HolderUrls = HashMap<PermissionLayerId, Vec<String>>;

/// URLs resolved for node ids.
pub type ResolvedUrls = HashMap<NodeId, String>;

/// Client of the permission-layered DHT.
///
/// A single long-lived handle is created by the composition root and shared
/// by all discovery components. Implementations fan out internally; every
/// method either carries an explicit timeout or is bounded by the caller.
///
/// # Thread Safety
///
/// Implementations must be thread-safe (Send + Sync). Methods take `&self`
/// and callers never mutate the handle.
#[async_trait]
#[auto_impl::auto_impl(&, Arc)]
pub trait LayerClient: Send + Sync {
    /// Find the URLs of nodes holding any of `keys`, across all layers.
    ///
    /// Layers that do not answer within `timeout` contribute nothing.
    async fn query_holders(&self, keys: &[ShardKey], timeout: Duration)
    -> DiscoveryResult<HolderUrls>;

    /// Resolve node ids to URLs on `layer`.
    ///
    /// Node ids that could not be resolved are absent from the result.
    async fn resolve_urls(
        &self,
        node_ids: &[NodeId],
        layer: PermissionLayerId,
        timeout: Duration,
    ) -> DiscoveryResult<ResolvedUrls>;

    /// Fetch the storage provider registry of `layer`.
    async fn fetch_registry(&self, layer: PermissionLayerId) -> DiscoveryResult<Vec<RawSpEntry>>;

    /// Announce that this node stores `shard`, stamped with `version`.
    async fn stored(&self, shard: &ShardKey, version: VersionData) -> DiscoveryResult<()>;
}

/// Blockchain lookup of a storage provider's earnings.
#[async_trait]
#[auto_impl::auto_impl(&, Arc)]
pub trait EarningsSource: Send + Sync {
    /// Accumulated earnings of `address`, in the chain's smallest unit.
    async fn earnings(&self, address: &WalletAddress) -> DiscoveryResult<U256>;
}
