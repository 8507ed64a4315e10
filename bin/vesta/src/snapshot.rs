//! Snapshot-backed collaborators.
//!
//! A snapshot is a TOML capture of a marketplace: per-layer registries, the
//! URLs the DHT would resolve for registered nodes, shard holders and
//! earnings. It lets the discovery engine run offline against known data.
//! Announcements add `node_url` to the holders of the announced shard and are
//! written back to the snapshot file.
//!
//! ```toml
//! node_url = "http://self.example:9000"
//!
//! [[registry.eth]]
//! node_id = "node-a"
//! address = "0xA"
//! min_ask_price = 10
//! remaining_storage = 1073741824
//! pledged_storage = 2147483648
//! url = "http://a.example:9000"
//!
//! [urls.eth]
//! node-b = "http://b.example:9000"
//!
//! [holders.shard-1]
//! eth = ["http://a.example:9000"]
//!
//! [earnings]
//! 0xB = "5000"
//! ```

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    str::FromStr,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use async_trait::async_trait;
use eyre::{Result, WrapErr};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use vesta_discovery::api::{
    DiscoveryError, DiscoveryResult, EarningsSource, HolderUrls, LayerClient, NodeId,
    PermissionLayer, PermissionLayerId, PermissionLayers, RawSpEntry, ResolvedUrls, ShardKey,
    U256, VersionData, WalletAddress,
};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct SnapshotFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    node_url: Option<String>,
    registry: HashMap<PermissionLayerId, Vec<RawSpEntry>>,
    urls: HashMap<PermissionLayerId, HashMap<NodeId, String>>,
    holders: HashMap<ShardKey, HolderUrls>,
    earnings: HashMap<WalletAddress, String>,
}

/// Marketplace snapshot acting as DHT client, layer factory and chain client.
#[derive(Debug)]
pub(crate) struct Snapshot {
    file: Mutex<SnapshotFile>,
    earnings: HashMap<WalletAddress, U256>,
    path: Option<PathBuf>,
    last_version: Arc<AtomicU64>,
}

impl Snapshot {
    /// Load a snapshot file. Announcements are written back to `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).wrap_err("failed to read snapshot")?;
        let mut snapshot = Self::parse(&raw)?;
        snapshot.path = Some(path.to_path_buf());
        Ok(snapshot)
    }

    /// Parse snapshot TOML. Announcements stay in memory.
    pub(crate) fn parse(raw: &str) -> Result<Self> {
        let file: SnapshotFile = toml::from_str(raw).wrap_err("invalid snapshot")?;

        let earnings = file
            .earnings
            .iter()
            .map(|(address, balance)| {
                U256::from_str(balance.trim())
                    .map(|balance| (address.clone(), balance))
                    .wrap_err_with(|| format!("invalid earnings for {address}"))
            })
            .collect::<Result<_>>()?;

        debug!(
            layers = file.registry.len(),
            shards = file.holders.len(),
            "loaded marketplace snapshot"
        );

        Ok(Self {
            file: Mutex::new(file),
            earnings,
            path: None,
            last_version: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Add `node_url` as a holder of `shard` on `layer`, returning the
    /// serialized snapshot.
    fn record_holder(&self, shard: &ShardKey, layer: PermissionLayerId) -> DiscoveryResult<String> {
        let mut file = self.file.lock();
        let url = file
            .node_url
            .clone()
            .ok_or_else(|| DiscoveryError::transport("snapshot has no node_url to announce"))?;

        let holders = file
            .holders
            .entry(shard.clone())
            .or_default()
            .entry(layer)
            .or_default();
        if !holders.contains(&url) {
            holders.push(url);
        }

        toml::to_string(&*file)
            .map_err(|e| DiscoveryError::transport(format!("failed to encode snapshot: {e}")))
    }
}

#[async_trait]
impl LayerClient for Snapshot {
    async fn query_holders(&self, keys: &[ShardKey], _timeout: Duration) -> DiscoveryResult<HolderUrls> {
        let file = self.file.lock();
        let mut merged = HolderUrls::new();
        for holders in keys.iter().filter_map(|key| file.holders.get(key)) {
            for (layer, urls) in holders {
                merged.entry(*layer).or_default().extend(urls.iter().cloned());
            }
        }
        Ok(merged)
    }

    async fn resolve_urls(
        &self,
        node_ids: &[NodeId],
        layer: PermissionLayerId,
        _timeout: Duration,
    ) -> DiscoveryResult<ResolvedUrls> {
        let file = self.file.lock();
        let Some(known) = file.urls.get(&layer) else {
            return Ok(ResolvedUrls::new());
        };
        Ok(node_ids
            .iter()
            .filter_map(|id| known.get(id).map(|url| (id.clone(), url.clone())))
            .collect())
    }

    async fn fetch_registry(&self, layer: PermissionLayerId) -> DiscoveryResult<Vec<RawSpEntry>> {
        Ok(self.file.lock().registry.get(&layer).cloned().unwrap_or_default())
    }

    async fn stored(&self, shard: &ShardKey, version: VersionData) -> DiscoveryResult<()> {
        let encoded = self.record_holder(shard, version.layer())?;

        if let Some(path) = &self.path {
            tokio::fs::write(path, encoded).await.map_err(|e| {
                DiscoveryError::transport(format!("failed to write {}: {e}", path.display()))
            })?;
        }

        info!(
            shard = %shard,
            layer = %version.layer(),
            version = ?version.payload(),
            "recorded stored announcement"
        );
        Ok(())
    }
}

impl PermissionLayers for Snapshot {
    type Layer = SnapshotLayer;

    fn layer(&self, id: &str) -> Option<Self::Layer> {
        let id = PermissionLayerId::from_str(id).ok()?;
        Some(SnapshotLayer {
            id,
            last_version: Arc::clone(&self.last_version),
        })
    }
}

#[async_trait]
impl EarningsSource for Snapshot {
    async fn earnings(&self, address: &WalletAddress) -> DiscoveryResult<U256> {
        self.earnings
            .get(address)
            .copied()
            .ok_or_else(|| DiscoveryError::chain(format!("no earnings recorded for {address}")))
    }
}

/// Layer handle whose version data is a strictly increasing millisecond stamp.
#[derive(Debug, Clone)]
pub(crate) struct SnapshotLayer {
    id: PermissionLayerId,
    last_version: Arc<AtomicU64>,
}

#[async_trait]
impl PermissionLayer for SnapshotLayer {
    fn id(&self) -> PermissionLayerId {
        self.id
    }

    async fn new_version_data(&self) -> DiscoveryResult<VersionData> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| DiscoveryError::VersionData {
                layer: self.id.to_string(),
                reason: e.to_string(),
            })?
            .as_millis() as u64;

        let previous = self
            .last_version
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or(now);
        let stamp = now.max(previous + 1);

        Ok(VersionData::new(self.id, stamp.to_be_bytes().to_vec()))
    }
}
