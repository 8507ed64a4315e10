//! Test utilities for discovery crates.
//!
//! In-memory implementations of the collaborator traits. Every mock is cheap
//! to clone and clones share state, so a test can keep a handle for setup and
//! assertions after handing one to the engine.
//!
//! - [`MockLayerClient`] - DHT client with scripted answers and call recording
//! - [`MockLayers`] - Permission layer factory with per-layer version data
//! - [`MockEarnings`] - Earnings lookup
//! - [`sp_entry`] - Registry entry builder

use std::{collections::HashMap, str::FromStr, sync::Arc, time::Duration};

use async_trait::async_trait;
use parking_lot::Mutex;
use vesta_discovery_api::{
    BYTES_PER_GIGABYTE, DiscoveryError, DiscoveryResult, EarningsSource, HolderUrls, LayerClient,
    NodeId, PermissionLayer, PermissionLayerId, PermissionLayers, RawSpEntry, ResolvedUrls,
    ShardKey, U256, VersionData, WalletAddress,
};

/// Build a registry entry with 10 GiB remaining and 20 GiB pledged.
pub fn sp_entry(node_id: &str, address: &str, min_ask_price: u64, url: &str) -> RawSpEntry {
    RawSpEntry {
        node_id: node_id.into(),
        address: address.into(),
        min_ask_price,
        remaining_storage: 10 * BYTES_PER_GIGABYTE,
        pledged_storage: 20 * BYTES_PER_GIGABYTE,
        url: url.to_owned(),
    }
}

/// A scripted failure mode for one mocked call.
#[derive(Debug, Clone, Default)]
enum Script {
    #[default]
    Answer,
    Fail(DiscoveryError),
    Hang,
}

impl Script {
    /// Resolve the script, never returning if it hangs.
    async fn run(self) -> DiscoveryResult<()> {
        match self {
            Self::Answer => Ok(()),
            Self::Fail(error) => Err(error),
            Self::Hang => std::future::pending().await,
        }
    }
}

/// Recorded `resolve_urls` call.
pub type ResolveCall = (Vec<NodeId>, PermissionLayerId, Duration);

#[derive(Debug, Default)]
struct ClientState {
    holders: HashMap<ShardKey, HolderUrls>,
    holder_script: Script,
    holder_queries: usize,

    registries: HashMap<PermissionLayerId, Vec<RawSpEntry>>,
    registry_script: Script,

    resolved: HashMap<(PermissionLayerId, NodeId), String>,
    resolve_script: Script,
    resolve_calls: Vec<ResolveCall>,

    stored: Vec<(ShardKey, VersionData)>,
    stored_script: Script,
}

/// In-memory DHT client.
///
/// Layers without a registry answer with an empty one; shards without
/// holders answer with no URLs.
#[derive(Debug, Clone, Default)]
pub struct MockLayerClient {
    state: Arc<Mutex<ClientState>>,
}

impl MockLayerClient {
    /// Create an empty client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-layer holders of `shard`.
    pub fn set_holders(&self, shard: &str, holders: HolderUrls) {
        self.state.lock().holders.insert(shard.into(), holders);
    }

    /// Make holder queries fail with `error`.
    pub fn fail_holder_queries(&self, error: DiscoveryError) {
        self.state.lock().holder_script = Script::Fail(error);
    }

    /// Make holder queries never complete.
    pub fn hang_holder_queries(&self) {
        self.state.lock().holder_script = Script::Hang;
    }

    /// Number of holder queries received.
    pub fn holder_queries(&self) -> usize {
        self.state.lock().holder_queries
    }

    /// Set the registry of `layer`.
    pub fn set_registry(&self, layer: PermissionLayerId, entries: Vec<RawSpEntry>) {
        self.state.lock().registries.insert(layer, entries);
    }

    /// Make registry fetches fail with `error`.
    pub fn fail_registry(&self, error: DiscoveryError) {
        self.state.lock().registry_script = Script::Fail(error);
    }

    /// Make registry fetches never complete.
    pub fn hang_registry(&self) {
        self.state.lock().registry_script = Script::Hang;
    }

    /// Set the URL `resolve_urls` returns for `node_id` on `layer`.
    pub fn set_resolved(&self, layer: PermissionLayerId, node_id: &str, url: &str) {
        self.state
            .lock()
            .resolved
            .insert((layer, node_id.into()), url.to_owned());
    }

    /// Make URL resolution fail with `error`.
    pub fn fail_resolve(&self, error: DiscoveryError) {
        self.state.lock().resolve_script = Script::Fail(error);
    }

    /// Make URL resolution never complete.
    pub fn hang_resolve(&self) {
        self.state.lock().resolve_script = Script::Hang;
    }

    /// Recorded `resolve_urls` calls, in order.
    pub fn resolve_calls(&self) -> Vec<ResolveCall> {
        self.state.lock().resolve_calls.clone()
    }

    /// Make announcements fail with `error`.
    pub fn fail_stored(&self, error: DiscoveryError) {
        self.state.lock().stored_script = Script::Fail(error);
    }

    /// Make announcements never complete.
    pub fn hang_stored(&self) {
        self.state.lock().stored_script = Script::Hang;
    }

    /// Announcements accepted so far, in order.
    pub fn stored_records(&self) -> Vec<(ShardKey, VersionData)> {
        self.state.lock().stored.clone()
    }
}

#[async_trait]
impl LayerClient for MockLayerClient {
    async fn query_holders(&self, keys: &[ShardKey], _timeout: Duration) -> DiscoveryResult<HolderUrls> {
        let script = {
            let mut state = self.state.lock();
            state.holder_queries += 1;
            state.holder_script.clone()
        };
        script.run().await?;

        let state = self.state.lock();
        let mut merged = HolderUrls::new();
        for holders in keys.iter().filter_map(|key| state.holders.get(key)) {
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
        timeout: Duration,
    ) -> DiscoveryResult<ResolvedUrls> {
        let script = {
            let mut state = self.state.lock();
            state.resolve_calls.push((node_ids.to_vec(), layer, timeout));
            state.resolve_script.clone()
        };
        script.run().await?;

        let state = self.state.lock();
        Ok(node_ids
            .iter()
            .filter_map(|id| {
                state
                    .resolved
                    .get(&(layer, id.clone()))
                    .map(|url| (id.clone(), url.clone()))
            })
            .collect())
    }

    async fn fetch_registry(&self, layer: PermissionLayerId) -> DiscoveryResult<Vec<RawSpEntry>> {
        let script = self.state.lock().registry_script.clone();
        script.run().await?;

        Ok(self
            .state
            .lock()
            .registries
            .get(&layer)
            .cloned()
            .unwrap_or_default())
    }

    async fn stored(&self, shard: &ShardKey, version: VersionData) -> DiscoveryResult<()> {
        let script = self.state.lock().stored_script.clone();
        script.run().await?;

        self.state.lock().stored.push((shard.clone(), version));
        Ok(())
    }
}

#[derive(Debug, Default)]
struct LayersState {
    failures: HashMap<PermissionLayerId, DiscoveryError>,
    issued: u64,
}

/// Permission layer factory recognizing every [`PermissionLayerId`].
#[derive(Debug, Clone, Default)]
pub struct MockLayers {
    state: Arc<Mutex<LayersState>>,
}

impl MockLayers {
    /// Create a factory whose layers always produce version data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `layer` fail to produce version data.
    pub fn fail_version_data(&self, layer: PermissionLayerId, error: DiscoveryError) {
        self.state.lock().failures.insert(layer, error);
    }
}

impl PermissionLayers for MockLayers {
    type Layer = MockLayer;

    fn layer(&self, id: &str) -> Option<Self::Layer> {
        let id = PermissionLayerId::from_str(id).ok()?;
        Some(MockLayer {
            id,
            state: Arc::clone(&self.state),
        })
    }
}

/// Layer handle issued by [`MockLayers`].
///
/// Version data payloads are a big-endian counter shared by all layers of the
/// factory, so every issued payload is distinct.
#[derive(Debug, Clone)]
pub struct MockLayer {
    id: PermissionLayerId,
    state: Arc<Mutex<LayersState>>,
}

#[async_trait]
impl PermissionLayer for MockLayer {
    fn id(&self) -> PermissionLayerId {
        self.id
    }

    async fn new_version_data(&self) -> DiscoveryResult<VersionData> {
        let mut state = self.state.lock();
        if let Some(error) = state.failures.get(&self.id) {
            return Err(error.clone());
        }
        state.issued += 1;
        Ok(VersionData::new(self.id, state.issued.to_be_bytes().to_vec()))
    }
}

#[derive(Debug, Default)]
struct EarningsState {
    balances: HashMap<WalletAddress, U256>,
    script: Script,
}

/// Earnings lookup; unknown addresses have zero earnings.
#[derive(Debug, Clone, Default)]
pub struct MockEarnings {
    state: Arc<Mutex<EarningsState>>,
}

impl MockEarnings {
    /// Create a source where everyone has zero earnings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the earnings of `address`.
    pub fn set(&self, address: &str, balance: U256) {
        self.state.lock().balances.insert(address.into(), balance);
    }

    /// Make every lookup fail with `error`.
    pub fn fail(&self, error: DiscoveryError) {
        self.state.lock().script = Script::Fail(error);
    }

    /// Make every lookup never complete.
    pub fn hang(&self) {
        self.state.lock().script = Script::Hang;
    }
}

#[async_trait]
impl EarningsSource for MockEarnings {
    async fn earnings(&self, address: &WalletAddress) -> DiscoveryResult<U256> {
        let script = self.state.lock().script.clone();
        script.run().await?;

        Ok(self
            .state
            .lock()
            .balances
            .get(address)
            .copied()
            .unwrap_or(U256::ZERO))
    }
}
