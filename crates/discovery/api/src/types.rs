//! Core identifiers and registry records.

use alloy_primitives::U256;
use bytes::Bytes;
use derive_more::{Display, From};
use strum::{AsRefStr, EnumIter, EnumString, IntoStaticStr};

/// Bytes per gigabyte used when scaling raw storage counts (2^30).
pub const BYTES_PER_GIGABYTE: u64 = 1 << 30;

/// Bytes per megabyte used when quoting ask prices (2^20).
pub const BYTES_PER_MEGABYTE: u64 = 1 << 20;

/// Opaque key identifying a unit of stored data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ShardKey(String);

impl ShardKey {
    /// Create a shard key from any string-like value.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ShardKey {
    fn from(key: &str) -> Self {
        Self(key.to_owned())
    }
}

/// Opaque identifier of a storage provider, stable across layers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct NodeId(String);

impl NodeId {
    /// Create a node id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// Chain-specific wallet address, compared by exact string match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Create a wallet address from any string-like value.
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// The address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WalletAddress {
    fn from(address: &str) -> Self {
        Self(address.to_owned())
    }
}

/// Permission layer (sub-network of the DHT), one per blockchain backend.
///
/// Parsing is case-insensitive: `"ETH"`, `"eth"` and `"Eth"` all resolve to
/// [`PermissionLayerId::Eth`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    EnumString,
    EnumIter,
    AsRefStr,
    IntoStaticStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PermissionLayerId {
    /// Ethereum-permissioned layer.
    Eth,
    /// Neo-permissioned layer.
    Neo,
    /// Open layer with no blockchain permissioning.
    #[strum(serialize = "none")]
    #[cfg_attr(feature = "serde", serde(rename = "none"))]
    NonPermissioned,
}

impl PermissionLayerId {
    /// Human-readable chain name.
    pub fn chain_name(&self) -> &'static str {
        match self {
            Self::Eth => "Ethereum",
            Self::Neo => "Neo",
            Self::NonPermissioned => "Non-permissioned",
        }
    }

    /// Name of the smallest price unit on this layer.
    pub fn price_unit(&self) -> &'static str {
        match self {
            Self::Eth => "Wei",
            Self::Neo => "GAS fractions",
            Self::NonPermissioned => "units",
        }
    }

    /// Currency denominations of this layer as `(name, decimals)`, largest first.
    fn denominations(&self) -> &'static [(&'static str, u32)] {
        match self {
            Self::Eth => &[("ETH", 18), ("Gwei", 9), ("Wei", 0)],
            Self::Neo => &[("GAS", 8), ("datoshi", 0)],
            Self::NonPermissioned => &[("units", 0)],
        }
    }

    /// Render an amount of the smallest unit in the largest denomination it
    /// fills, e.g. `1500000000` wei as `1.5 Gwei`.
    pub fn format_amount(&self, amount: U256) -> String {
        let denominations = self.denominations();
        let (name, decimals) = denominations
            .iter()
            .copied()
            .find(|(_, decimals)| amount >= U256::from(10u64.pow(*decimals)))
            .or_else(|| denominations.last().copied())
            .unwrap_or(("", 0));

        let scale = U256::from(10u64.pow(decimals));
        let whole = amount / scale;
        let fraction = amount % scale;
        if fraction.is_zero() {
            return format!("{whole} {name}");
        }

        let digits = fraction.to_string();
        let padding = "0".repeat((decimals as usize).saturating_sub(digits.len()));
        let fraction = format!("{padding}{digits}");
        format!("{whole}.{} {name}", fraction.trim_end_matches('0'))
    }

    /// Render a per-byte ask price as a price per megabyte.
    pub fn format_price_per_megabyte(&self, ask_per_byte: u64) -> String {
        let per_megabyte = U256::from(ask_per_byte) * U256::from(BYTES_PER_MEGABYTE);
        format!("{}/MByte", self.format_amount(per_megabyte))
    }
}

/// A storage provider record as held in a layer registry.
///
/// The URL may be empty when the registry only knows the node id; it is then
/// backfilled through [`LayerClient::resolve_urls`](crate::LayerClient::resolve_urls).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawSpEntry {
    /// Node identifier.
    pub node_id: NodeId,
    /// Wallet address on the layer's chain.
    pub address: WalletAddress,
    /// Minimum ask price, smallest price unit per byte.
    pub min_ask_price: u64,
    /// Remaining storage in bytes.
    pub remaining_storage: u64,
    /// Pledged storage in bytes.
    pub pledged_storage: u64,
    /// Announced URL, empty if unknown.
    #[cfg_attr(feature = "serde", serde(default))]
    pub url: String,
}

impl RawSpEntry {
    /// Whether the registry already carries a URL for this entry.
    pub fn has_url(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

/// Opaque, layer-specific freshness proof attached to a "stored" announcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionData {
    layer: PermissionLayerId,
    payload: Bytes,
}

impl VersionData {
    /// Wrap a payload produced by `layer`.
    pub fn new(layer: PermissionLayerId, payload: impl Into<Bytes>) -> Self {
        Self {
            layer,
            payload: payload.into(),
        }
    }

    /// The layer that produced this version data.
    pub fn layer(&self) -> PermissionLayerId {
        self.layer
    }

    /// The raw payload.
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }
}
