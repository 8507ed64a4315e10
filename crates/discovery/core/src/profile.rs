//! Storage provider profiles and the roster built from them.

use std::collections::HashMap;

use vesta_discovery_api::{
    BYTES_PER_GIGABYTE, DiscoveryResult, NodeId, RawSpEntry, Urls, WalletAddress,
};

/// One storage provider's public marketplace record.
///
/// Built from a registry entry plus its URL; immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct SpProfile {
    node_id: NodeId,
    address: WalletAddress,
    min_ask_price: u64,
    available_gigabytes: f64,
    pledged_gigabytes: f64,
    urls: Urls,
}

impl SpProfile {
    /// Build a profile from a registry entry and the URL to use for it.
    ///
    /// Fails only if `url` does not validate.
    pub fn from_entry(entry: &RawSpEntry, url: &str) -> DiscoveryResult<Self> {
        let urls = Urls::parse(url)?;
        Ok(Self {
            node_id: entry.node_id.clone(),
            address: entry.address.clone(),
            min_ask_price: entry.min_ask_price,
            available_gigabytes: to_gigabytes(entry.remaining_storage),
            pledged_gigabytes: to_gigabytes(entry.pledged_storage),
            urls,
        })
    }

    /// DHT node id of the provider.
    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    /// Wallet address the provider is paid at.
    pub fn address(&self) -> &WalletAddress {
        &self.address
    }

    /// Minimum ask price in the layer's smallest unit per byte.
    pub fn min_ask_price(&self) -> u64 {
        self.min_ask_price
    }

    /// Remaining storage in gigabytes (2^30 bytes).
    pub fn available_gigabytes(&self) -> f64 {
        self.available_gigabytes
    }

    /// Pledged storage in gigabytes (2^30 bytes).
    pub fn pledged_gigabytes(&self) -> f64 {
        self.pledged_gigabytes
    }

    /// Validated download URLs.
    pub fn urls(&self) -> &Urls {
        &self.urls
    }
}

fn to_gigabytes(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_GIGABYTE as f64
}

/// Ordered roster of addressable storage providers, indexed by wallet address.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StorageProviders {
    profiles: Vec<SpProfile>,
    by_address: HashMap<WalletAddress, usize>,
}

impl StorageProviders {
    /// Create an empty roster with room for `capacity` profiles.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            profiles: Vec::with_capacity(capacity),
            by_address: HashMap::with_capacity(capacity),
        }
    }

    /// Add a profile, replacing in place any profile with the same address.
    ///
    /// Returns the replaced profile, if any.
    pub fn add(&mut self, profile: SpProfile) -> Option<SpProfile> {
        match self.by_address.get(profile.address()) {
            Some(&index) => self
                .profiles
                .get_mut(index)
                .map(|slot| std::mem::replace(slot, profile)),
            None => {
                self.by_address
                    .insert(profile.address().clone(), self.profiles.len());
                self.profiles.push(profile);
                None
            }
        }
    }

    /// Look up a profile by exact wallet address.
    pub fn get_of_address(&self, address: &WalletAddress) -> Option<&SpProfile> {
        self.by_address
            .get(address)
            .and_then(|&index| self.profiles.get(index))
    }

    /// Iterate profiles in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &SpProfile> {
        self.profiles.iter()
    }

    /// Number of profiles in the roster.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Whether the roster holds no profile.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Ask prices in roster order.
    pub fn ask_prices(&self) -> Vec<u64> {
        self.profiles.iter().map(SpProfile::min_ask_price).collect()
    }
}

impl<'a> IntoIterator for &'a StorageProviders {
    type Item = &'a SpProfile;
    type IntoIter = std::slice::Iter<'a, SpProfile>;

    fn into_iter(self) -> Self::IntoIter {
        self.profiles.iter()
    }
}

/// A registry entry left out of the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscardedEntry {
    /// Node id of the entry.
    pub node_id: NodeId,
    /// The URL that was tried, empty if none could be found.
    pub url: String,
    /// Why the entry was left out.
    pub reason: String,
}

/// Result of one aggregation pass: the roster and what was dropped from it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileAggregation {
    /// Addressable storage providers.
    pub providers: StorageProviders,
    /// Entries skipped because no valid URL could be obtained, or replaced
    /// by a later entry with the same address.
    pub discarded: Vec<DiscardedEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use vesta_discovery_test_utils::sp_entry;

    #[test]
    fn test_unit_scaling() {
        let mut entry = sp_entry("n1", "0xa", 5, "http://sp.example:9000");
        entry.remaining_storage = 1 << 30;
        entry.pledged_storage = 3 << 30;

        let profile = SpProfile::from_entry(&entry, &entry.url).unwrap();
        assert!((profile.available_gigabytes() - 1.0).abs() < f64::EPSILON);
        assert!((profile.pledged_gigabytes() - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fractional_gigabytes() {
        let mut entry = sp_entry("n1", "0xa", 5, "http://sp.example:9000");
        entry.remaining_storage = 1 << 29;
        entry.pledged_storage = 0;

        let profile = SpProfile::from_entry(&entry, &entry.url).unwrap();
        assert!((profile.available_gigabytes() - 0.5).abs() < f64::EPSILON);
        assert_eq!(profile.pledged_gigabytes(), 0.0);
    }

    #[test]
    fn test_fields_copied_verbatim() {
        let entry = sp_entry("node-7", "0xBEEF", 42, "https://sp7.example");
        let profile = SpProfile::from_entry(&entry, &entry.url).unwrap();
        assert_eq!(profile.node_id().as_str(), "node-7");
        assert_eq!(profile.address().as_str(), "0xBEEF");
        assert_eq!(profile.min_ask_price(), 42);
        assert_eq!(profile.urls().primary().as_str(), "https://sp7.example/");
    }

    #[test]
    fn test_invalid_url_rejected() {
        let entry = sp_entry("n1", "0xa", 5, "");
        assert!(SpProfile::from_entry(&entry, "not a url").is_err());
        assert!(SpProfile::from_entry(&entry, "").is_err());
    }

    #[test]
    fn test_roster_lookup_by_address() {
        let mut roster = StorageProviders::with_capacity(2);
        for (node, address, ask) in [("n1", "0xa", 10), ("n2", "0xb", 20)] {
            let entry = sp_entry(node, address, ask, "http://sp.example");
            roster.add(SpProfile::from_entry(&entry, &entry.url).unwrap());
        }

        assert_eq!(roster.len(), 2);
        assert_eq!(
            roster.get_of_address(&"0xb".into()).map(SpProfile::min_ask_price),
            Some(20)
        );
        assert!(roster.get_of_address(&"0xB".into()).is_none());
        assert_eq!(roster.ask_prices(), vec![10, 20]);
    }

    #[test]
    fn test_roster_replaces_same_address_in_place() {
        let mut roster = StorageProviders::default();
        let mut replaced = Vec::new();
        for (node, address, ask) in [("n1", "0xa", 10), ("n2", "0xb", 20), ("n3", "0xa", 30)] {
            let entry = sp_entry(node, address, ask, "http://sp.example");
            replaced.extend(roster.add(SpProfile::from_entry(&entry, &entry.url).unwrap()));
        }

        assert_eq!(replaced.len(), 1);
        assert_eq!(replaced[0].node_id().as_str(), "n1");

        assert_eq!(roster.len(), 2);
        assert_eq!(roster.ask_prices(), vec![30, 20]);
        assert_eq!(
            roster.get_of_address(&"0xa".into()).map(|p| p.node_id().as_str()),
            Some("n3")
        );
    }
}
