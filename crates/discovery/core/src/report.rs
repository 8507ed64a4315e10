//! Marketplace report: ask price statistics and this node's standing.

use std::fmt;

use tracing::{debug, warn};
use vesta_discovery_api::{
    DiscoveryConfig, DiscoveryResult, EarningsSource, LayerClient, PermissionLayerId, U256,
    WalletAddress,
};

use crate::{Discovery, engine::bounded};

/// Ask price distribution of a roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceStats {
    /// Number of providers.
    pub count: usize,
    /// Lowest ask.
    pub min: u64,
    /// Element at index `count / 2` of the ascending asks.
    ///
    /// For an even count this is the upper of the two middle elements, not
    /// their mean.
    pub median: u64,
    /// Highest ask.
    pub max: u64,
}

impl PriceStats {
    /// Compute statistics over `asks`, `None` if there are none.
    pub fn from_asks(mut asks: Vec<u64>) -> Option<Self> {
        asks.sort_unstable();
        Self::from_sorted(&asks)
    }

    fn from_sorted(asks: &[u64]) -> Option<Self> {
        Some(Self {
            count: asks.len(),
            min: *asks.first()?,
            median: *asks.get(asks.len() / 2)?,
            max: *asks.last()?,
        })
    }
}

/// Outcome of the earnings lookup for this node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Earnings {
    /// Accumulated earnings in the layer's smallest unit.
    Available(U256),
    /// The chain lookup failed; the report is still valid.
    Unavailable(String),
}

/// This node's position in the marketplace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnStanding {
    /// No own address was supplied.
    NotRequested,
    /// The own address is not in the roster.
    NotRegistered {
        /// The address that was looked up.
        address: WalletAddress,
    },
    /// The own address is registered.
    Registered {
        /// The address that was looked up.
        address: WalletAddress,
        /// Own minimum ask price.
        ask: u64,
        /// 1-based rank by ask price; ties share the best rank.
        rank: usize,
        /// Earnings lookup outcome.
        earnings: Earnings,
    },
}

/// Marketplace summary of one permission layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketReport {
    /// No storage providers are registered on the layer.
    NoProviders {
        /// The layer that was inspected.
        layer: PermissionLayerId,
    },
    /// Price statistics and own standing.
    Market {
        /// The layer that was inspected.
        layer: PermissionLayerId,
        /// Ask price distribution.
        stats: PriceStats,
        /// This node's standing.
        own: OwnStanding,
    },
}

impl fmt::Display for MarketReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (layer, stats, own) = match self {
            Self::NoProviders { .. } => return writeln!(f, "There are no SP accounts registered"),
            Self::Market { layer, stats, own } => (layer, stats, own),
        };

        writeln!(f, "For {} In {} per Byte", layer.chain_name(), layer.price_unit())?;
        writeln!(f, "{} storage providers registered:", stats.count)?;
        writeln!(
            f,
            "min={} median={} max={}",
            layer.format_price_per_megabyte(stats.min),
            layer.format_price_per_megabyte(stats.median),
            layer.format_price_per_megabyte(stats.max),
        )?;

        match own {
            OwnStanding::NotRequested => Ok(()),
            OwnStanding::NotRegistered { .. } => {
                writeln!(f, "this SP is not in the registered list")
            }
            OwnStanding::Registered {
                ask,
                rank,
                earnings,
                ..
            } => {
                writeln!(
                    f,
                    "this SP={} (rank {rank} of {})",
                    layer.format_price_per_megabyte(*ask),
                    stats.count
                )?;
                match earnings {
                    Earnings::Available(balance) => {
                        writeln!(f, "this SP earnings={}", layer.format_amount(*balance))
                    }
                    Earnings::Unavailable(_) => writeln!(f, "Can't get earnings of this SP"),
                }
            }
        }
    }
}

impl<C, L, E, G> Discovery<C, L, E, G>
where
    C: LayerClient,
    E: EarningsSource,
    G: DiscoveryConfig,
{
    /// Summarize the configured report layer's marketplace.
    ///
    /// Fails only if the roster cannot be aggregated. An empty roster, an
    /// unregistered own address and a failed earnings lookup are all reported
    /// as successful outcomes.
    pub async fn report(&self, own_address: Option<&WalletAddress>) -> DiscoveryResult<MarketReport> {
        let layer = self.config.report_layer();
        let providers = self.sp_profiles(layer).await?;

        let mut asks = providers.ask_prices();
        asks.sort_unstable();
        let Some(stats) = PriceStats::from_sorted(&asks) else {
            debug!(%layer, "no storage providers registered");
            return Ok(MarketReport::NoProviders { layer });
        };

        let own = match own_address {
            None => OwnStanding::NotRequested,
            Some(address) => match providers.get_of_address(address) {
                None => OwnStanding::NotRegistered {
                    address: address.clone(),
                },
                Some(profile) => {
                    let ask = profile.min_ask_price();
                    let rank = asks.partition_point(|other| *other < ask) + 1;
                    let earnings = self.own_earnings(address).await;
                    OwnStanding::Registered {
                        address: address.clone(),
                        ask,
                        rank,
                        earnings,
                    }
                }
            },
        };

        Ok(MarketReport::Market { layer, stats, own })
    }

    async fn own_earnings(&self, address: &WalletAddress) -> Earnings {
        let result = bounded(
            "earnings",
            self.config.request_timeout(),
            self.earnings.earnings(address),
        )
        .await;

        match result {
            Ok(balance) => Earnings::Available(balance),
            Err(e) => {
                warn!(address = %address, error = %e, "cannot get earnings of this SP");
                Earnings::Unavailable(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{discovery_full, discovery_with};
    use assert_matches::assert_matches;
    use vesta_discovery_api::DiscoveryError;
    use vesta_discovery_test_utils::{MockEarnings, MockLayerClient, MockLayers, sp_entry};

    const ETH: PermissionLayerId = PermissionLayerId::Eth;

    fn client_with_asks(asks: &[(&str, u64)]) -> MockLayerClient {
        let client = MockLayerClient::new();
        client.set_registry(
            ETH,
            asks.iter()
                .enumerate()
                .map(|(i, (address, ask))| {
                    sp_entry(&format!("n{i}"), address, *ask, "http://sp.example")
                })
                .collect(),
        );
        client
    }

    #[test]
    fn test_median_takes_upper_middle_for_even_count() {
        let stats = PriceStats::from_asks(vec![40, 10, 30, 20]).unwrap();
        assert_eq!(
            stats,
            PriceStats {
                count: 4,
                min: 10,
                median: 30,
                max: 40
            }
        );
    }

    #[test]
    fn test_median_odd_count() {
        let stats = PriceStats::from_asks(vec![5, 1, 3]).unwrap();
        assert_eq!(stats.median, 3);
        assert_eq!(PriceStats::from_asks(vec![7]).unwrap().median, 7);
    }

    #[test]
    fn test_no_asks_no_stats() {
        assert_eq!(PriceStats::from_asks(Vec::new()), None);
    }

    #[tokio::test]
    async fn test_empty_roster_is_terminal_outcome() {
        let client = MockLayerClient::new();
        client.set_registry(ETH, Vec::new());
        let discovery = discovery_with(client);

        let report = discovery.report(Some(&"0xa".into())).await.unwrap();
        assert_eq!(report, MarketReport::NoProviders { layer: ETH });
        assert_eq!(report.to_string(), "There are no SP accounts registered\n");
    }

    #[tokio::test]
    async fn test_roster_of_only_unaddressable_sps_is_empty() {
        let client = MockLayerClient::new();
        client.set_registry(ETH, vec![sp_entry("n1", "0xa", 10, "bogus")]);
        let discovery = discovery_with(client);

        let report = discovery.report(None).await.unwrap();
        assert_matches!(report, MarketReport::NoProviders { .. });
    }

    #[tokio::test]
    async fn test_aggregation_failure_fails_report() {
        let client = MockLayerClient::new();
        client.fail_registry(DiscoveryError::transport("down"));
        let discovery = discovery_with(client);

        assert_eq!(
            discovery.report(None).await,
            Err(DiscoveryError::transport("down"))
        );
    }

    #[tokio::test]
    async fn test_report_without_own_address() {
        let client = client_with_asks(&[("0xa", 10), ("0xb", 20), ("0xc", 30), ("0xd", 40)]);
        let discovery = discovery_with(client);

        let report = discovery.report(None).await.unwrap();
        assert_matches!(
            report,
            MarketReport::Market {
                stats: PriceStats { count: 4, min: 10, median: 30, max: 40 },
                own: OwnStanding::NotRequested,
                ..
            }
        );
    }

    #[tokio::test]
    async fn test_own_address_not_registered() {
        let client = client_with_asks(&[("0xa", 10)]);
        let discovery = discovery_with(client);

        let report = discovery.report(Some(&"0xzz".into())).await.unwrap();
        assert_matches!(
            &report,
            MarketReport::Market { own: OwnStanding::NotRegistered { address }, .. }
                if address.as_str() == "0xzz"
        );
        assert!(report.to_string().ends_with("this SP is not in the registered list\n"));
    }

    #[tokio::test]
    async fn test_own_standing_with_earnings() {
        let client = client_with_asks(&[("0xa", 10), ("0xb", 20), ("0xc", 20), ("0xd", 40)]);
        let earnings = MockEarnings::new();
        earnings.set("0xc", U256::from(1_000u64));
        let discovery = discovery_full(client, MockLayers::new(), earnings);

        let report = discovery.report(Some(&"0xc".into())).await.unwrap();
        assert_matches!(
            &report,
            MarketReport::Market {
                own: OwnStanding::Registered { ask: 20, rank: 2, earnings: Earnings::Available(balance), .. },
                ..
            } if *balance == U256::from(1_000u64)
        );
        assert_eq!(
            report.to_string(),
            "For Ethereum In Wei per Byte\n\
             4 storage providers registered:\n\
             min=10485760 Wei/MByte median=20971520 Wei/MByte max=41943040 Wei/MByte\n\
             this SP=20971520 Wei/MByte (rank 2 of 4)\n\
             this SP earnings=1000 Wei\n"
        );
    }

    #[tokio::test]
    async fn test_earnings_failure_is_soft() {
        let client = client_with_asks(&[("0xa", 10), ("0xb", 20)]);
        let earnings = MockEarnings::new();
        earnings.fail(DiscoveryError::chain("rpc unavailable"));
        let discovery = discovery_full(client, MockLayers::new(), earnings);

        let report = discovery.report(Some(&"0xa".into())).await.unwrap();
        assert_matches!(
            &report,
            MarketReport::Market {
                stats: PriceStats { count: 2, .. },
                own: OwnStanding::Registered { rank: 1, earnings: Earnings::Unavailable(_), .. },
                ..
            }
        );
        assert!(report.to_string().ends_with("Can't get earnings of this SP\n"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_earnings_lookup_is_soft() {
        let client = client_with_asks(&[("0xa", 10), ("0xb", 20)]);
        let earnings = MockEarnings::new();
        earnings.hang();
        let discovery = discovery_full(client, MockLayers::new(), earnings);

        let report = discovery.report(Some(&"0xb".into())).await.unwrap();
        assert_matches!(
            &report,
            MarketReport::Market {
                own: OwnStanding::Registered { rank: 2, earnings: Earnings::Unavailable(reason), .. },
                ..
            } if reason.contains("earnings")
        );
    }
}
