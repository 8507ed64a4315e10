//! The discovery engine and its collaborators.

use std::{future::Future, sync::Arc, time::Duration};

use vesta_discovery_api::{DefaultDiscoveryConfig, DiscoveryError, DiscoveryResult};

/// Discovery engine over a shared DHT client handle.
///
/// # Type Parameters
///
/// - `C`: DHT client ([`LayerClient`](vesta_discovery_api::LayerClient))
/// - `L`: Permission layer factory ([`PermissionLayers`](vesta_discovery_api::PermissionLayers))
/// - `E`: Earnings lookup ([`EarningsSource`](vesta_discovery_api::EarningsSource))
/// - `G`: Configuration ([`DiscoveryConfig`](vesta_discovery_api::DiscoveryConfig))
///
/// Collaborators are held behind `Arc` and never mutated, so one engine can be
/// cloned into concurrent tasks freely.
///
/// # Examples
///
/// ```ignore
/// let discovery = Discovery::new(client, layers, chain);
/// let urls = discovery.download_urls(&"shard-1".into()).await;
/// let report = discovery.report(Some(&own_address)).await?;
/// println!("{report}");
/// ```
#[derive(Debug)]
pub struct Discovery<C, L, E, G = DefaultDiscoveryConfig> {
    pub(crate) client: Arc<C>,
    pub(crate) layers: Arc<L>,
    pub(crate) earnings: Arc<E>,
    pub(crate) config: G,
}

impl<C, L, E> Discovery<C, L, E, DefaultDiscoveryConfig> {
    /// Create an engine with default timeouts.
    pub fn new(client: C, layers: L, earnings: E) -> Self {
        Self::from_arcs(Arc::new(client), Arc::new(layers), Arc::new(earnings))
    }

    /// Create an engine from already shared collaborators.
    pub fn from_arcs(client: Arc<C>, layers: Arc<L>, earnings: Arc<E>) -> Self {
        Self {
            client,
            layers,
            earnings,
            config: DefaultDiscoveryConfig,
        }
    }
}

impl<C, L, E, G> Discovery<C, L, E, G> {
    /// Replace the configuration.
    pub fn with_config<G2>(self, config: G2) -> Discovery<C, L, E, G2> {
        Discovery {
            client: self.client,
            layers: self.layers,
            earnings: self.earnings,
            config,
        }
    }

    /// The DHT client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// The configuration.
    pub fn config(&self) -> &G {
        &self.config
    }
}

impl<C, L, E, G: Clone> Clone for Discovery<C, L, E, G> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            layers: Arc::clone(&self.layers),
            earnings: Arc::clone(&self.earnings),
            config: self.config.clone(),
        }
    }
}

/// Await `fut`, failing with [`DiscoveryError::Timeout`] once `after` elapses.
pub(crate) async fn bounded<T>(
    operation: &'static str,
    after: Duration,
    fut: impl Future<Output = DiscoveryResult<T>>,
) -> DiscoveryResult<T> {
    tokio::time::timeout(after, fut)
        .await
        .unwrap_or(Err(DiscoveryError::Timeout { operation, after }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[tokio::test(start_paused = true)]
    async fn test_bounded_times_out() {
        let result: DiscoveryResult<()> = bounded(
            "never",
            Duration::from_millis(50),
            std::future::pending(),
        )
        .await;
        assert_matches!(
            result,
            Err(DiscoveryError::Timeout { operation: "never", .. })
        );
    }

    #[tokio::test]
    async fn test_bounded_passes_through() {
        let ok = bounded("ok", Duration::from_secs(1), async { Ok(7) }).await;
        assert_eq!(ok, Ok(7));

        let err: DiscoveryResult<u8> = bounded("err", Duration::from_secs(1), async {
            Err(DiscoveryError::transport("boom"))
        })
        .await;
        assert_eq!(err, Err(DiscoveryError::transport("boom")));
    }
}
