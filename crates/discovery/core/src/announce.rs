//! Announcing stored shards to a permission layer.

use tracing::{debug, trace};
use vesta_discovery_api::{
    DiscoveryConfig, DiscoveryError, DiscoveryResult, LayerClient, PermissionLayer,
    PermissionLayers, ShardKey,
};

use crate::{Discovery, engine::bounded};

impl<C, L, E, G> Discovery<C, L, E, G>
where
    C: LayerClient,
    L: PermissionLayers,
    G: DiscoveryConfig,
{
    /// Announce that this node stores `shard` on the layer named `layer_id`.
    ///
    /// Fails with [`DiscoveryError::UnknownLayer`] before touching the DHT if
    /// `layer_id` is not recognized. Version data and DHT errors are returned
    /// unchanged; nothing is retried.
    pub async fn announce(&self, shard: &ShardKey, layer_id: &str) -> DiscoveryResult<()> {
        trace!(shard = %shard, layer = layer_id, "announcing stored shard");

        let layer = self
            .layers
            .layer(layer_id)
            .ok_or_else(|| DiscoveryError::UnknownLayer(layer_id.to_owned()))?;

        let timeout = self.config.request_timeout();
        let version = bounded("new_version_data", timeout, layer.new_version_data()).await?;
        bounded("stored", timeout, self.client.stored(shard, version)).await?;

        metrics::counter!("discovery_announcements_total", "layer" => layer.id().to_string())
            .increment(1);
        debug!(shard = %shard, layer = %layer.id(), "announced stored shard");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{discovery_with, discovery_with_layers, with_counters};
    use assert_matches::assert_matches;
    use std::time::Duration;
    use vesta_discovery_api::PermissionLayerId;
    use vesta_discovery_test_utils::{MockLayerClient, MockLayers};

    #[tokio::test]
    async fn test_announce_writes_versioned_record() {
        let client = MockLayerClient::new();
        let discovery = discovery_with(client.clone());

        discovery.announce(&"shard-1".into(), "ETH").await.unwrap();

        let stored = client.stored_records();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].0, ShardKey::from("shard-1"));
        assert_eq!(stored[0].1.layer(), PermissionLayerId::Eth);
    }

    #[tokio::test]
    async fn test_version_data_is_fresh_per_announcement() {
        let client = MockLayerClient::new();
        let discovery = discovery_with(client.clone());

        discovery.announce(&"shard-1".into(), "neo").await.unwrap();
        discovery.announce(&"shard-1".into(), "neo").await.unwrap();

        let stored = client.stored_records();
        assert_eq!(stored.len(), 2);
        assert_ne!(stored[0].1, stored[1].1);
    }

    #[tokio::test]
    async fn test_unknown_layer_performs_no_write() {
        let client = MockLayerClient::new();
        let discovery = discovery_with(client.clone());

        let result = discovery.announce(&"shard-1".into(), "bitcoin").await;

        assert_eq!(result, Err(DiscoveryError::UnknownLayer("bitcoin".to_string())));
        assert_eq!(result.unwrap_err().to_string(), "invalid layer \"bitcoin\"");
        assert!(client.stored_records().is_empty());
    }

    #[tokio::test]
    async fn test_version_data_failure_is_propagated() {
        let client = MockLayerClient::new();
        let layers = MockLayers::new();
        let error = DiscoveryError::VersionData {
            layer: "eth".to_string(),
            reason: "chain client offline".to_string(),
        };
        layers.fail_version_data(PermissionLayerId::Eth, error.clone());
        let discovery = discovery_with_layers(client.clone(), layers);

        let result = discovery.announce(&"shard-1".into(), "eth").await;

        assert_eq!(result, Err(error));
        assert!(client.stored_records().is_empty());
    }

    #[tokio::test]
    async fn test_stored_failure_is_propagated() {
        let client = MockLayerClient::new();
        client.fail_stored(DiscoveryError::transport("put rejected"));
        let discovery = discovery_with(client);

        let result = discovery.announce(&"shard-1".into(), "eth").await;
        assert_eq!(result, Err(DiscoveryError::transport("put rejected")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_stored_times_out() {
        let client = MockLayerClient::new();
        client.hang_stored();
        let discovery = discovery_with(client.clone());

        let result = discovery.announce(&"shard-1".into(), "eth").await;
        assert_matches!(
            result,
            Err(DiscoveryError::Timeout { operation: "stored", after })
                if after == Duration::from_secs(10)
        );
        assert!(client.stored_records().is_empty());
    }

    #[test]
    fn test_announcements_counted_per_layer() {
        let discovery = discovery_with(MockLayerClient::new());

        let ((), counters) = with_counters(async {
            assert!(discovery.announce(&"shard-1".into(), "btc").await.is_err());
            discovery.announce(&"shard-1".into(), "eth").await.unwrap();
            discovery.announce(&"shard-2".into(), "eth").await.unwrap();
            discovery.announce(&"shard-1".into(), "neo").await.unwrap();
        });

        assert_eq!(counters.get("discovery_announcements_total", &[("layer", "eth")]), 2);
        assert_eq!(counters.get("discovery_announcements_total", &[("layer", "neo")]), 1);
    }
}
