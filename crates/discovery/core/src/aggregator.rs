//! Building a layer's roster of storage provider profiles.

use tracing::{debug, trace};
use vesta_discovery_api::{
    DiscoveryConfig, DiscoveryResult, LayerClient, NodeId, PermissionLayerId, ResolvedUrls,
};

use crate::{
    DiscardedEntry, Discovery, FailurePolicy, ProfileAggregation, SpProfile, StorageProviders,
    engine::bounded,
};

impl<C, L, E, G> Discovery<C, L, E, G>
where
    C: LayerClient,
    G: DiscoveryConfig,
{
    /// Build the roster of addressable storage providers registered on `layer`.
    ///
    /// Entries without a URL are backfilled with one batched resolution call.
    /// A failed registry fetch or a failed backfill fails the whole call; no
    /// partial roster is returned. Entries whose URL does not validate are
    /// skipped and listed in [`ProfileAggregation::discarded`], as are entries
    /// replaced by a later entry with the same address.
    pub async fn aggregate_profiles(
        &self,
        layer: PermissionLayerId,
    ) -> DiscoveryResult<ProfileAggregation> {
        let entries = bounded(
            "fetch_registry",
            self.config.request_timeout(),
            self.client.fetch_registry(layer),
        )
        .await?;

        let missing: Vec<NodeId> = entries
            .iter()
            .filter(|entry| !entry.has_url())
            .map(|entry| entry.node_id.clone())
            .collect();

        let resolved = if missing.is_empty() {
            ResolvedUrls::default()
        } else {
            let timeout = self.config.url_resolve_timeout();
            debug!(%layer, count = missing.len(), "resolving missing sp urls");
            let result = bounded(
                "resolve_urls",
                timeout,
                self.client.resolve_urls(&missing, layer, timeout),
            )
            .await;
            FailurePolicy::URL_BACKFILL.apply("resolve_urls", result)?
        };

        let mut aggregation = ProfileAggregation {
            providers: StorageProviders::with_capacity(entries.len()),
            discarded: Vec::new(),
        };

        for entry in &entries {
            let url = if entry.has_url() {
                entry.url.as_str()
            } else {
                resolved.get(&entry.node_id).map_or("", String::as_str)
            };

            match SpProfile::from_entry(entry, url) {
                Ok(profile) => {
                    if let Some(replaced) = aggregation.providers.add(profile) {
                        trace!(%layer, node = %replaced.node_id(), "replacing sp with duplicate address");
                        aggregation.discarded.push(DiscardedEntry {
                            node_id: replaced.node_id().clone(),
                            url: replaced.urls().to_string(),
                            reason: format!(
                                "duplicate address {}, replaced by {}",
                                replaced.address(),
                                entry.node_id
                            ),
                        });
                    }
                }
                Err(e) => {
                    trace!(%layer, node = %entry.node_id, url, error = %e, "skipping sp without valid url");
                    aggregation.discarded.push(DiscardedEntry {
                        node_id: entry.node_id.clone(),
                        url: url.to_owned(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if !aggregation.discarded.is_empty() {
            metrics::counter!("discovery_profiles_discarded_total", "layer" => layer.to_string())
                .increment(aggregation.discarded.len() as u64);
        }
        debug!(
            %layer,
            registered = entries.len(),
            accepted = aggregation.providers.len(),
            discarded = aggregation.discarded.len(),
            "aggregated sp profiles"
        );

        Ok(aggregation)
    }

    /// Roster of `layer`, dropping the discard diagnostics.
    pub async fn sp_profiles(&self, layer: PermissionLayerId) -> DiscoveryResult<StorageProviders> {
        Ok(self.aggregate_profiles(layer).await?.providers)
    }
}
