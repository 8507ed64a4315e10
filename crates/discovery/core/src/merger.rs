//! Merging shard holder URLs across permission layers.

use std::{collections::HashSet, time::Duration};

use tracing::debug;
use vesta_discovery_api::{DiscoveryConfig, HolderUrls, LayerClient, ShardKey};

use crate::{Discovery, FailurePolicy, engine::bounded};

/// Collapse per-layer holder URLs into one set. Order is unspecified.
pub fn merge_holder_urls(holders: HolderUrls) -> Vec<String> {
    holders
        .into_values()
        .flatten()
        .collect::<HashSet<_>>()
        .into_iter()
        .collect()
}

impl<C, L, E, G> Discovery<C, L, E, G>
where
    C: LayerClient,
    G: DiscoveryConfig,
{
    /// Download URLs of every node holding `shard`, on any layer.
    ///
    /// Uses one multi-layer query bounded by `timeout`. Errors are not
    /// propagated: a failed lookup yields an empty list and retrying is left
    /// to the caller.
    pub async fn merged_download_urls(&self, shard: &ShardKey, timeout: Duration) -> Vec<String> {
        let keys = std::slice::from_ref(shard);
        let result = bounded(
            "query_holders",
            timeout,
            self.client.query_holders(keys, timeout),
        )
        .await;

        let holders = FailurePolicy::HOLDER_LOOKUP
            .apply("query_holders", result)
            .unwrap_or_default();
        let urls = merge_holder_urls(holders);

        metrics::counter!("discovery_merged_urls_total").increment(urls.len() as u64);
        debug!(shard = %shard, count = urls.len(), urls = ?urls, "merged download urls");
        urls
    }

    /// [`merged_download_urls`](Self::merged_download_urls) with the
    /// configured shard lookup timeout.
    pub async fn download_urls(&self, shard: &ShardKey) -> Vec<String> {
        self.merged_download_urls(shard, self.config.shard_lookup_timeout())
            .await
    }
}
