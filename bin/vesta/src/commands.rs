//! Command implementations. Each returns the text to print on stdout.

use std::fmt::Write;

use eyre::{Result, eyre};
use vesta_discovery::{
    Discovery,
    api::{
        DiscoveryConfig, EarningsSource, LayerClient, PermissionLayerId, PermissionLayers,
        ShardKey, WalletAddress,
    },
};

/// Marketplace report for the configured layer.
pub(crate) async fn info<C, L, E, G>(
    discovery: &Discovery<C, L, E, G>,
    address: Option<String>,
) -> Result<String>
where
    C: LayerClient,
    E: EarningsSource,
    G: DiscoveryConfig,
{
    let address = address.map(WalletAddress::new);
    let report = discovery.report(address.as_ref()).await?;
    Ok(report.to_string())
}

/// Roster of `layer`, one provider per line, followed by discarded entries.
pub(crate) async fn profiles<C, L, E, G>(discovery: &Discovery<C, L, E, G>, layer: &str) -> Result<String>
where
    C: LayerClient,
    G: DiscoveryConfig,
{
    let layer: PermissionLayerId = layer
        .parse()
        .map_err(|_| eyre!("invalid layer {layer:?}"))?;
    let aggregation = discovery.aggregate_profiles(layer).await?;

    let mut out = String::new();
    for sp in &aggregation.providers {
        writeln!(
            out,
            "{} {} ask={} available={:.2}GB pledged={:.2}GB urls={}",
            sp.node_id(),
            sp.address(),
            sp.min_ask_price(),
            sp.available_gigabytes(),
            sp.pledged_gigabytes(),
            sp.urls(),
        )?;
    }
    for dropped in &aggregation.discarded {
        writeln!(out, "skipped {}: {}", dropped.node_id, dropped.reason)?;
    }
    Ok(out)
}

/// Merged download URLs of `shard`, one per line, sorted.
pub(crate) async fn urls<C, L, E, G>(discovery: &Discovery<C, L, E, G>, shard: String) -> String
where
    C: LayerClient,
    G: DiscoveryConfig,
{
    let mut urls = discovery.download_urls(&ShardKey::new(shard)).await;
    urls.sort();
    urls.into_iter().map(|url| url + "\n").collect()
}

/// Announce `shard` on `layer`.
pub(crate) async fn announce<C, L, E, G>(
    discovery: &Discovery<C, L, E, G>,
    shard: String,
    layer: &str,
) -> Result<String>
where
    C: LayerClient,
    L: PermissionLayers,
    G: DiscoveryConfig,
{
    let shard = ShardKey::new(shard);
    discovery.announce(&shard, layer).await?;
    Ok(format!("announced {shard} on {layer}\n"))
}
