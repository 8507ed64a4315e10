//! Prometheus metrics recorder.

use eyre::Result;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use metrics_util::layers::{PrefixLayer, Stack};

/// Prefix applied to every metric name.
pub const METRICS_PREFIX: &str = "vesta";

/// Install a prometheus recorder as the global metrics recorder.
///
/// The returned handle renders the current values in the text exposition
/// format. Fails if a global recorder is already installed.
pub fn install_recorder(prefix: &str) -> Result<PrometheusHandle> {
    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();

    Stack::new(recorder)
        .push(PrefixLayer::new(prefix))
        .install()
        .map_err(|e| eyre::eyre!("failed to install metrics recorder: {e}"))?;

    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorder_renders_prefixed_counters() {
        let handle = install_recorder(METRICS_PREFIX).unwrap();
        metrics::counter!("discovery_announcements_total", "layer" => "eth").increment(2);

        let rendered = handle.render();
        assert!(rendered.contains("vesta_discovery_announcements_total{layer=\"eth\"} 2"));

        assert!(install_recorder(METRICS_PREFIX).is_err());
    }
}
