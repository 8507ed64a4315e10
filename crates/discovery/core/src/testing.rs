//! Engine constructors over the in-memory mocks, and counter capture.

use std::future::Future;

use metrics_util::debugging::{DebugValue, DebuggingRecorder};
use vesta_discovery_test_utils::{MockEarnings, MockLayerClient, MockLayers};

use crate::Discovery;

pub(crate) type MockDiscovery = Discovery<MockLayerClient, MockLayers, MockEarnings>;

pub(crate) fn discovery_full(
    client: MockLayerClient,
    layers: MockLayers,
    earnings: MockEarnings,
) -> MockDiscovery {
    Discovery::new(client, layers, earnings)
}

pub(crate) fn discovery_with_layers(client: MockLayerClient, layers: MockLayers) -> MockDiscovery {
    discovery_full(client, layers, MockEarnings::new())
}

pub(crate) fn discovery_with(client: MockLayerClient) -> MockDiscovery {
    discovery_with_layers(client, MockLayers::new())
}

/// Counter values recorded while a future ran.
#[derive(Debug, Default)]
pub(crate) struct Counters(Vec<(String, Vec<(String, String)>, u64)>);

impl Counters {
    /// Sum of `name` over every series carrying all of `labels`.
    pub(crate) fn get(&self, name: &str, labels: &[(&str, &str)]) -> u64 {
        self.0
            .iter()
            .filter(|(key, series, _)| {
                key == name
                    && labels
                        .iter()
                        .all(|(k, v)| series.iter().any(|(sk, sv)| sk == k && sv == v))
            })
            .map(|(_, _, value)| value)
            .sum()
    }
}

/// Run `fut` on a current-thread runtime with a local debugging recorder.
pub(crate) fn with_counters<T>(fut: impl Future<Output = T>) -> (T, Counters) {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();

    let output = metrics::with_local_recorder(&recorder, || runtime.block_on(fut));

    let counters = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .filter_map(|(key, _, _, value)| match value {
            DebugValue::Counter(count) => {
                let key = key.key();
                let labels = key
                    .labels()
                    .map(|label| (label.key().to_owned(), label.value().to_owned()))
                    .collect();
                Some((key.name().to_owned(), labels, count))
            }
            _ => None,
        })
        .collect();

    (output, Counters(counters))
}
