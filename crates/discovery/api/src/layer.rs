//! Permission layer lookup and versioning.

use async_trait::async_trait;

use crate::{DiscoveryResult, PermissionLayerId, VersionData};

/// Handle to one permission layer.
#[async_trait]
pub trait PermissionLayer: Send + Sync {
    /// Identifier of this layer.
    fn id(&self) -> PermissionLayerId;

    /// Produce fresh version data for an announcement.
    ///
    /// May fail when the layer cannot produce a proof right now (e.g. the
    /// chain client is unreachable).
    async fn new_version_data(&self) -> DiscoveryResult<VersionData>;
}

/// Factory resolving raw layer identifiers to layer handles.
#[auto_impl::auto_impl(&, Arc)]
pub trait PermissionLayers: Send + Sync {
    /// Layer handle type.
    type Layer: PermissionLayer;

    /// Resolve `id` to a layer, `None` if the id is not recognized.
    fn layer(&self, id: &str) -> Option<Self::Layer>;
}
