//! Discovery API - core abstractions for storage provider discovery.
//!
//! This crate defines the vocabulary shared by the discovery engine and the
//! collaborators it talks to. Implementations (DHT transport, blockchain
//! client, snapshot files, in-memory mocks) live elsewhere.
//!
//! # Core Concepts
//!
//! - [`PermissionLayerId`] - Which sub-network of the DHT to query
//! - [`RawSpEntry`] - A storage provider record as held in a layer registry
//! - [`SpUrl`] / [`Urls`] - Validated network addresses
//! - [`VersionData`] - Opaque freshness proof attached to announcements
//!
//! # Collaborators
//!
//! - [`LayerClient`] - Holder discovery, URL resolution, registry, announcements
//! - [`PermissionLayers`] / [`PermissionLayer`] - Layer lookup and versioning
//! - [`EarningsSource`] - Blockchain earnings lookup
//! - [`DiscoveryConfig`] - Timeouts and the report layer

#![warn(missing_docs)]

mod address;
mod client;
mod config;
mod error;
mod layer;
mod types;

pub use address::*;
pub use client::*;
pub use config::*;
pub use error::*;
pub use layer::*;
pub use types::*;

pub use alloy_primitives::U256;
