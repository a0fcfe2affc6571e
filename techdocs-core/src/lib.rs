//! techdocs core library: domain types, project configuration, technique
//! discovery, errors.
//!
//! Public API surface:
//! - [`types`]: newtypes and domain structs
//! - [`config`]: `techdocs.yaml` loading
//! - [`registry`]: the registry adapter ([`discover`])
//! - [`catalog`]: category grouping shared by every renderer
//! - [`error`]: [`DiscoveryError`], [`ConfigError`]

pub mod catalog;
pub mod config;
pub mod error;
pub mod registry;
pub mod types;

pub use catalog::{group_by_category, CategoryGroup};
pub use config::DocsConfig;
pub use error::{ConfigError, DiscoveryError};
pub use registry::{discover, ManifestSource, TechniqueSource};
pub use types::{
    Category, RegionMarkers, RegionName, RenderedFragment, SyncTarget, TargetMode, TechniqueKey,
    TechniqueRecord,
};
