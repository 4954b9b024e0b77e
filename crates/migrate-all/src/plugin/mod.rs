//! Plugin side of a migrate-all run.
//!
//! This module handles:
//! - Parsing plugin metadata from `.info.toml` files
//! - Ordering plugins so dependencies migrate first
//! - Enumerating loaded plugins through a read-only registry
//! - Probing each plugin for its own migration files

mod dependency;
mod discovery;
mod manifest;
mod registry;

pub use dependency::resolve_load_order;
pub use discovery::{MigrationProbe, discover};
pub use manifest::{MANIFEST_SUFFIX, PluginManifest};
pub use registry::{LoadedPlugin, ManifestRegistry, PluginRegistry};
