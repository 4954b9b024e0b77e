//! Parser for plugin `.info.toml` manifest files.
//!
//! Each plugin directory holds one `{name}.info.toml` file that declares:
//! - name, version, description
//! - dependencies (other plugins that must be migrated first)

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Suffix identifying a plugin manifest file.
pub const MANIFEST_SUFFIX: &str = ".info.toml";

/// Plugin metadata parsed from `.info.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct PluginManifest {
    /// Plugin machine name, used for `--exclude` and the scoping flag.
    pub name: String,

    /// Semantic version (e.g., "1.0.0").
    pub version: String,

    /// Human-readable description.
    #[serde(default)]
    pub description: String,

    /// Other plugins this one depends on (migrated first).
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl PluginManifest {
    /// Parse a manifest file from the given path.
    pub fn parse(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read plugin manifest: {}", path.display()))?;

        Self::parse_str(&content, path)
    }

    /// Parse a manifest from a TOML string.
    pub fn parse_str(content: &str, path: &Path) -> Result<Self> {
        let manifest: PluginManifest = toml::from_str(content)
            .with_context(|| format!("failed to parse plugin manifest TOML at {}", path.display()))?;

        manifest.validate(path)?;
        Ok(manifest)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("plugin manifest at {} has empty 'name' field", path.display());
        }

        if self.name.contains(',') {
            anyhow::bail!(
                "plugin '{}' at {} has a comma in its name, which --exclude cannot express",
                self.name,
                path.display()
            );
        }

        if self.version.is_empty() {
            anyhow::bail!(
                "plugin '{}' at {} has empty 'version' field",
                self.name,
                path.display()
            );
        }

        if self.dependencies.iter().any(|d| d == &self.name) {
            anyhow::bail!("plugin '{}' lists itself as a dependency", self.name);
        }

        Ok(())
    }
}

/// Whether a file name looks like a plugin manifest.
pub fn is_manifest_name(file_name: &str) -> bool {
    file_name.len() > MANIFEST_SUFFIX.len() && file_name.ends_with(MANIFEST_SUFFIX)
}
