//! Registry of loaded plugins.
//!
//! The registry answers one question: which plugins are loaded, where do
//! they live, and in what order. It is queried once per run and never
//! modified.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::dependency::resolve_load_order;
use super::manifest::{PluginManifest, is_manifest_name};
use crate::error::MigrateError;

/// A plugin known to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedPlugin {
    /// Plugin machine name.
    pub name: String,
    /// Plugin root directory.
    pub path: PathBuf,
}

impl LoadedPlugin {
    /// Create a registry entry.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Read-only source of loaded plugins, enumerated in load order.
pub trait PluginRegistry {
    /// All loaded plugins, in the order they should be migrated.
    fn plugins(&self) -> Result<Vec<LoadedPlugin>, MigrateError>;
}

impl PluginRegistry for [LoadedPlugin] {
    fn plugins(&self) -> Result<Vec<LoadedPlugin>, MigrateError> {
        Ok(self.to_vec())
    }
}

impl PluginRegistry for Vec<LoadedPlugin> {
    fn plugins(&self) -> Result<Vec<LoadedPlugin>, MigrateError> {
        Ok(self.clone())
    }
}

/// Registry backed by a plugins directory of `{name}.info.toml` manifests.
#[derive(Debug, Clone)]
pub struct ManifestRegistry {
    plugins_dir: PathBuf,
    disabled: HashSet<String>,
}

impl ManifestRegistry {
    /// Create a registry over `plugins_dir`.
    pub fn new(plugins_dir: impl Into<PathBuf>) -> Self {
        Self {
            plugins_dir: plugins_dir.into(),
            disabled: HashSet::new(),
        }
    }

    /// Treat the named plugins as not loaded.
    pub fn with_disabled<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.disabled.extend(names.into_iter().map(Into::into));
        self
    }

    /// The directory this registry scans.
    pub fn plugins_dir(&self) -> &Path {
        &self.plugins_dir
    }

    /// Parse every plugin manifest under the plugins directory.
    ///
    /// Directories without exactly one readable manifest are skipped with
    /// a warning; they are not plugins as far as migrations go.
    pub fn scan(&self) -> Result<HashMap<String, (PluginManifest, PathBuf)>, MigrateError> {
        let mut discovered = HashMap::new();

        if !self.plugins_dir.exists() {
            info!(
                plugins_dir = %self.plugins_dir.display(),
                "plugins directory does not exist, no plugins loaded"
            );
            return Ok(discovered);
        }

        let entries =
            std::fs::read_dir(&self.plugins_dir).map_err(|source| MigrateError::PluginsDir {
                path: self.plugins_dir.display().to_string(),
                source,
            })?;

        let mut dirs: Vec<_> = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_dir())
            .collect();
        dirs.sort_by_key(|e| e.file_name());

        for entry in dirs {
            let plugin_dir = entry.path();

            let manifests: Vec<_> = match std::fs::read_dir(&plugin_dir) {
                Ok(entries) => entries
                    .filter_map(|e| e.ok())
                    .filter(|e| e.file_name().to_str().is_some_and(is_manifest_name))
                    .collect(),
                Err(e) => {
                    warn!(dir = %plugin_dir.display(), error = %e, "failed to read plugin dir");
                    continue;
                }
            };

            let manifest_path = match manifests.as_slice() {
                [] => {
                    warn!(dir = %plugin_dir.display(), "no .info.toml file found, skipping");
                    continue;
                }
                [only] => only.path(),
                _ => {
                    warn!(dir = %plugin_dir.display(), "multiple .info.toml files found, skipping");
                    continue;
                }
            };

            let manifest = match PluginManifest::parse(&manifest_path) {
                Ok(manifest) => manifest,
                Err(e) => {
                    warn!(path = %manifest_path.display(), error = %e, "failed to parse plugin manifest");
                    continue;
                }
            };

            if self.disabled.contains(&manifest.name) {
                debug!(plugin = %manifest.name, "plugin disabled, not loaded");
                continue;
            }

            if let Some((_, first_dir)) = discovered.get(&manifest.name) {
                warn!(
                    plugin = %manifest.name,
                    kept = %first_dir.display(),
                    ignored = %plugin_dir.display(),
                    "duplicate plugin name, skipping"
                );
                continue;
            }

            discovered.insert(manifest.name.clone(), (manifest, plugin_dir));
        }

        Ok(discovered)
    }
}

impl PluginRegistry for ManifestRegistry {
    fn plugins(&self) -> Result<Vec<LoadedPlugin>, MigrateError> {
        let mut discovered = self.scan()?;

        let manifests: HashMap<String, PluginManifest> = discovered
            .iter()
            .map(|(name, (manifest, _))| (name.clone(), manifest.clone()))
            .collect();
        let order = resolve_load_order(&manifests)?;

        let plugins: Vec<LoadedPlugin> = order
            .into_iter()
            .filter_map(|name| {
                discovered
                    .remove(&name)
                    .map(|(_, path)| LoadedPlugin { name, path })
            })
            .collect();

        info!(count = plugins.len(), "loaded plugins");
        Ok(plugins)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn write_plugin(root: &Path, dir: &str, name: &str, deps: &[&str]) -> PathBuf {
        let plugin_dir = root.join(dir);
        fs::create_dir_all(&plugin_dir).unwrap();
        let deps = deps
            .iter()
            .map(|d| format!("\"{d}\""))
            .collect::<Vec<_>>()
            .join(", ");
        fs::write(
            plugin_dir.join(format!("{name}.info.toml")),
            format!("name = \"{name}\"\nversion = \"1.0.0\"\ndependencies = [{deps}]\n"),
        )
        .unwrap();
        plugin_dir
    }

    fn names(plugins: &[LoadedPlugin]) -> Vec<&str> {
        plugins.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn missing_directory_is_empty_registry() {
        let registry = ManifestRegistry::new("/nonexistent/plugins/dir");
        assert!(registry.plugins().unwrap().is_empty());
    }

    #[test]
    fn plugins_in_dependency_then_name_order() {
        let tmp = TempDir::new().unwrap();
        write_plugin(tmp.path(), "comments", "comments", &["users"]);
        write_plugin(tmp.path(), "users", "users", &[]);
        let audit = write_plugin(tmp.path(), "audit", "audit", &[]);

        let plugins = ManifestRegistry::new(tmp.path()).plugins().unwrap();
        assert_eq!(names(&plugins), vec!["audit", "users", "comments"]);
        assert_eq!(plugins[0].path, audit);
    }

    #[test]
    fn skips_directories_without_single_manifest() {
        let tmp = TempDir::new().unwrap();
        write_plugin(tmp.path(), "good", "good", &[]);
        fs::create_dir_all(tmp.path().join("empty")).unwrap();
        let twice = write_plugin(tmp.path(), "twice", "twice", &[]);
        fs::write(twice.join("other.info.toml"), "name = \"other\"\nversion = \"1\"\n").unwrap();
        let broken = tmp.path().join("broken");
        fs::create_dir_all(&broken).unwrap();
        fs::write(broken.join("broken.info.toml"), "name = ").unwrap();

        let plugins = ManifestRegistry::new(tmp.path()).plugins().unwrap();
        assert_eq!(names(&plugins), vec!["good"]);
    }

    #[test]
    fn disabled_plugins_are_not_loaded() {
        let tmp = TempDir::new().unwrap();
        write_plugin(tmp.path(), "a", "a", &[]);
        write_plugin(tmp.path(), "b", "b", &[]);

        let plugins = ManifestRegistry::new(tmp.path())
            .with_disabled(["b"])
            .plugins()
            .unwrap();
        assert_eq!(names(&plugins), vec!["a"]);
    }

    #[test]
    fn disabled_dependency_is_an_error() {
        let tmp = TempDir::new().unwrap();
        write_plugin(tmp.path(), "base", "base", &[]);
        write_plugin(tmp.path(), "ext", "ext", &["base"]);

        let err = ManifestRegistry::new(tmp.path())
            .with_disabled(["base"])
            .plugins()
            .unwrap_err();
        assert!(matches!(err, MigrateError::MissingDependency { .. }));
    }

    #[test]
    fn duplicate_names_keep_first_directory() {
        let tmp = TempDir::new().unwrap();
        let first = write_plugin(tmp.path(), "a_blog", "blog", &[]);
        write_plugin(tmp.path(), "b_blog", "blog", &[]);

        let plugins = ManifestRegistry::new(tmp.path()).plugins().unwrap();
        assert_eq!(plugins, vec![LoadedPlugin::new("blog", first)]);
    }

    #[test]
    fn in_memory_registry_keeps_vector_order() {
        let registry = vec![
            LoadedPlugin::new("zeta", "/p/zeta"),
            LoadedPlugin::new("alpha", "/p/alpha"),
        ];
        assert_eq!(names(&registry.plugins().unwrap()), vec!["zeta", "alpha"]);
    }
}
