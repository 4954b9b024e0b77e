//! Finds which loaded plugins own migrations.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::registry::PluginRegistry;
use crate::error::MigrateError;
use crate::report::Reporter;

/// Checks a plugin root for migration definition files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationProbe {
    relative_dir: PathBuf,
    extension: String,
}

impl Default for MigrationProbe {
    fn default() -> Self {
        Self::new("config/Migrations", "php")
    }
}

impl MigrationProbe {
    /// Probe `<root>/<relative_dir>/` for `*.<extension>` files.
    pub fn new(relative_dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            relative_dir: relative_dir.into(),
            extension: extension.into(),
        }
    }

    /// The migration directory of the plugin rooted at `root`.
    pub fn migrations_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.relative_dir)
    }

    /// Whether at least one migration file sits directly in the plugin's
    /// migration directory. A missing directory has none.
    pub fn has_migrations(&self, root: &Path) -> io::Result<bool> {
        let dir = self.migrations_dir(root);
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e),
        };

        for entry in entries {
            let path = entry?.path();
            let hidden = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with('.'));
            if !hidden
                && path.extension().is_some_and(|ext| ext == self.extension.as_str())
                && path.is_file()
            {
                return Ok(true);
            }
        }

        Ok(false)
    }
}

/// List the plugins that have migrations, in registry order.
///
/// Probe failures are not fatal: the plugin is logged and treated as
/// having no migrations. Only a registry that cannot be read at all
/// aborts discovery.
pub fn discover(
    registry: &dyn PluginRegistry,
    probe: &MigrationProbe,
    reporter: &mut dyn Reporter,
) -> Result<Vec<String>, MigrateError> {
    let mut targets = Vec::new();

    for plugin in registry.plugins()? {
        match probe.has_migrations(&plugin.path) {
            Ok(true) => {
                reporter.target_found(&plugin.name);
                targets.push(plugin.name);
            }
            Ok(false) => {
                debug!(plugin = %plugin.name, "no migrations");
            }
            Err(e) => {
                warn!(
                    plugin = %plugin.name,
                    dir = %probe.migrations_dir(&plugin.path).display(),
                    error = %e,
                    "failed to probe migrations directory, skipping plugin"
                );
            }
        }
    }

    Ok(targets)
}
