//! Error types with clear, actionable messages.
//!
//! Every variant names the plugin, program, or setting involved so the
//! operator can tell which part of a run went wrong.

use std::io;

use thiserror::Error;

/// Errors that abort a migrate-all run.
///
/// A migration command that runs and exits non-zero is not an error here:
/// that outcome is an [`ExecutionResult::Failure`](crate::migrate::ExecutionResult).
#[derive(Debug, Error)]
pub enum MigrateError {
    /// An environment setting has an unusable value.
    #[error("invalid configuration for {key}: {details}")]
    Config { key: String, details: String },

    /// The plugins directory exists but could not be listed.
    #[error("failed to read plugins directory {path}: {source}")]
    PluginsDir {
        path: String,
        #[source]
        source: io::Error,
    },

    /// A loaded plugin depends on a plugin that is not loaded.
    #[error("plugin '{plugin}': depends on '{dependency}' which is not loaded")]
    MissingDependency { plugin: String, dependency: String },

    /// Plugin dependencies form a cycle, so no load order exists.
    #[error("circular dependency detected involving plugins: {cycle}")]
    CircularDependency { cycle: String },

    /// The migration command could not be started at all.
    #[error("failed to start migration command '{program}' for {target}: {source}")]
    Spawn {
        program: String,
        target: String,
        #[source]
        source: io::Error,
    },

    /// The caller passed a flag the runner adds on its own.
    #[error("'{flag}' is set per plugin by migrate-all and cannot be passed explicitly")]
    ReservedArgument { flag: String },
}

impl MigrateError {
    /// Create a configuration error.
    pub fn config(key: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Config {
            key: key.into(),
            details: details.into(),
        }
    }

    /// Create a missing dependency error.
    pub fn missing_dependency(plugin: impl Into<String>, dependency: impl Into<String>) -> Self {
        Self::MissingDependency {
            plugin: plugin.into(),
            dependency: dependency.into(),
        }
    }
}
