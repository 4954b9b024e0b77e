#![allow(clippy::unwrap_used, clippy::expect_used)]
//! migrate-all test utilities.
//!
//! Helpers for integration testing: on-disk plugin fixtures and a
//! migrator that records what it was asked to run.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use migrate_all::plugin::{MANIFEST_SUFFIX, ManifestRegistry};
use migrate_all::{ExecutionResult, LoadedPlugin, MigrateError, Migrator, Target};
use tempfile::TempDir;

/// Turn string literals into an argument list.
pub fn argv(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|s| s.to_string()).collect()
}

/// Shorthand for a plugin target.
pub fn plugin_target(name: &str) -> Target {
    Target::Plugin(name.to_string())
}

/// A temporary application root with a `plugins/` directory.
#[derive(Debug)]
pub struct TestWorkspace {
    dir: TempDir,
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorkspace {
    /// Create an empty workspace.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp workspace");
        fs::create_dir_all(dir.path().join("plugins")).expect("failed to create plugins dir");
        Self { dir }
    }

    /// Root of the workspace.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// The plugins directory.
    pub fn plugins_dir(&self) -> PathBuf {
        self.dir.path().join("plugins")
    }

    /// Start a plugin fixture named `name`.
    pub fn plugin(&self, name: &str) -> TestPlugin {
        TestPlugin {
            root: self.plugins_dir().join(name),
            name: name.to_string(),
            version: "1.0.0".to_string(),
            dependencies: Vec::new(),
            migrations: Vec::new(),
            manifest: true,
        }
    }

    /// A registry over this workspace's plugins directory.
    pub fn registry(&self) -> ManifestRegistry {
        ManifestRegistry::new(self.plugins_dir())
    }
}

/// A plugin fixture builder.
#[derive(Debug, Clone)]
pub struct TestPlugin {
    pub root: PathBuf,
    pub name: String,
    pub version: String,
    pub dependencies: Vec<String>,
    pub migrations: Vec<String>,
    pub manifest: bool,
}

impl TestPlugin {
    /// Declare a dependency on another plugin.
    pub fn with_dependency(mut self, dep: &str) -> Self {
        self.dependencies.push(dep.to_string());
        self
    }

    /// Add a file to the plugin's `config/Migrations/` directory.
    pub fn with_migration(mut self, file_name: &str) -> Self {
        self.migrations.push(file_name.to_string());
        self
    }

    /// Leave the `.info.toml` manifest out.
    pub fn without_manifest(mut self) -> Self {
        self.manifest = false;
        self
    }

    /// Write the plugin to disk and return its registry entry.
    pub fn create(self) -> LoadedPlugin {
        fs::create_dir_all(&self.root).expect("failed to create plugin dir");

        if self.manifest {
            let deps = self
                .dependencies
                .iter()
                .map(|d| format!("\"{d}\""))
                .collect::<Vec<_>>()
                .join(", ");
            let manifest = format!(
                "name = \"{}\"\nversion = \"{}\"\ndescription = \"{} fixture\"\ndependencies = [{}]\n",
                self.name, self.version, self.name, deps
            );
            fs::write(
                self.root.join(format!("{}{MANIFEST_SUFFIX}", self.name)),
                manifest,
            )
            .expect("failed to write manifest");
        }

        if !self.migrations.is_empty() {
            let dir = self.root.join("config").join("Migrations");
            fs::create_dir_all(&dir).expect("failed to create migrations dir");
            for file in &self.migrations {
                fs::write(dir.join(file), "").expect("failed to write migration");
            }
        }

        LoadedPlugin::new(self.name, self.root)
    }
}

/// A migrator that records every invocation and answers from a script.
///
/// Targets succeed unless told otherwise with [`RecordingMigrator::failing`].
#[derive(Debug, Default)]
pub struct RecordingMigrator {
    calls: Vec<(Target, Vec<String>)>,
    failures: HashMap<Target, i32>,
}

impl RecordingMigrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `target` fail with `code`.
    pub fn failing(mut self, target: Target, code: i32) -> Self {
        self.failures.insert(target, code);
        self
    }

    /// Every invocation so far, in order.
    pub fn calls(&self) -> &[(Target, Vec<String>)] {
        &self.calls
    }

    /// The targets invoked so far, in order.
    pub fn invoked_targets(&self) -> Vec<Target> {
        self.calls.iter().map(|(t, _)| t.clone()).collect()
    }
}

impl Migrator for RecordingMigrator {
    fn invoke(&mut self, target: &Target, args: &[String]) -> Result<ExecutionResult, MigrateError> {
        self.calls.push((target.clone(), args.to_vec()));
        Ok(self
            .failures
            .get(target)
            .map_or(ExecutionResult::Success, |code| ExecutionResult::Failure(*code)))
    }
}

/// Assertion helpers.
pub mod assert {
    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected string to contain '{needle}'\nActual: {haystack}"
        );
    }
}
