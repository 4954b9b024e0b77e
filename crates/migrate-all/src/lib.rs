//! migrate-all library
//!
//! Migrates an application's database and then every loaded plugin that
//! owns migrations, one target at a time, stopping at the first failure.
//! The `migrate-all` binary wires these pieces to the environment.

pub mod args;
pub mod config;
pub mod error;
pub mod migrate;
pub mod plugin;
pub mod report;

pub use args::Invocation;
pub use config::Config;
pub use error::MigrateError;
pub use migrate::{ExecutionPlan, ExecutionResult, MigrateAll, Migrator, Target};
pub use plugin::{LoadedPlugin, MigrationProbe, PluginRegistry};
pub use report::Reporter;
