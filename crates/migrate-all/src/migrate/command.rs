//! The migration command each target is handed to.

use std::path::PathBuf;
use std::process::Command;

use tracing::debug;

use super::plan::{ExecutionResult, Target};
use crate::config::Config;
use crate::error::MigrateError;

/// Runs one migration set.
///
/// Implementations own everything about migrating: reading migration
/// files, applying them, and tracking what has been applied.
pub trait Migrator {
    /// Run migrations with `args` for `target` and report the outcome.
    ///
    /// `args` already carries the plugin scoping flag for plugin targets;
    /// `target` is passed for diagnostics.
    fn invoke(&mut self, target: &Target, args: &[String]) -> Result<ExecutionResult, MigrateError>;
}

impl<F> Migrator for F
where
    F: FnMut(&Target, &[String]) -> Result<ExecutionResult, MigrateError>,
{
    fn invoke(&mut self, target: &Target, args: &[String]) -> Result<ExecutionResult, MigrateError> {
        self(target, args)
    }
}

/// Migrator that spawns an external command and waits for it.
#[derive(Debug, Clone)]
pub struct CommandMigrator {
    program: String,
    leading_args: Vec<String>,
    workdir: Option<PathBuf>,
}

impl CommandMigrator {
    /// Run `program leading_args.. args..` for every target.
    pub fn new<I, S>(program: impl Into<String>, leading_args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            leading_args: leading_args.into_iter().map(Into::into).collect(),
            workdir: None,
        }
    }

    /// Build the migrator described by the configuration.
    pub fn from_config(config: &Config) -> Self {
        let migrator = Self::new(config.migrate_program.clone(), config.migrate_args.clone());
        match &config.migrate_workdir {
            Some(dir) => migrator.current_dir(dir.clone()),
            None => migrator,
        }
    }

    /// Run the command from `dir` instead of the current directory.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(dir.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Migrator for CommandMigrator {
    fn invoke(&mut self, target: &Target, args: &[String]) -> Result<ExecutionResult, MigrateError> {
        let mut command = Command::new(&self.program);
        command.args(&self.leading_args).args(args);
        if let Some(dir) = &self.workdir {
            command.current_dir(dir);
        }

        debug!(
            program = %self.program,
            leading_args = ?self.leading_args,
            ?args,
            %target,
            "spawning migration command"
        );

        let status = command.status().map_err(|source| MigrateError::Spawn {
            program: self.program.clone(),
            target: describe(target),
            source,
        })?;

        let result = match status.code() {
            Some(code) => ExecutionResult::from_code(code),
            None => ExecutionResult::Failure(ExecutionResult::UNKNOWN_FAILURE_CODE),
        };
        debug!(%target, ?status, ?result, "migration command exited");

        Ok(result)
    }
}

fn describe(target: &Target) -> String {
    match target {
        Target::Primary => "the app".to_string(),
        Target::Plugin(name) => format!("plugin '{name}'"),
    }
}
