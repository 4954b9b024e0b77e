//! Running the app's migrations and then every plugin's.
//!
//! [`MigrateAll`] ties the pieces together: it asks the registry which
//! plugins are loaded, keeps the ones that own migrations, and hands each
//! target to the [`Migrator`] in order, app first.

mod command;
mod plan;
mod runner;

pub use command::{CommandMigrator, Migrator};
pub use plan::{ExecutionPlan, ExecutionResult, Target};
pub use runner::{run, target_args};

use tracing::info;

use crate::args::Invocation;
use crate::error::MigrateError;
use crate::plugin::{MigrationProbe, PluginRegistry, discover};
use crate::report::Reporter;

/// Default flag scoping an invocation to one plugin.
pub const DEFAULT_SCOPE_FLAG: &str = "--plugin";

/// One migrate-all run over a registry, a migrator and a reporter.
pub struct MigrateAll<'a> {
    registry: &'a dyn PluginRegistry,
    migrator: &'a mut dyn Migrator,
    reporter: &'a mut dyn Reporter,
    probe: MigrationProbe,
    scope_flag: String,
}

impl<'a> MigrateAll<'a> {
    pub fn new(
        registry: &'a dyn PluginRegistry,
        migrator: &'a mut dyn Migrator,
        reporter: &'a mut dyn Reporter,
    ) -> Self {
        Self {
            registry,
            migrator,
            reporter,
            probe: MigrationProbe::default(),
            scope_flag: DEFAULT_SCOPE_FLAG.to_string(),
        }
    }

    /// Look for plugin migrations with `probe` instead of the default layout.
    pub fn with_probe(mut self, probe: MigrationProbe) -> Self {
        self.probe = probe;
        self
    }

    /// Scope plugin invocations with `flag` instead of `--plugin`.
    pub fn with_scope_flag(mut self, flag: impl Into<String>) -> Self {
        self.scope_flag = flag.into();
        self
    }

    /// Plan the run: the app, then each loaded plugin that has migrations.
    pub fn plan(&mut self) -> Result<ExecutionPlan, MigrateError> {
        let plugins = discover(self.registry, &self.probe, &mut *self.reporter)?;
        let plan = ExecutionPlan::new(plugins);
        info!(targets = plan.len(), "migration plan ready");
        Ok(plan)
    }

    /// Execute an already built plan.
    pub fn run(
        &mut self,
        plan: &ExecutionPlan,
        invocation: &Invocation,
    ) -> Result<ExecutionResult, MigrateError> {
        run(
            plan,
            invocation,
            &self.scope_flag,
            &mut *self.migrator,
            &mut *self.reporter,
        )
    }

    /// Plan and execute in one go.
    pub fn execute(&mut self, invocation: &Invocation) -> Result<ExecutionResult, MigrateError> {
        let plan = self.plan()?;
        self.run(&plan, invocation)
    }
}
