//! Sequential execution of a plan, stopping at the first failure.

use tracing::{error, info};

use super::command::Migrator;
use super::plan::{ExecutionPlan, ExecutionResult, Target};
use crate::args::Invocation;
use crate::error::MigrateError;
use crate::report::Reporter;

/// Arguments for one target: the forwarded ones, plus the scoping pair
/// for plugin targets.
pub fn target_args(forwarded: &[String], target: &Target, scope_flag: &str) -> Vec<String> {
    let mut args = forwarded.to_vec();
    if let Some(plugin) = target.plugin() {
        args.push(scope_flag.to_string());
        args.push(plugin.to_string());
    }
    args
}

/// Migrate every target of `plan` in order.
///
/// Plugins excluded by the invocation are skipped. The first target that
/// does not succeed ends the run and its result is returned; later targets
/// are never invoked. A migrator error ends the run the same way.
pub fn run(
    plan: &ExecutionPlan,
    invocation: &Invocation,
    scope_flag: &str,
    migrator: &mut dyn Migrator,
    reporter: &mut dyn Reporter,
) -> Result<ExecutionResult, MigrateError> {
    let mut completed = 0usize;

    for target in plan.targets() {
        if target
            .plugin()
            .is_some_and(|plugin| invocation.is_excluded(plugin))
        {
            info!(%target, "plugin excluded, skipping");
            continue;
        }

        let args = target_args(&invocation.forwarded, target, scope_flag);

        reporter.banner(target);
        if invocation.verbose {
            reporter.arguments(&args);
        }

        let result = match migrator.invoke(target, &args) {
            Ok(result) => result,
            Err(e) => {
                reporter.failed(target);
                return Err(e);
            }
        };

        if let ExecutionResult::Failure(code) = result {
            error!(%target, code, "migration failed");
            reporter.failed(target);
            return Ok(result);
        }

        completed += 1;
    }

    info!(targets = completed, "all migrations finished");
    reporter.finished();
    Ok(ExecutionResult::Success)
}
