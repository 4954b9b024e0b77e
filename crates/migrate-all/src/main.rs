//! migrate-all
//!
//! Migrates the app, then every loaded plugin that has migrations.
//!
//! Usage:
//!   migrate-all [--exclude NAMES] [MIGRATE_ARGS]...

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{ArgAction, CommandFactory, Parser};
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use migrate_all::args::parse_name_list;
use migrate_all::migrate::CommandMigrator;
use migrate_all::plugin::ManifestRegistry;
use migrate_all::report::ConsoleReporter;
use migrate_all::{Config, ExecutionResult, Invocation, MigrateAll, MigrationProbe};

/// Migrate the database: app migrations first, then every plugin's.
///
/// All arguments except --exclude are passed on to the migration command.
#[derive(Parser, Debug)]
#[command(name = "migrate-all", version, about, long_about = None)]
struct Cli {
    /// Plugins that are not migrated, comma separated.
    #[arg(long, value_name = "NAMES", num_args = 0..=1, default_missing_value = "", action = ArgAction::Append)]
    exclude: Vec<String>,

    /// Echo the arguments passed to the migration command (also forwarded).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Arguments for the migration command.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "MIGRATE_ARGS")]
    migrate_args: Vec<String>,
}

fn main() -> ExitCode {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    let argv: Vec<String> = std::env::args().collect();
    let cli = Cli::parse_from(&argv);

    match run(&cli, argv.get(1..).unwrap_or_default()) {
        Ok(result) => ExitCode::from(exit_status(result)),
        Err(e) => {
            error!(error = %e, "migrate-all aborted");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, argv: &[String]) -> Result<ExecutionResult> {
    let config = Config::from_env().context("failed to load configuration")?;
    debug!(?config, "configuration loaded");

    let invocation = invocation(cli, argv, &config.reserved_flags());
    debug!(
        forwarded = ?invocation.forwarded,
        exclude = ?invocation.exclude,
        migrate_args = ?cli.migrate_args,
        "arguments captured"
    );

    let registry = ManifestRegistry::new(&config.plugins_dir)
        .with_disabled(config.disabled_plugins.iter().cloned());
    let probe = MigrationProbe::new(&config.migrations_path, &config.migration_extension);
    let mut migrator = CommandMigrator::from_config(&config);
    let mut reporter = ConsoleReporter;

    info!(
        program = migrator.program(),
        plugins_dir = %registry.plugins_dir().display(),
        "starting migrate-all"
    );

    let result = MigrateAll::new(&registry, &mut migrator, &mut reporter)
        .with_probe(probe)
        .with_scope_flag(&config.plugin_scope_flag)
        .execute(&invocation)?;

    Ok(result)
}

/// Capture the invocation; misuse is reported like any other usage error.
fn invocation(cli: &Cli, argv: &[String], reserved: &[&str]) -> Invocation {
    let mut invocation = match Invocation::from_argv(argv, reserved) {
        Ok(invocation) => invocation,
        Err(e) => Cli::command()
            .error(ErrorKind::ArgumentConflict, e.to_string())
            .exit(),
    };

    invocation
        .exclude
        .extend(cli.exclude.iter().flat_map(|v| parse_name_list(v)));
    invocation.verbose |= cli.verbose > 0;
    invocation
}

fn exit_status(result: ExecutionResult) -> u8 {
    if result.is_success() {
        return 0;
    }
    // Codes outside 1..=255 cannot be passed through unchanged.
    u8::try_from(result.code())
        .ok()
        .filter(|c| *c != 0)
        .unwrap_or(1)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
