//! Configuration loaded from environment variables.
//!
//! Settings never come from the command line: every token the caller
//! passes, apart from `--exclude`, belongs to the migration command.

use std::env;
use std::path::PathBuf;

use crate::error::MigrateError;

/// Runner configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Migration command program (default: `bin/cake`).
    ///
    /// Taken from the first word of MIGRATE_COMMAND, or verbatim from
    /// MIGRATE_PROGRAM when the path contains spaces.
    pub migrate_program: String,

    /// Arguments placed before the forwarded ones (default: `migrations migrate`).
    ///
    /// MIGRATE_COMMAND is split on whitespace; arguments cannot contain spaces.
    pub migrate_args: Vec<String>,

    /// Working directory for the migration command (default: inherited).
    pub migrate_workdir: Option<PathBuf>,

    /// Path to plugins directory (default: ./plugins).
    pub plugins_dir: PathBuf,

    /// Plugin names treated as not loaded (from DISABLED_PLUGINS).
    pub disabled_plugins: Vec<String>,

    /// Migration directory relative to a plugin root (default: config/Migrations).
    pub migrations_path: PathBuf,

    /// Extension of migration definition files (default: php).
    pub migration_extension: String,

    /// Flag that scopes one invocation to a plugin (default: --plugin).
    pub plugin_scope_flag: String,

    /// Short alias of the scope flag (default: -p, empty for none).
    pub plugin_scope_short: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, MigrateError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, MigrateError> {
        let program = lookup("MIGRATE_PROGRAM").filter(|v| !v.trim().is_empty());
        let (migrate_program, migrate_args) = match program {
            Some(program) => {
                let args = lookup("MIGRATE_COMMAND")
                    .unwrap_or_else(|| "migrations migrate".to_string());
                (program, args.split_whitespace().map(str::to_string).collect())
            }
            None => {
                let command = lookup("MIGRATE_COMMAND")
                    .unwrap_or_else(|| "bin/cake migrations migrate".to_string());
                let mut words = command.split_whitespace().map(str::to_string);
                let Some(program) = words.next() else {
                    return Err(MigrateError::config(
                        "MIGRATE_COMMAND",
                        "must name a program to run",
                    ));
                };
                (program, words.collect())
            }
        };

        let migrate_workdir = lookup("MIGRATE_WORKDIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let plugins_dir = lookup("PLUGINS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./plugins"));

        let disabled_plugins = lookup("DISABLED_PLUGINS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let migrations_path = lookup("MIGRATIONS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("config/Migrations"));
        if migrations_path.is_absolute() {
            return Err(MigrateError::config(
                "MIGRATIONS_PATH",
                "must be relative to the plugin root",
            ));
        }

        let migration_extension = lookup("MIGRATION_EXTENSION")
            .map(|v| v.trim().trim_start_matches('.').to_string())
            .unwrap_or_else(|| "php".to_string());
        if migration_extension.is_empty() {
            return Err(MigrateError::config(
                "MIGRATION_EXTENSION",
                "must not be empty",
            ));
        }

        let plugin_scope_flag = lookup("PLUGIN_SCOPE_FLAG")
            .map(|v| v.trim().to_string())
            .unwrap_or_else(|| "--plugin".to_string());
        if !plugin_scope_flag.starts_with('-') || plugin_scope_flag.len() < 2 {
            return Err(MigrateError::config(
                "PLUGIN_SCOPE_FLAG",
                format!("'{plugin_scope_flag}' is not an option flag"),
            ));
        }

        let plugin_scope_short = match lookup("PLUGIN_SCOPE_SHORT") {
            None => Some("-p".to_string()),
            Some(v) if v.trim().is_empty() => None,
            Some(v) => Some(v.trim().to_string()),
        };
        if let Some(short) = &plugin_scope_short
            && (short.len() != 2 || !short.starts_with('-') || short == "--")
        {
            return Err(MigrateError::config(
                "PLUGIN_SCOPE_SHORT",
                format!("'{short}' is not a short option like -p"),
            ));
        }

        Ok(Self {
            migrate_program,
            migrate_args,
            migrate_workdir,
            plugins_dir,
            disabled_plugins,
            migrations_path,
            migration_extension,
            plugin_scope_flag,
            plugin_scope_short,
        })
    }

    /// Every spelling of the scope flag; callers may not pass these.
    pub fn reserved_flags(&self) -> Vec<&str> {
        let mut flags = vec![self.plugin_scope_flag.as_str()];
        flags.extend(self.plugin_scope_short.as_deref());
        flags
    }
}
