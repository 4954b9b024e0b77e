//! Command-line capture for the migration command.
//!
//! Everything the caller passes is forwarded to the migration command
//! except `--exclude` and its value, which only migrate-all understands.

use std::collections::BTreeSet;

use crate::error::MigrateError;

/// Option naming the plugins to skip, comma separated.
pub const EXCLUDE_FLAG: &str = "--exclude";

/// Remove every occurrence of `flag` and its value from `argv`.
///
/// The token after the flag is its value unless it starts with `-`, in
/// which case it is another option and stays. The `flag=value` form is
/// removed as a single token.
pub fn filter_args(argv: &[String], flag: &str) -> Vec<String> {
    let mut forwarded = Vec::with_capacity(argv.len());
    let mut tokens = argv.iter().peekable();

    while let Some(token) = tokens.next() {
        if token == flag {
            if tokens.peek().is_some_and(|next| !next.starts_with('-')) {
                tokens.next();
            }
            continue;
        }
        if inline_value(token, flag).is_some() {
            continue;
        }
        forwarded.push(token.clone());
    }

    forwarded
}

/// Collect the values given to `flag`, using the same rules as [`filter_args`].
///
/// A flag with no value contributes nothing.
pub fn option_values<'a>(argv: &'a [String], flag: &str) -> Vec<&'a str> {
    let mut values = Vec::new();
    let mut tokens = argv.iter().peekable();

    while let Some(token) = tokens.next() {
        if token == flag {
            if let Some(next) = tokens.next_if(|next| !next.starts_with('-')) {
                values.push(next.as_str());
            }
        } else if let Some(value) = inline_value(token, flag) {
            values.push(value);
        }
    }

    values
}

/// Split a comma-separated list of plugin names.
pub fn parse_name_list(value: &str) -> BTreeSet<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn inline_value<'a>(token: &'a str, flag: &str) -> Option<&'a str> {
    token.strip_prefix(flag)?.strip_prefix('=')
}

/// Short options go in clusters: `-v`, `-vv` and `-xv` all turn on `v`.
fn is_verbose(token: &str) -> bool {
    if token == "--verbose" {
        return true;
    }
    match token.strip_prefix('-') {
        Some(short) if !short.starts_with('-') => short.contains('v'),
        _ => false,
    }
}

/// Whether `token` passes the option `flag`, in any spelling.
///
/// Long flags match `--flag` and `--flag=value`. A single-letter short
/// flag also matches an attached value (`-pBlog`, `-p=Blog`).
fn uses_flag(token: &str, flag: &str) -> bool {
    if token == flag || inline_value(token, flag).is_some() {
        return true;
    }
    let is_short = flag.len() == 2 && !flag.starts_with("--");
    is_short && !token.starts_with("--") && token.starts_with(flag)
}

/// What one migrate-all call asked for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    /// Arguments handed to the migration command for every target.
    pub forwarded: Vec<String>,
    /// Plugins that must not be migrated.
    pub exclude: BTreeSet<String>,
    /// Echo the forwarded arguments before each invocation.
    pub verbose: bool,
}

impl Invocation {
    /// Build an invocation from the raw arguments (program name excluded).
    ///
    /// `reserved` holds the spellings of the option the runner appends for
    /// plugin targets (`--plugin`, `-p`). The caller may not pass any of
    /// them, since every target would then run against the same plugin.
    pub fn from_argv(argv: &[String], reserved: &[&str]) -> Result<Self, MigrateError> {
        let forwarded = filter_args(argv, EXCLUDE_FLAG);

        for token in &forwarded {
            if let Some(flag) = reserved.iter().find(|flag| uses_flag(token, flag)) {
                return Err(MigrateError::ReservedArgument {
                    flag: flag.to_string(),
                });
            }
        }

        let exclude = option_values(argv, EXCLUDE_FLAG)
            .into_iter()
            .flat_map(parse_name_list)
            .collect();
        let verbose = forwarded.iter().any(|t| is_verbose(t));

        Ok(Self {
            forwarded,
            exclude,
            verbose,
        })
    }

    /// Whether `plugin` was excluded by the caller.
    pub fn is_excluded(&self, plugin: &str) -> bool {
        self.exclude.contains(plugin)
    }
}
