//! Targets, the ordered plan, and per-target outcomes.

use std::collections::HashSet;
use std::fmt;

/// One migration set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    /// The application's own migrations.
    Primary,
    /// Migrations owned by the named plugin.
    Plugin(String),
}

impl Target {
    /// The plugin name, or `None` for the primary target.
    pub fn plugin(&self) -> Option<&str> {
        match self {
            Self::Primary => None,
            Self::Plugin(name) => Some(name.as_str()),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => f.write_str("App"),
            Self::Plugin(name) => f.write_str(name),
        }
    }
}

/// Ordered list of targets: the primary target, then plugins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    targets: Vec<Target>,
}

impl ExecutionPlan {
    /// Build a plan from plugins in registry order.
    ///
    /// Repeated plugin names keep their first position.
    pub fn new<I, S>(plugins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut targets = vec![Target::Primary];
        for name in plugins {
            let name: String = name.into();
            if seen.insert(name.clone()) {
                targets.push(Target::Plugin(name));
            }
        }
        Self { targets }
    }

    /// All targets in execution order.
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Number of targets, the primary one included.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// A plan always holds the primary target.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Outcome of one migration command invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionResult {
    Success,
    /// The command exited with this non-zero code.
    Failure(i32),
}

impl ExecutionResult {
    /// Exit code that means success.
    pub const SUCCESS_CODE: i32 = 0;

    /// Code reported when a process ended without one (killed by a signal).
    pub const UNKNOWN_FAILURE_CODE: i32 = 1;

    /// Interpret a process exit code.
    pub fn from_code(code: i32) -> Self {
        if code == Self::SUCCESS_CODE {
            Self::Success
        } else {
            Self::Failure(code)
        }
    }

    /// The exit code this result stands for.
    pub fn code(self) -> i32 {
        match self {
            Self::Success => Self::SUCCESS_CODE,
            Self::Failure(code) => code,
        }
    }

    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}
