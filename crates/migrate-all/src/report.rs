//! User-facing progress reporting.
//!
//! These are the lines an operator reads at the terminal. Diagnostics
//! go through `tracing` instead.

use crate::migrate::Target;

/// Sink for the per-target progress of a run.
pub trait Reporter {
    /// A plugin has migrations and will be migrated.
    fn target_found(&mut self, plugin: &str);

    /// Migrations for `target` are about to run.
    fn banner(&mut self, target: &Target);

    /// The exact arguments passed to the migration command (verbose mode).
    fn arguments(&mut self, args: &[String]);

    /// Migrations for `target` failed; nothing after it will run.
    fn failed(&mut self, target: &Target);

    /// Every target migrated successfully.
    fn finished(&mut self);
}

/// Writes progress to stdout and failures to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn target_found(&mut self, plugin: &str) {
        println!("{plugin} has a migrations folder, adding it to the run.");
    }

    fn banner(&mut self, target: &Target) {
        println!();
        println!("************ {target} ************");
        println!();
    }

    fn arguments(&mut self, args: &[String]) {
        println!("--- argv ---");
        for arg in args {
            println!("  {arg}");
        }
        println!("------------");
    }

    fn failed(&mut self, target: &Target) {
        eprintln!("Error: {target} migration failed!");
    }

    fn finished(&mut self) {
        println!("{}", "-".repeat(28));
        println!("All migrations finished successfully.");
    }
}

/// A progress event, as recorded by the `Vec<Event>` reporter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    TargetFound(String),
    Banner(Target),
    Arguments(Vec<String>),
    Failed(Target),
    Finished,
}

impl Reporter for Vec<Event> {
    fn target_found(&mut self, plugin: &str) {
        self.push(Event::TargetFound(plugin.to_string()));
    }

    fn banner(&mut self, target: &Target) {
        self.push(Event::Banner(target.clone()));
    }

    fn arguments(&mut self, args: &[String]) {
        self.push(Event::Arguments(args.to_vec()));
    }

    fn failed(&mut self, target: &Target) {
        self.push(Event::Failed(target.clone()));
    }

    fn finished(&mut self) {
        self.push(Event::Finished);
    }
}
