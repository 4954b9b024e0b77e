#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Integration tests for a full migrate-all run.
//!
//! Plugins are written to a temporary directory and read back through the
//! manifest registry; migrations go to a recording migrator, so no
//! database is needed.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p migrate-all --test migrate_all_test
//! ```

use migrate_all::report::Event;
use migrate_all::{ExecutionResult, Invocation, MigrateAll, MigrationProbe, Target};
use migrate_all_test_utils::{RecordingMigrator, TestWorkspace, argv, plugin_target};

fn invocation(tokens: &[&str]) -> Invocation {
    Invocation::from_argv(&argv(tokens), &["--plugin", "-p"]).unwrap()
}

fn execute(
    workspace: &TestWorkspace,
    migrator: &mut RecordingMigrator,
    tokens: &[&str],
) -> (ExecutionResult, Vec<Event>) {
    let registry = workspace.registry();
    let mut events: Vec<Event> = Vec::new();
    let result = MigrateAll::new(&registry, migrator, &mut events)
        .execute(&invocation(tokens))
        .unwrap();
    (result, events)
}

#[test]
fn only_plugins_with_migration_files_are_planned() {
    let ws = TestWorkspace::new();
    ws.plugin("audit").with_migration("20240101000000_CreateAuditLog.php").create();
    ws.plugin("bake").create();
    ws.plugin("blog")
        .with_migration("20240102000000_CreatePosts.php")
        .with_migration("20240103000000_AddSlug.php")
        .create();
    ws.plugin("notes").with_migration("README.md").create();

    let registry = ws.registry();
    let mut migrator = RecordingMigrator::new();
    let mut events: Vec<Event> = Vec::new();
    let plan = MigrateAll::new(&registry, &mut migrator, &mut events)
        .plan()
        .unwrap();

    assert_eq!(
        plan.targets(),
        &[Target::Primary, plugin_target("audit"), plugin_target("blog")]
    );
    assert_eq!(
        events,
        vec![
            Event::TargetFound("audit".to_string()),
            Event::TargetFound("blog".to_string()),
        ]
    );
    assert!(migrator.calls().is_empty(), "planning must not migrate");
}

#[test]
fn no_plugins_runs_primary_once() {
    let ws = TestWorkspace::new();
    let mut migrator = RecordingMigrator::new();

    let (result, events) = execute(&ws, &mut migrator, &[]);

    assert_eq!(result, ExecutionResult::Success);
    assert_eq!(migrator.calls(), &[(Target::Primary, Vec::<String>::new())]);
    assert_eq!(
        events,
        vec![Event::Banner(Target::Primary), Event::Finished]
    );
}

#[test]
fn exclude_skips_plugin_and_is_not_forwarded() {
    let ws = TestWorkspace::new();
    ws.plugin("alpha").with_migration("1_init.php").create();
    ws.plugin("beta").with_migration("1_init.php").create();
    let mut migrator = RecordingMigrator::new();

    let (result, _) = execute(&ws, &mut migrator, &["--exclude", "beta", "--connection", "test"]);

    assert_eq!(result, ExecutionResult::Success);
    assert_eq!(
        migrator.calls(),
        &[
            (Target::Primary, argv(&["--connection", "test"])),
            (
                plugin_target("alpha"),
                argv(&["--connection", "test", "--plugin", "alpha"])
            ),
        ]
    );
}

#[test]
fn exclude_list_removes_targets_anywhere_in_plan() {
    let ws = TestWorkspace::new();
    for name in ["a", "b", "c", "d"] {
        ws.plugin(name).with_migration("1_init.php").create();
    }
    let mut migrator = RecordingMigrator::new();

    let (result, _) = execute(&ws, &mut migrator, &["--exclude=a,c"]);

    assert_eq!(result, ExecutionResult::Success);
    assert_eq!(
        migrator.invoked_targets(),
        vec![Target::Primary, plugin_target("b"), plugin_target("d")]
    );
}

#[test]
fn exclude_without_value_keeps_next_flag() {
    let ws = TestWorkspace::new();
    ws.plugin("alpha").with_migration("1_init.php").create();
    let mut migrator = RecordingMigrator::new();

    let (result, events) = execute(&ws, &mut migrator, &["--exclude", "--verbose"]);

    assert_eq!(result, ExecutionResult::Success);
    assert_eq!(migrator.calls()[0].1, argv(&["--verbose"]));
    assert_eq!(migrator.calls()[1].1, argv(&["--verbose", "--plugin", "alpha"]));
    assert!(events.contains(&Event::Arguments(argv(&["--verbose"]))));
}

#[test]
fn primary_failure_skips_all_plugins() {
    let ws = TestWorkspace::new();
    ws.plugin("alpha").with_migration("1_init.php").create();
    let mut migrator = RecordingMigrator::new().failing(Target::Primary, 5);

    let (result, events) = execute(&ws, &mut migrator, &[]);

    assert_eq!(result, ExecutionResult::Failure(5));
    assert_eq!(migrator.invoked_targets(), vec![Target::Primary]);
    assert_eq!(events.last(), Some(&Event::Failed(Target::Primary)));
    assert!(!events.contains(&Event::Finished));
}

#[test]
fn plugin_failure_stops_the_run() {
    let ws = TestWorkspace::new();
    ws.plugin("alpha").with_migration("1_init.php").create();
    ws.plugin("beta").with_migration("1_init.php").create();
    ws.plugin("gamma").with_migration("1_init.php").create();
    let mut migrator = RecordingMigrator::new().failing(plugin_target("alpha"), 2);

    let (result, events) = execute(&ws, &mut migrator, &[]);

    assert_eq!(result, ExecutionResult::Failure(2));
    assert_eq!(
        migrator.invoked_targets(),
        vec![Target::Primary, plugin_target("alpha")]
    );
    assert_eq!(events.last(), Some(&Event::Failed(plugin_target("alpha"))));
}

#[test]
fn dependencies_migrate_before_dependents() {
    let ws = TestWorkspace::new();
    ws.plugin("aaa_comments")
        .with_dependency("users")
        .with_migration("1_comments.php")
        .create();
    ws.plugin("users").with_migration("1_users.php").create();
    let mut migrator = RecordingMigrator::new();

    let (result, _) = execute(&ws, &mut migrator, &[]);

    assert_eq!(result, ExecutionResult::Success);
    assert_eq!(
        migrator.invoked_targets(),
        vec![
            Target::Primary,
            plugin_target("users"),
            plugin_target("aaa_comments"),
        ]
    );
}

#[test]
fn directories_without_manifest_are_not_plugins() {
    let ws = TestWorkspace::new();
    ws.plugin("vendor_copy")
        .without_manifest()
        .with_migration("1_init.php")
        .create();
    let mut migrator = RecordingMigrator::new();

    let (_, _) = execute(&ws, &mut migrator, &[]);

    assert_eq!(migrator.invoked_targets(), vec![Target::Primary]);
}

#[test]
fn custom_probe_and_scope_flag() {
    let ws = TestWorkspace::new();
    let plugin = ws.plugin("reports").create();
    let migrations = plugin.path.join("db");
    std::fs::create_dir_all(&migrations).unwrap();
    std::fs::write(migrations.join("0001_init.sql"), "").unwrap();

    let registry = ws.registry();
    let mut migrator = RecordingMigrator::new();
    let mut events: Vec<Event> = Vec::new();
    let result = MigrateAll::new(&registry, &mut migrator, &mut events)
        .with_probe(MigrationProbe::new("db", "sql"))
        .with_scope_flag("--source")
        .execute(&Invocation::from_argv(&[], &["--source"]).unwrap())
        .unwrap();

    assert_eq!(result, ExecutionResult::Success);
    assert_eq!(
        migrator.calls()[1],
        (plugin_target("reports"), argv(&["--source", "reports"]))
    );
}

#[test]
fn dependency_cycle_aborts_before_migrating() {
    let ws = TestWorkspace::new();
    ws.plugin("a").with_dependency("b").with_migration("1.php").create();
    ws.plugin("b").with_dependency("a").with_migration("1.php").create();

    let registry = ws.registry();
    let mut migrator = RecordingMigrator::new();
    let mut events: Vec<Event> = Vec::new();
    let err = MigrateAll::new(&registry, &mut migrator, &mut events)
        .execute(&invocation(&[]))
        .unwrap_err();

    migrate_all_test_utils::assert::contains(&err.to_string(), "circular");
    assert!(migrator.calls().is_empty());
}
