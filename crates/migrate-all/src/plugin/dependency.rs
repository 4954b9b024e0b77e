//! Plugin load order using topological sort.
//!
//! Dependencies come before dependents, so a plugin's migrations always
//! run after the migrations of every plugin it builds on. Uses Kahn's
//! algorithm with alphabetical tie-breaking for a stable order.

use std::collections::{HashMap, HashSet, VecDeque};

use super::manifest::PluginManifest;
use crate::error::MigrateError;

/// Resolve plugin load order based on dependencies.
///
/// # Errors
/// - A plugin declares a dependency that is not in `plugins`
/// - There is a circular dependency
pub fn resolve_load_order(
    plugins: &HashMap<String, PluginManifest>,
) -> Result<Vec<String>, MigrateError> {
    // in_degree[p] = number of plugins that must be migrated before p
    let mut in_degree: HashMap<&str, usize> = HashMap::new();
    let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();

    for name in plugins.keys() {
        in_degree.insert(name, 0);
        dependents.entry(name.as_str()).or_default();
    }

    for (name, manifest) in plugins {
        let deps: HashSet<&str> = manifest.dependencies.iter().map(String::as_str).collect();
        for dep in deps {
            if !plugins.contains_key(dep) {
                return Err(MigrateError::missing_dependency(name, dep));
            }
            if let Some(degree) = in_degree.get_mut(name.as_str()) {
                *degree += 1;
            }
            dependents.entry(dep).or_default().push(name);
        }
    }

    let mut result = Vec::with_capacity(plugins.len());
    let mut queue: VecDeque<&str> = VecDeque::new();

    let mut roots: Vec<&str> = in_degree
        .iter()
        .filter(|(_, d)| **d == 0)
        .map(|(name, _)| *name)
        .collect();
    roots.sort_unstable();
    queue.extend(roots);

    while let Some(plugin) = queue.pop_front() {
        result.push(plugin.to_string());

        if let Some(deps) = dependents.get(plugin) {
            let mut newly_ready: Vec<&str> = Vec::new();
            for dependent in deps {
                if let Some(degree) = in_degree.get_mut(*dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        newly_ready.push(*dependent);
                    }
                }
            }
            newly_ready.sort_unstable();
            queue.extend(newly_ready);
        }
    }

    if result.len() != plugins.len() {
        let loaded: HashSet<_> = result.iter().map(String::as_str).collect();
        let mut in_cycle: Vec<_> = plugins
            .keys()
            .filter(|k| !loaded.contains(k.as_str()))
            .cloned()
            .collect();
        in_cycle.sort_unstable();

        return Err(MigrateError::CircularDependency {
            cycle: in_cycle.join(", "),
        });
    }

    Ok(result)
}
