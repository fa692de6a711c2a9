//! Stable topological scheduling of one helper stage.

use std::collections::{HashMap, HashSet};

use super::{Diagnostic, HelperDescriptor};

/// Execution plan of a stage.
#[derive(Debug, Default)]
pub(crate) struct Schedule {
    /// Indices of helpers to run, in order.
    pub order: Vec<usize>,
    /// Indices of helpers that will not run.
    pub skipped: Vec<usize>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Order the helpers of one stage.
///
/// `available` holds keys completed by earlier stages; `upstream_skipped`
/// holds keys of earlier helpers that were skipped. Ready helpers run by
/// descending priority, then registration order. A dependency that is
/// neither registered nor available skips the helper with a
/// `missing-dependency` diagnostic, as does membership in a cycle.
/// Dependants of skipped or cyclic helpers are skipped without a diagnostic.
pub(crate) fn schedule(
    helpers: &[&HelperDescriptor],
    available: &HashSet<String>,
    upstream_skipped: &HashSet<String>,
) -> Schedule {
    let index: HashMap<&str, usize> = helpers
        .iter()
        .enumerate()
        .map(|(i, helper)| (helper.key.as_str(), i))
        .collect();

    let mut plan = Schedule::default();
    let mut skipped = vec![false; helpers.len()];

    for (i, helper) in helpers.iter().enumerate() {
        for dependency in &helper.depends_on {
            if upstream_skipped.contains(dependency) {
                skipped[i] = true;
                break;
            }
            if !index.contains_key(dependency.as_str()) && !available.contains(dependency) {
                plan.diagnostics.push(Diagnostic::missing_dependency(
                    &helper.key,
                    helper.kind,
                    dependency,
                ));
                skipped[i] = true;
                break;
            }
        }
    }

    // Propagate skips to in-stage dependants.
    let mut changed = true;
    while changed {
        changed = false;
        for (i, helper) in helpers.iter().enumerate() {
            if skipped[i] {
                continue;
            }
            let blocked = helper
                .depends_on
                .iter()
                .filter_map(|dependency| index.get(dependency.as_str()))
                .any(|&dependency| skipped[dependency]);
            if blocked {
                skipped[i] = true;
                changed = true;
            }
        }
    }

    let mut done = vec![false; helpers.len()];
    let ready = |i: usize, done: &[bool]| {
        helpers[i]
            .depends_on
            .iter()
            .filter_map(|dependency| index.get(dependency.as_str()))
            .all(|&dependency| done[dependency])
    };

    loop {
        let next = (0..helpers.len())
            .filter(|&i| !skipped[i] && !done[i] && ready(i, &done))
            .min_by(|&a, &b| {
                helpers[b]
                    .priority
                    .cmp(&helpers[a].priority)
                    .then_with(|| a.cmp(&b))
            });
        let Some(next) = next else {
            break;
        };
        done[next] = true;
        plan.order.push(next);
    }

    // Leftovers are blocked by a cycle. Only helpers on the cycle are
    // reported; helpers that merely depend on one are skipped silently.
    let pending: Vec<Vec<usize>> = helpers
        .iter()
        .enumerate()
        .map(|(i, helper)| {
            if skipped[i] || done[i] {
                return Vec::new();
            }
            helper
                .depends_on
                .iter()
                .filter_map(|dependency| index.get(dependency.as_str()).copied())
                .filter(|&dependency| !skipped[dependency] && !done[dependency])
                .collect()
        })
        .collect();

    for i in 0..helpers.len() {
        if skipped[i] {
            plan.skipped.push(i);
        } else if !done[i] {
            let on_cycle = pending[i]
                .iter()
                .copied()
                .find(|&dependency| reaches(&pending, dependency, i));
            if let Some(dependency) = on_cycle {
                plan.diagnostics.push(Diagnostic::dependency_cycle(
                    &helpers[i].key,
                    helpers[i].kind,
                    &helpers[dependency].key,
                ));
            }
            plan.skipped.push(i);
        }
    }

    plan
}

/// Whether `target` is reachable from `from` along `edges`.
fn reaches(edges: &[Vec<usize>], from: usize, target: usize) -> bool {
    let mut seen = vec![false; edges.len()];
    let mut stack = vec![from];
    while let Some(node) = stack.pop() {
        if node == target {
            return true;
        }
        if !std::mem::replace(&mut seen[node], true) {
            stack.extend(&edges[node]);
        }
    }
    false
}
