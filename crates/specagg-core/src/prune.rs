//! Reachability-based removal of unused schemas

use crate::aggregate::AggregatedSpec;
use crate::document::collect_schema_refs;
use std::collections::{HashSet, VecDeque};

/// Names of all schemas transitively referenced from the paths and the
/// security schemes of `spec`.
///
/// Names that are referenced but not defined are part of the result; they
/// are simply never expanded.
pub fn reachable_schemas(spec: &AggregatedSpec) -> HashSet<String> {
    let mut seeds = HashSet::new();
    for item in spec.paths.values() {
        for operation in item.values() {
            collect_schema_refs(operation, &mut seeds);
        }
    }
    for scheme in spec.components.security_schemes.values() {
        collect_schema_refs(scheme, &mut seeds);
    }

    let mut queue: VecDeque<String> = seeds.into_iter().collect();
    let mut reached = HashSet::new();

    while let Some(name) = queue.pop_front() {
        if !reached.insert(name.clone()) {
            continue;
        }
        if let Some(schema) = spec.components.schemas.get(&name) {
            let mut found = HashSet::new();
            collect_schema_refs(schema, &mut found);
            queue.extend(found.into_iter().filter(|n| !reached.contains(n)));
        }
    }

    reached
}

/// Drop schemas not reachable from any retained operation or security
/// scheme. Returns the number of schemas removed. The surviving schemas
/// keep their merge order.
pub fn prune_unused_schemas(spec: &mut AggregatedSpec) -> usize {
    let reachable = reachable_schemas(spec);
    let before = spec.components.schemas.len();
    spec.components
        .schemas
        .retain(|name, _| reachable.contains(name));
    let removed = before - spec.components.schemas.len();
    if removed > 0 {
        tracing::debug!(removed, kept = spec.components.schemas.len(), "pruned unused schemas");
    }
    removed
}
