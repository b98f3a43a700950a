//! Ownership resolution
//!
//! Maps every running pod to the controller that owns it, and enumerates the
//! (controller, container) universe that seeds the usage join. Pods owned by
//! a Job are one-shot batch work and are excluded outright.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::models::{ControllerKey, InstanceKey, MetricSeries, RecordKey, ResourceRecord};

/// Kind assigned to workloads reached through the ReplicaSet join.
const INDIRECT_KIND: &str = "Deployment";

/// The resolved ownership state of one run.
#[derive(Debug, Default)]
pub struct Ownership {
    instances: HashMap<InstanceKey, ControllerKey>,
    seeds: BTreeMap<RecordKey, ResourceRecord>,
}

impl Ownership {
    /// Resolve a running instance to its controller, if ownership is known.
    pub fn controller_for(&self, namespace: &str, pod: &str) -> Option<&ControllerKey> {
        self.instances.get(&InstanceKey {
            namespace: namespace.to_string(),
            pod: pod.to_string(),
        })
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Empty records for every (controller, container) pair observed running.
    pub fn seed_records(&self) -> BTreeMap<RecordKey, ResourceRecord> {
        self.seeds.clone()
    }
}

/// Build the instance-to-controller map and the join seed from the two
/// ownership result sets.
///
/// When a pod appears in both sets, the indirect (ReplicaSet-mediated)
/// mapping wins: it carries the collapsed top-level workload identity. The
/// outcome is independent of fetch order. Entries missing any identifying
/// label are dropped whole.
pub fn resolve_ownership(
    indirect: &[MetricSeries],
    direct: &[MetricSeries],
    window_hours: f64,
) -> Ownership {
    let mut instances = HashMap::new();

    // Direct owners first so the indirect pass overrides on conflict.
    for series in direct {
        let Some((instance, controller)) = direct_entry(series) else {
            continue;
        };
        if controller.kind == "Job" {
            debug!(pod = %instance.pod, "Skipping Job-owned instance");
            continue;
        }
        instances.insert(instance, controller);
    }

    for series in indirect {
        let Some((instance, controller)) = indirect_entry(series) else {
            continue;
        };
        instances.insert(instance, controller);
    }

    // Seed against the final mapping, so a pod remapped by the indirect pass
    // only contributes its winning controller to the universe.
    let mut seeds = BTreeMap::new();
    for series in indirect.iter().chain(direct) {
        let (Some(namespace), Some(pod), Some(container)) = (
            series.label("namespace"),
            series.label("pod"),
            series.label("container"),
        ) else {
            continue;
        };
        if container.is_empty() {
            continue;
        }
        let Some(controller) = instances.get(&InstanceKey {
            namespace: namespace.to_string(),
            pod: pod.to_string(),
        }) else {
            continue;
        };
        let key = RecordKey {
            controller: controller.clone(),
            container: container.to_string(),
        };
        seeds
            .entry(key.clone())
            .or_insert_with(|| ResourceRecord::empty(key, window_hours));
    }

    debug!(
        instances = instances.len(),
        seeds = seeds.len(),
        "Ownership resolved"
    );

    Ownership { instances, seeds }
}

fn indirect_entry(series: &MetricSeries) -> Option<(InstanceKey, ControllerKey)> {
    let namespace = non_empty(series.label("namespace"))?;
    let pod = non_empty(series.label("pod"))?;
    let workload = non_empty(series.label("workload"))?;
    Some((
        InstanceKey {
            namespace: namespace.to_string(),
            pod: pod.to_string(),
        },
        ControllerKey {
            namespace: namespace.to_string(),
            kind: INDIRECT_KIND.to_string(),
            name: workload.to_string(),
        },
    ))
}

fn direct_entry(series: &MetricSeries) -> Option<(InstanceKey, ControllerKey)> {
    let namespace = non_empty(series.label("namespace"))?;
    let pod = non_empty(series.label("pod"))?;
    let kind = non_empty(series.label("owner_kind"))?;
    let name = non_empty(series.label("owner_name"))?;
    Some((
        InstanceKey {
            namespace: namespace.to_string(),
            pod: pod.to_string(),
        },
        ControllerKey {
            namespace: namespace.to_string(),
            kind: kind.to_string(),
            name: name.to_string(),
        },
    ))
}

fn non_empty(label: Option<&str>) -> Option<&str> {
    label.filter(|v| !v.is_empty())
}
