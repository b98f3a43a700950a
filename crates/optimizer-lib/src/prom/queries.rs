//! PromQL expressions issued by the pipeline
//!
//! Six usage/allocation queries over the lookback window plus two ownership
//! queries. Usage is fetched as a range at 5-minute steps so the per-record
//! sample series is preserved; allocations and ownership are point-in-time
//! instant vectors.

/// Resolution of the usage range queries, matching the 5m rate window.
pub const USAGE_STEP_SECS: u64 = 300;

/// Builder for the fixed query set of one run.
#[derive(Debug, Clone)]
pub struct QuerySet {
    lookback_hours: f64,
}

impl QuerySet {
    pub fn new(lookback_hours: f64) -> Self {
        Self { lookback_hours }
    }

    pub fn lookback_hours(&self) -> f64 {
        self.lookback_hours
    }

    /// Per-container CPU usage in cores, one sample per step.
    pub fn cpu_usage(&self) -> String {
        "sum by (namespace, pod, container) \
         (irate(container_cpu_usage_seconds_total[5m]))"
            .to_string()
    }

    /// Per-container memory working set in bytes, one sample per step.
    pub fn memory_usage(&self) -> String {
        "sum by (namespace, pod, container) \
         (container_memory_working_set_bytes)"
            .to_string()
    }

    pub fn cpu_requests(&self) -> String {
        resource_allocation("kube_pod_container_resource_requests", "cpu")
    }

    pub fn cpu_limits(&self) -> String {
        resource_allocation("kube_pod_container_resource_limits", "cpu")
    }

    pub fn memory_requests(&self) -> String {
        resource_allocation("kube_pod_container_resource_requests", "memory")
    }

    pub fn memory_limits(&self) -> String {
        resource_allocation("kube_pod_container_resource_limits", "memory")
    }

    /// Pods owned through a ReplicaSet, collapsed to the top-level workload.
    ///
    /// The `kube_pod_owner` × `kube_replicaset_owner` join resolves the
    /// intermediate ReplicaSet to its Deployment; the trailing
    /// `kube_pod_container_info` join carries the container label so the
    /// result enumerates every running (workload, container) pair.
    pub fn indirect_ownership(&self) -> String {
        "max by (namespace, pod, container, workload) (\
           label_replace(\
             label_replace(kube_pod_owner{owner_kind=\"ReplicaSet\"}, \
               \"replicaset\", \"$1\", \"owner_name\", \"(.+)\") \
             * on (namespace, replicaset) group_left (owner_name) \
               topk by (namespace, replicaset) (1, \
                 max by (namespace, replicaset, owner_name) (kube_replicaset_owner)), \
             \"workload\", \"$1\", \"owner_name\", \"(.+)\") \
           * on (namespace, pod) group_left (container) kube_pod_container_info\
         )"
        .to_string()
    }

    /// Pods owned directly by any non-ReplicaSet controller kind.
    pub fn direct_ownership(&self) -> String {
        "max by (namespace, pod, container, owner_kind, owner_name) (\
           kube_pod_owner{owner_kind!=\"ReplicaSet\"} \
           * on (namespace, pod) group_left (container) kube_pod_container_info\
         )"
        .to_string()
    }
}

fn resource_allocation(metric: &str, resource: &str) -> String {
    format!(
        "sum by (namespace, pod, container) ({}{{resource=\"{}\"}})",
        metric, resource
    )
}
