//! Recommendation computation
//!
//! Recommends a quantized request per dimension from peak observed usage:
//! CPU rounds up to the next 10 milli-cores (floor 10m), memory to the next
//! 10 MiB (floor 1 MiB). A dimension whose mean usage already meets or
//! exceeds its request keeps the current request instead of a peak-derived
//! figure, which in skewed distributions could land below it.

use tracing::debug;

use super::{Buckets, ClassifiedRecord};
use crate::models::{ComputeResources, Recommendation, UsageSummary};

const MIB: f64 = 1024.0 * 1024.0;

/// CPU quantization grid and floor, in milli-cores.
pub const CPU_STEP_MILLIS: f64 = 10.0;
/// Memory quantization grid in MiB.
pub const MEMORY_STEP_MIB: f64 = 10.0;
/// Memory floor in MiB.
pub const MEMORY_FLOOR_MIB: f64 = 1.0;

/// Recommendations split by whether a savings score can be computed.
#[derive(Debug, Default)]
pub struct Recommendations {
    /// From the qualified buckets: at least one request existed to compare
    /// against.
    pub scored: Vec<Recommendation>,
    /// From the candidates bucket: no prior request in either dimension.
    pub unscored: Vec<Recommendation>,
}

/// Round peak CPU usage (cores) up to the quantization grid.
pub fn quantize_cpu(peak_cores: f64) -> f64 {
    let millis = (peak_cores * 1000.0 / CPU_STEP_MILLIS).ceil() * CPU_STEP_MILLIS;
    millis.max(CPU_STEP_MILLIS) / 1000.0
}

/// Round peak memory usage (bytes) up to the quantization grid.
pub fn quantize_memory(peak_bytes: f64) -> f64 {
    let mib = (peak_bytes / MIB / MEMORY_STEP_MIB).ceil() * MEMORY_STEP_MIB;
    mib.max(MEMORY_FLOOR_MIB) * MIB
}

/// Compute recommendations for every actionable record.
pub fn recommend(buckets: &Buckets) -> Recommendations {
    let mut out = Recommendations::default();

    for classified in buckets
        .qualified
        .iter()
        .chain(&buckets.cpu_qualified)
        .chain(&buckets.memory_qualified)
    {
        // Actionable only when some present dimension sits under its request.
        let over_provisioned = classified.cpu_ratio.is_some_and(|r| r < 1.0)
            || classified.memory_ratio.is_some_and(|r| r < 1.0);
        if !over_provisioned {
            continue;
        }
        out.scored.push(build(classified));
    }

    // Candidates have no ratio to trigger on; they always get a figure.
    for classified in &buckets.candidates {
        out.unscored.push(build(classified));
    }

    debug!(
        scored = out.scored.len(),
        unscored = out.unscored.len(),
        "Recommendations computed"
    );

    out
}

fn build(classified: &ClassifiedRecord) -> Recommendation {
    let record = &classified.record;
    let recommended = ComputeResources {
        cpu: recommend_dimension(
            record.usage.cpu_max(),
            record.allocation.requests.cpu,
            classified.cpu_ratio,
            quantize_cpu,
        ),
        memory: recommend_dimension(
            record.usage.memory_max(),
            record.allocation.requests.memory,
            classified.memory_ratio,
            quantize_memory,
        ),
    };

    Recommendation {
        controller: record.key.controller.clone(),
        container: record.key.container.clone(),
        usage: UsageSummary::of(&record.usage),
        current: record.allocation,
        recommended,
    }
}

fn recommend_dimension(
    peak: Option<f64>,
    request: Option<f64>,
    ratio: Option<f64>,
    quantize: fn(f64) -> f64,
) -> Option<f64> {
    match ratio {
        // Saturation override: the request is already at or below mean usage.
        Some(r) if r >= 1.0 => request,
        _ => match peak {
            Some(peak) => Some(quantize(peak)),
            // No samples for this dimension: keep the declared request, or
            // stay absent when none exists.
            None => request,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::classify;
    use crate::models::{ControllerKey, RecordKey, ResourceRecord};
    use std::collections::BTreeMap;

    const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

    fn classified(
        cpu_samples: &[f64],
        memory_samples: &[f64],
        cpu_request: Option<f64>,
        memory_request: Option<f64>,
    ) -> Buckets {
        let key = RecordKey {
            controller: ControllerKey {
                namespace: "prod".to_string(),
                kind: "Deployment".to_string(),
                name: "web".to_string(),
            },
            container: "app".to_string(),
        };
        let mut record = ResourceRecord::empty(key.clone(), 168.0);
        record.usage.cpu_samples = cpu_samples.to_vec();
        record.usage.memory_samples = memory_samples.to_vec();
        record.allocation.requests.cpu = cpu_request;
        record.allocation.requests.memory = memory_request;
        classify([(key, record)].into_iter().collect::<BTreeMap<_, _>>())
    }

    #[test]
    fn test_cpu_quantization_grid_and_floor() {
        // 123m rounds up to 130m.
        assert!((quantize_cpu(0.123) - 0.13).abs() < 1e-9);
        // Exact multiples stay put.
        assert!((quantize_cpu(0.25) - 0.25).abs() < 1e-9);
        // Tiny usage floors at 10m.
        assert!((quantize_cpu(0.0001) - 0.01).abs() < 1e-9);
        assert!((quantize_cpu(0.0) - 0.01).abs() < 1e-9);
    }

    #[test]
    fn test_memory_quantization_grid_and_floor() {
        // 123 MiB rounds up to 130 MiB.
        assert_eq!(quantize_memory(123.0 * 1024.0 * 1024.0), 130.0 * 1024.0 * 1024.0);
        // Sub-MiB usage floors at 1 MiB (not the 10 MiB grid).
        assert_eq!(quantize_memory(0.0), 1024.0 * 1024.0);
        // Anything above zero that quantizes lands on the 10 MiB grid.
        assert_eq!(quantize_memory(1.0), 10.0 * 1024.0 * 1024.0);
    }

    #[test]
    fn test_quantization_monotonic() {
        let mut last = 0.0;
        for step in 1..200 {
            let peak = step as f64 * 0.013;
            let q = quantize_cpu(peak);
            assert!(q >= last, "quantize_cpu not monotonic at {}", peak);
            assert!(q >= peak);
            last = q;
        }
    }

    #[test]
    fn test_over_provisioned_record_recommended() {
        let buckets = classified(&[0.1, 0.2], &[1.0 * GIB], Some(2.0), Some(4.0 * GIB));
        let recs = recommend(&buckets);

        assert_eq!(recs.scored.len(), 1);
        let rec = &recs.scored[0];
        // Peak 0.2 cores -> 200m, already on the grid.
        assert_eq!(rec.recommended.cpu, Some(0.2));
        // Peak 1 GiB = 1024 MiB, on the 10 MiB grid -> 1030 MiB.
        assert_eq!(rec.recommended.memory, Some(1030.0 * 1024.0 * 1024.0));
    }

    #[test]
    fn test_saturated_record_not_recommended() {
        // Mean usage meets both requests; nothing to reclaim.
        let buckets = classified(&[2.0, 2.0], &[4.0 * GIB], Some(2.0), Some(4.0 * GIB));
        let recs = recommend(&buckets);
        assert!(recs.scored.is_empty());
    }

    #[test]
    fn test_saturation_override_returns_request_exactly() {
        // CPU undersized (mean 3.0 over request 2.0), memory over-provisioned.
        let buckets = classified(&[1.0, 5.0], &[1.0 * GIB], Some(2.0), Some(4.0 * GIB));
        let recs = recommend(&buckets);

        assert_eq!(recs.scored.len(), 1);
        let rec = &recs.scored[0];
        // The peak-derived 5.0 figure is discarded for the exact request.
        assert_eq!(rec.recommended.cpu, Some(2.0));
        assert_eq!(rec.recommended.memory, Some(1030.0 * 1024.0 * 1024.0));
    }

    #[test]
    fn test_partial_bucket_missing_dimension_stays_absent() {
        // cpu_qualified: no memory request, no memory samples.
        let buckets = classified(&[0.1], &[], Some(1.0), None);
        let recs = recommend(&buckets);

        assert_eq!(recs.scored.len(), 1);
        let rec = &recs.scored[0];
        assert_eq!(rec.recommended.cpu, Some(0.1));
        assert_eq!(rec.recommended.memory, None);
    }

    #[test]
    fn test_candidates_always_recommended_and_unscored() {
        // No requests at all, usage well-behaved: still recommended.
        let buckets = classified(&[0.05], &[100.0 * 1024.0 * 1024.0], None, None);
        let recs = recommend(&buckets);

        assert!(recs.scored.is_empty());
        assert_eq!(recs.unscored.len(), 1);
        let rec = &recs.unscored[0];
        assert_eq!(rec.recommended.cpu, Some(0.05));
        assert_eq!(rec.recommended.memory, Some(100.0 * 1024.0 * 1024.0));
        assert_eq!(rec.current.requests.cpu, None);
    }

    #[test]
    fn test_dimension_without_samples_falls_back_to_request() {
        // Memory request declared but no memory samples arrived (that query
        // may have failed); CPU over-provisioned so the record triggers.
        let buckets = classified(&[0.1], &[], Some(1.0), Some(2.0 * GIB));
        let recs = recommend(&buckets);

        assert_eq!(recs.scored.len(), 1);
        assert_eq!(recs.scored[0].recommended.memory, Some(2.0 * GIB));
    }
}
