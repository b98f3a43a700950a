//! The resource correlation, classification, and recommendation engine
//!
//! A single-pass DAG over one query batch: resolve ownership, join the six
//! metric series into per-container records, classify into actionability
//! buckets, compute quantized recommendations, then score and rank.

mod aggregate;
mod classify;
mod ownership;
mod rank;
mod recommend;


pub use aggregate::{aggregate, MetricBatch};
pub use classify::{classify, Buckets, ClassifiedRecord};
pub use ownership::{resolve_ownership, Ownership};
pub use rank::{rank, score, MEMORY_SCORE_NORMALIZER_BYTES};
pub use recommend::{
    quantize_cpu, quantize_memory, recommend, Recommendations, CPU_STEP_MILLIS, MEMORY_FLOOR_MIB,
    MEMORY_STEP_MIB,
};
