//! Workload right-sizing engine
//!
//! This crate provides the core functionality for:
//! - Ownership resolution from pod-owner metric series
//! - Joining usage and allocation series into per-container records
//! - Classification into actionability buckets
//! - Quantized resource recommendations
//! - Savings scoring and ranking

pub mod engine;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod prom;
pub mod report;

pub use error::{OptimizerError, Warning};
pub use models::*;
pub use pipeline::{Pipeline, PipelineConfig};
