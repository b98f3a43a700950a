//! Kubernetes workload resource optimizer CLI
//!
//! Queries historical usage and allocation metrics, recommends right-sized
//! CPU/memory requests per workload container, and ranks the results by
//! projected savings.

mod config;
mod output;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use optimizer_lib::error::OptimizerError;
use optimizer_lib::pipeline::{Pipeline, PipelineConfig};
use optimizer_lib::prom::{PrometheusClient, QuerySet};
use optimizer_lib::report::{JsonFileSink, ReportSink};

use config::OptimizerConfig;
use output::OutputFormat;

/// Kubernetes workload resource optimizer
#[derive(Parser)]
#[command(name = "kro")]
#[command(author, version, about = "Right-size workload resource requests from historical metrics", long_about = None)]
pub struct Cli {
    /// Metrics backend URL (can also be set via KRO_PROMETHEUS_URL env var)
    #[arg(long, env = "KRO_PROMETHEUS_URL")]
    pub prometheus_url: Option<String>,

    /// Lookback window in hours
    #[arg(long, env = "KRO_LOOKBACK_HOURS")]
    pub lookback_hours: Option<f64>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze workloads and rank right-sizing recommendations
    Analyze {
        /// Write the full report as JSON to this path
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Number of scored rows shown in the table report
        #[arg(long, default_value_t = 10)]
        top: usize,
    },

    /// Print the PromQL query set and exit
    Queries,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut cfg = OptimizerConfig::load()?;
    if let Some(url) = cli.prometheus_url {
        cfg.prometheus_url = url;
    }
    if let Some(hours) = cli.lookback_hours {
        cfg.lookback_hours = hours;
    }

    match cli.command {
        Commands::Analyze { output, top } => analyze(&cfg, cli.format, output, top).await,
        Commands::Queries => {
            print_queries(&cfg);
            Ok(())
        }
    }
}

async fn analyze(
    cfg: &OptimizerConfig,
    format: OutputFormat,
    output_path: Option<PathBuf>,
    top: usize,
) -> Result<()> {
    let backend = PrometheusClient::new(
        &cfg.prometheus_url,
        Duration::from_secs(cfg.query_timeout_secs),
    )
    .map_err(OptimizerError::Backend)?;

    let pipeline = Pipeline::new(
        Arc::new(backend),
        PipelineConfig {
            lookback_hours: cfg.lookback_hours,
            query_timeout: Duration::from_secs(cfg.query_timeout_secs),
            deadline: Duration::from_secs(cfg.deadline_secs),
        },
    );

    let report = pipeline.run(Utc::now()).await?;

    for warning in &report.warnings {
        output::print_warning(&format!("{}: {}", warning.query, warning.detail));
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => output::print_report(&report, top),
    }

    if let Some(path) = output_path {
        JsonFileSink::new(&path).write(&report)?;
        output::print_success(&format!("Report written to {}", path.display()));
    }

    Ok(())
}

fn print_queries(cfg: &OptimizerConfig) {
    let queries = QuerySet::new(cfg.lookback_hours);
    println!("cpu_usage:          {}", queries.cpu_usage());
    println!("memory_usage:       {}", queries.memory_usage());
    println!("cpu_requests:       {}", queries.cpu_requests());
    println!("cpu_limits:         {}", queries.cpu_limits());
    println!("memory_requests:    {}", queries.memory_requests());
    println!("memory_limits:      {}", queries.memory_limits());
    println!("indirect_ownership: {}", queries.indirect_ownership());
    println!("direct_ownership:   {}", queries.direct_ownership());
}
