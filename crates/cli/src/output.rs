//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use optimizer_lib::models::OptimizationReport;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Row for the ranked recommendations table
#[derive(Tabled)]
struct RecommendationRow {
    #[tabled(rename = "Workload")]
    workload: String,
    #[tabled(rename = "Container")]
    container: String,
    #[tabled(rename = "CPU Req")]
    cpu_request: String,
    #[tabled(rename = "CPU Rec")]
    cpu_recommended: String,
    #[tabled(rename = "Mem Req")]
    memory_request: String,
    #[tabled(rename = "Mem Rec")]
    memory_recommended: String,
    #[tabled(rename = "Score")]
    score: String,
}

/// Render the top-N scored recommendations plus run totals.
pub fn print_report(report: &OptimizationReport, top: usize) {
    if report.ranked.is_empty() {
        print_warning("No scored recommendations");
    } else {
        let rows: Vec<RecommendationRow> = report
            .ranked
            .iter()
            .take(top)
            .map(|scored| {
                let r = &scored.recommendation;
                RecommendationRow {
                    workload: format!(
                        "{}/{}/{}",
                        r.controller.namespace, r.controller.kind, r.controller.name
                    ),
                    container: r.container.clone(),
                    cpu_request: format_cpu(r.current.requests.cpu),
                    cpu_recommended: format_cpu(r.recommended.cpu),
                    memory_request: format_bytes(r.current.requests.memory),
                    memory_recommended: format_bytes(r.recommended.memory),
                    score: format!("{:.3}", scored.score),
                }
            })
            .collect();

        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!("{}", table);
    }

    let buckets = &report.buckets;
    println!(
        "\nScored: {} ({} shown) | Unscored candidates: {} | Buckets: {} qualified, {} cpu-only, {} mem-only",
        report.ranked.len(),
        report.ranked.len().min(top),
        report.unscored.len(),
        buckets.qualified,
        buckets.cpu_qualified,
        buckets.memory_qualified,
    );
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

/// Format CPU cores as a human-readable string
pub fn format_cpu(cores: Option<f64>) -> String {
    match cores {
        None => "-".to_string(),
        Some(cores) if cores >= 1.0 => format!("{:.2}", cores),
        Some(cores) => format!("{}m", (cores * 1000.0).round() as u64),
    }
}

/// Format bytes as a human-readable string
pub fn format_bytes(bytes: Option<f64>) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    match bytes {
        None => "-".to_string(),
        Some(bytes) if bytes >= GB => format!("{:.2}Gi", bytes / GB),
        Some(bytes) if bytes >= MB => format!("{:.2}Mi", bytes / MB),
        Some(bytes) if bytes >= KB => format!("{:.2}Ki", bytes / KB),
        Some(bytes) => format!("{}B", bytes as u64),
    }
}
