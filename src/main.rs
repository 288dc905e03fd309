//! Salesboard: builds the sales dashboard from CSV exports
//!
//! This is the main entrypoint that wires loading, aggregation, segmentation
//! and rendering together.

use anyhow::{Context, Result};
use clap::Parser;
use salesboard::{customer_stats, load_tables, monthly_revenue, viz, Args};
use std::time::Instant;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(&args.log_level);

    if args.verbose {
        println!("Salesboard - Revenue Dashboard");
        println!("==============================\n");
    }

    let start_time = Instant::now();

    // Step 1: Load and clean the input tables
    if args.verbose {
        println!("Step 1: Loading data from {}", args.data_dir.display());
    }
    let data_start = Instant::now();
    let tables = load_tables(&args.data_dir)
        .with_context(|| format!("failed to load input tables from {}", args.data_dir.display()))?;
    let data_time = data_start.elapsed();

    println!(
        "✓ Data loaded: {} orders, {} customers, {} products",
        tables.orders.len(),
        tables.customers.len(),
        tables.products.len()
    );
    if args.verbose {
        println!("  Processing time: {:.2}s", data_time.as_secs_f64());
    }

    // Step 2: Aggregate revenue and segment customers
    if args.verbose {
        println!("\nStep 2: Aggregating revenue");
    }
    let monthly = monthly_revenue(&tables.orders);
    let report = customer_stats(&tables.orders, &tables.customers);
    tracing::info!(
        months = monthly.len(),
        customers = report.stats.len(),
        "Aggregation complete"
    );

    viz::print_summary(&monthly, &report);

    // Step 3: Render the dashboard
    if args.verbose {
        println!("\nStep 3: Rendering dashboard");
        println!("  Output file: {}", args.output.display());
    }
    let viz_start = Instant::now();
    viz::render_dashboard(&monthly, &report.stats, &args.output)
        .with_context(|| format!("failed to render dashboard to {}", args.output.display()))?;
    let viz_time = viz_start.elapsed();

    println!("\n✓ Dashboard generated");
    if args.verbose {
        println!("  Rendering time: {:.2}s", viz_time.as_secs_f64());
    }

    println!("\n=== Pipeline Complete ===");
    println!(
        "Total processing time: {:.2}s",
        start_time.elapsed().as_secs_f64()
    );
    println!("Dashboard saved to: {}", args.output.display());

    Ok(())
}

/// Initialise the global `tracing` subscriber, logging to stderr.
///
/// Falls back to `info` when the directive does not parse.
fn setup_logging(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
