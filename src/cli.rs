//! Command-line interface definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;

/// Sales dashboard: revenue trend, top customers and value segments from CSV exports
///
/// Every option has a default, so running without arguments reads the CSV
/// files from the current directory.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory containing orders.csv, customers.csv and products.csv
    #[arg(short, long, env = "SALESBOARD_DATA_DIR", default_value = ".")]
    pub data_dir: PathBuf,

    /// Output path for the dashboard image
    #[arg(short, long, env = "SALESBOARD_OUTPUT", default_value = "dashboard.png")]
    pub output: PathBuf,

    /// Log filter directive (e.g. "info", "salesboard=debug")
    #[arg(long, env = "SALESBOARD_LOG", default_value = "info")]
    pub log_level: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
