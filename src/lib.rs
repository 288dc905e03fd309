//! Salesboard: revenue reporting over order, customer and product CSV exports
//!
//! The pipeline loads and cleans the three tables, aggregates revenue per month
//! and per customer, assigns each customer a value tier and renders a
//! four-panel dashboard.

pub mod aggregate;
pub mod cli;
pub mod data;
pub mod error;
pub mod segment;
pub mod viz;

// Re-export public items for easier access
pub use aggregate::{
    customer_stats, monthly_revenue, top_customers, CustomerReport, CustomerStats, MonthlyRevenue,
};
pub use cli::Args;
pub use data::{load_tables, Customer, CustomerId, Order, OrderMonth, Product, Tables};
pub use error::{DashboardError, Result};
pub use segment::{segment_counts, Segment};
pub use viz::render_dashboard;
