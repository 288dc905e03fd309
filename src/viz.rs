//! Dashboard rendering using Plotters

use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::aggregate::{top_customers, CustomerReport, CustomerStats, MonthlyRevenue};
use crate::error::Result;
use crate::segment::{segment_counts, Segment};

/// Pixel size of the full four-panel figure
pub const DASHBOARD_SIZE: (u32, u32) = (1200, 800);

/// Number of customers shown in the ranking panel
pub const TOP_CUSTOMERS: usize = 10;

const LINE_COLOR: RGBColor = RGBColor(31, 119, 180);
const BAR_COLOR: RGBColor = RGBColor(255, 127, 14);
const POINT_COLOR: RGBColor = RGBColor(44, 160, 44);

fn segment_color(segment: Segment) -> RGBColor {
    match segment {
        Segment::High => RGBColor(214, 39, 40),
        Segment::Medium => RGBColor(148, 103, 189),
        Segment::Low => RGBColor(127, 127, 127),
    }
}

/// Render the four-panel dashboard to a PNG file
///
/// # Arguments
/// * `monthly` - Revenue per month in chronological order
/// * `stats` - Per-customer statistics with segments assigned
/// * `output_path` - Path to save the PNG figure
///
/// Panels, left to right and top to bottom: monthly revenue trend, top
/// customers by revenue, order count vs revenue, customers per segment.
pub fn render_dashboard(
    monthly: &[MonthlyRevenue],
    stats: &[CustomerStats],
    output_path: &Path,
) -> Result<()> {
    let root = BitMapBackend::new(output_path, DASHBOARD_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let panels = root.split_evenly((2, 2));
    draw_monthly_revenue(&panels[0], monthly)?;
    draw_top_customers(&panels[1], &top_customers(stats, TOP_CUSTOMERS))?;
    draw_orders_vs_revenue(&panels[2], stats)?;
    draw_segment_counts(&panels[3], &segment_counts(stats))?;

    root.present()?;
    tracing::info!("Dashboard saved to {}", output_path.display());

    Ok(())
}

/// Line chart of revenue per month
pub fn draw_monthly_revenue<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    monthly: &[MonthlyRevenue],
) -> Result<()> {
    let labels: Vec<String> = monthly.iter().map(|row| row.order_month.to_string()).collect();
    let points: Vec<(f64, f64)> = monthly
        .iter()
        .enumerate()
        .map(|(i, row)| (i as f64, row.revenue))
        .collect();
    let y_max = value_ceiling(monthly.iter().map(|row| row.revenue));

    let mut chart = ChartBuilder::on(area)
        .caption("Monthly Revenue Trend", ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(category_range(labels.len()), 0f64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len().max(1))
        .x_label_formatter(&|x| category_label(&labels, *x))
        .x_desc("Month")
        .y_desc("Revenue")
        .axis_desc_style(("sans-serif", 14))
        .draw()?;

    chart.draw_series(LineSeries::new(points.iter().copied(), &LINE_COLOR))?;
    chart.draw_series(
        points
            .iter()
            .map(|&point| Circle::new(point, 3, LINE_COLOR.filled())),
    )?;

    Ok(())
}

/// Bar chart of the highest-revenue customers, already ranked
pub fn draw_top_customers<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    top: &[CustomerStats],
) -> Result<()> {
    let labels: Vec<String> = top.iter().map(|row| row.full_name.clone()).collect();
    let y_max = value_ceiling(top.iter().map(|row| row.total_revenue));

    let mut chart = ChartBuilder::on(area)
        .caption("Top 10 Customers by Total Revenue", ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(category_range(labels.len()), 0f64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len().max(1))
        .x_label_formatter(&|x| category_label(&labels, *x))
        .x_label_style(("sans-serif", 10))
        .x_desc("Customer")
        .y_desc("Revenue")
        .axis_desc_style(("sans-serif", 14))
        .draw()?;

    chart.draw_series(top.iter().enumerate().map(|(i, row)| {
        let x = i as f64;
        Rectangle::new([(x - 0.4, 0.0), (x + 0.4, row.total_revenue)], BAR_COLOR.filled())
    }))?;

    Ok(())
}

/// Scatter of order count against total revenue, one point per customer
pub fn draw_orders_vs_revenue<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    stats: &[CustomerStats],
) -> Result<()> {
    let x_max = stats.iter().map(|row| row.order_count).max().unwrap_or(1) as f64 + 1.0;
    let y_max = value_ceiling(stats.iter().map(|row| row.total_revenue));

    let mut chart = ChartBuilder::on(area)
        .caption("Orders vs Total Revenue", ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..x_max, 0f64..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Number of Orders")
        .y_desc("Total Revenue")
        .axis_desc_style(("sans-serif", 14))
        .draw()?;

    chart.draw_series(stats.iter().map(|row| {
        Circle::new(
            (row.order_count as f64, row.total_revenue),
            4,
            POINT_COLOR.filled(),
        )
    }))?;

    Ok(())
}

/// Bar chart of customers per value tier
pub fn draw_segment_counts<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    counts: &[(Segment, usize)],
) -> Result<()> {
    let labels: Vec<String> = counts.iter().map(|(segment, _)| segment.to_string()).collect();
    let y_max = value_ceiling(counts.iter().map(|&(_, count)| count as f64));

    let mut chart = ChartBuilder::on(area)
        .caption("Customer Segmentation", ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(category_range(labels.len()), 0f64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len().max(1))
        .x_label_formatter(&|x| category_label(&labels, *x))
        .x_desc("Segment")
        .y_desc("Number of Customers")
        .axis_desc_style(("sans-serif", 14))
        .draw()?;

    chart.draw_series(counts.iter().enumerate().map(|(i, &(segment, count))| {
        let x = i as f64;
        Rectangle::new(
            [(x - 0.4, 0.0), (x + 0.4, count as f64)],
            segment_color(segment).filled(),
        )
    }))?;

    Ok(())
}

/// Print the report to the console
pub fn print_summary(monthly: &[MonthlyRevenue], report: &CustomerReport) {
    let total_revenue: f64 = monthly.iter().map(|row| row.revenue).sum();

    println!("\n=== Revenue Summary ===");
    println!("Months with orders: {}", monthly.len());
    println!("Total revenue: {:.2}", total_revenue);
    println!("Customers with orders: {}", report.stats.len());
    if report.unmatched_orders > 0 {
        println!(
            "Orders without a known customer: {}",
            report.unmatched_orders
        );
    }
    if report.duplicate_customer_ids > 0 {
        println!(
            "Customer rows skipped for a repeated id: {}",
            report.duplicate_customer_ids
        );
    }

    println!("\nTop customers:");
    for (rank, row) in top_customers(&report.stats, TOP_CUSTOMERS).iter().enumerate() {
        println!(
            "  {:2}. {:<24} {:>4} orders {:>12.2}",
            rank + 1,
            row.full_name,
            row.order_count,
            row.total_revenue
        );
    }

    println!("\nSegments:");
    for (segment, count) in segment_counts(&report.stats) {
        let percentage = if report.stats.is_empty() {
            0.0
        } else {
            (count as f64 / report.stats.len() as f64) * 100.0
        };
        println!("  {:<13} {:>5} customers ({:.1}%)", segment.label(), count, percentage);
    }
}

/// X range that centres `count` categories on integer positions
fn category_range(count: usize) -> std::ops::Range<f64> {
    -0.5..(count.max(1) as f64 - 0.5)
}

/// Label for the category at position `x`, empty between categories
fn category_label(labels: &[String], x: f64) -> String {
    let index = x.round();
    if (x - index).abs() > 1e-6 || index < 0.0 {
        return String::new();
    }
    labels.get(index as usize).cloned().unwrap_or_default()
}

/// Upper y bound with headroom; at least 1.0 so empty charts still have an axis
fn value_ceiling(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(0.0, f64::max).max(1.0) * 1.1
}
