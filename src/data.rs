//! Data loading and cleaning of the order, customer and product exports using Polars

use std::cmp::Ordering;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::{
    CsvReadOptions, DataFrame, DataType, IntoLazy, SerReader, UniqueKeepStrategy,
};

use crate::error::{DashboardError, Result};

pub const ORDERS_FILE: &str = "orders.csv";
pub const CUSTOMERS_FILE: &str = "customers.csv";
pub const PRODUCTS_FILE: &str = "products.csv";

const ORDER_COLUMNS: [&str; 7] = [
    "order_id",
    "customer_id",
    "order_date",
    "quantity",
    "unit_price",
    "discount",
    "payment_type",
];
const CUSTOMER_COLUMNS: [&str; 5] = [
    "customer_id",
    "first_name",
    "last_name",
    "city",
    "registration_date",
];
const PRODUCT_COLUMNS: [&str; 3] = ["product_id", "product_name", "brand"];

/// Calendar month bucket an order falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrderMonth {
    pub year: i32,
    pub month: u32,
}

impl OrderMonth {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for OrderMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Customer key shared by the order and customer tables
///
/// Integer ids compare numerically (`2` before `10`) and sort ahead of
/// alphanumeric ids, which compare as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CustomerId(String);

impl CustomerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CustomerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<i64> for CustomerId {
    fn from(id: i64) -> Self {
        Self::new(id.to_string())
    }
}

impl Ord for CustomerId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0.parse::<i64>(), other.0.parse::<i64>()) {
            (Ok(a), Ok(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Ok(_), Err(_)) => Ordering::Less,
            (Err(_), Ok(_)) => Ordering::Greater,
            (Err(_), Err(_)) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for CustomerId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A cleaned order row with its derived month and revenue
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub order_id: String,
    pub customer_id: CustomerId,
    pub order_date: NaiveDate,
    pub quantity: i64,
    pub unit_price: f64,
    pub discount: f64,
    pub payment_type: String,
    pub order_month: OrderMonth,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub customer_id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub city: String,
    pub registration_date: NaiveDate,
}

/// Product catalogue row. Not joined into any report yet.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub product_id: String,
    pub product_name: String,
    pub brand: String,
}

/// The three cleaned input tables
#[derive(Debug, Clone)]
pub struct Tables {
    pub orders: Vec<Order>,
    pub customers: Vec<Customer>,
    pub products: Vec<Product>,
}

/// Net revenue of a single order line.
pub fn revenue(quantity: i64, unit_price: f64, discount: f64) -> f64 {
    quantity as f64 * unit_price * (1.0 - discount)
}

/// Parse a calendar date, accepting plain dates as well as timestamps.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Some(datetime.date());
        }
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|datetime| datetime.date_naive())
}

/// Load and clean all three tables from a directory
///
/// # Arguments
/// * `data_dir` - Directory holding `orders.csv`, `customers.csv` and `products.csv`
///
/// # Returns
/// * `Tables` with duplicates removed, text trimmed and dates parsed
pub fn load_tables(data_dir: impl AsRef<Path>) -> Result<Tables> {
    let data_dir = data_dir.as_ref();

    let orders = load_orders(&data_dir.join(ORDERS_FILE))?;
    let customers = load_customers(&data_dir.join(CUSTOMERS_FILE))?;
    let products = load_products(&data_dir.join(PRODUCTS_FILE))?;

    tracing::info!(
        orders = orders.len(),
        customers = customers.len(),
        products = products.len(),
        "Loaded input tables from {}",
        data_dir.display()
    );

    Ok(Tables {
        orders,
        customers,
        products,
    })
}

/// Read a CSV file with a header row into a DataFrame
///
/// Every column is read as text; typed values are parsed per column once the
/// frame is deduplicated, so a late non-numeric id cannot break type inference.
pub fn read_frame(path: &Path) -> Result<DataFrame> {
    let file = File::open(path).map_err(|source| DashboardError::FileRead {
        path: PathBuf::from(path),
        source,
    })?;

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(file)
        .finish()?;

    Ok(df)
}

/// Fail unless every named column is present in the frame
pub fn require_columns(df: &DataFrame, table: &str, columns: &[&str]) -> Result<()> {
    let schema = df.schema();
    match columns.iter().find(|column| !schema.contains(column)) {
        Some(column) => Err(DashboardError::MissingColumn {
            table: table.to_string(),
            column: column.to_string(),
        }),
        None => Ok(()),
    }
}

/// Drop rows that duplicate an earlier row across all columns, keeping row order
pub fn dedup_frame(df: DataFrame) -> Result<DataFrame> {
    let deduped = df
        .lazy()
        .unique_stable(None, UniqueKeepStrategy::First)
        .collect()?;
    Ok(deduped)
}

pub fn load_orders(path: &Path) -> Result<Vec<Order>> {
    let df = prepare_frame(path, "orders", &ORDER_COLUMNS)?;

    let order_ids = text_column(&df, "orders", "order_id")?;
    let customer_ids = id_column(&df, "orders", "customer_id")?;
    let order_dates = date_column(&df, "orders", "order_date")?;
    let quantities = int_column(&df, "orders", "quantity")?;
    let unit_prices = float_column(&df, "orders", "unit_price")?;
    let discounts = float_column(&df, "orders", "discount")?;
    let payment_types = text_column(&df, "orders", "payment_type")?;

    let orders = (0..df.height())
        .map(|i| {
            let (quantity, unit_price, discount) = (quantities[i], unit_prices[i], discounts[i]);
            Order {
                order_id: order_ids[i].clone(),
                customer_id: customer_ids[i].clone(),
                order_date: order_dates[i],
                quantity,
                unit_price,
                discount,
                payment_type: payment_types[i].clone(),
                order_month: OrderMonth::from_date(order_dates[i]),
                revenue: revenue(quantity, unit_price, discount),
            }
        })
        .collect();

    Ok(orders)
}

pub fn load_customers(path: &Path) -> Result<Vec<Customer>> {
    let df = prepare_frame(path, "customers", &CUSTOMER_COLUMNS)?;

    let customer_ids = id_column(&df, "customers", "customer_id")?;
    let first_names = text_column(&df, "customers", "first_name")?;
    let last_names = text_column(&df, "customers", "last_name")?;
    let cities = text_column(&df, "customers", "city")?;
    let registration_dates = date_column(&df, "customers", "registration_date")?;

    let customers = customer_ids
        .into_iter()
        .zip(first_names)
        .zip(last_names)
        .zip(cities)
        .zip(registration_dates)
        .map(
            |((((customer_id, first_name), last_name), city), registration_date)| Customer {
                customer_id,
                first_name,
                last_name,
                city,
                registration_date,
            },
        )
        .collect();

    Ok(customers)
}

pub fn load_products(path: &Path) -> Result<Vec<Product>> {
    let df = prepare_frame(path, "products", &PRODUCT_COLUMNS)?;

    let product_ids = text_column(&df, "products", "product_id")?;
    let product_names = text_column(&df, "products", "product_name")?;
    let brands = text_column(&df, "products", "brand")?;

    let products = product_ids
        .into_iter()
        .zip(product_names)
        .zip(brands)
        .map(|((product_id, product_name), brand)| Product {
            product_id,
            product_name,
            brand,
        })
        .collect();

    Ok(products)
}

fn prepare_frame(path: &Path, table: &str, columns: &[&str]) -> Result<DataFrame> {
    let df = read_frame(path)?;
    require_columns(&df, table, columns)?;

    let raw_rows = df.height();
    let df = dedup_frame(df)?;
    tracing::debug!(
        table,
        raw_rows,
        unique_rows = df.height(),
        "Removed exact duplicate rows"
    );

    Ok(df)
}

fn missing_value(table: &str, column: &str, index: usize) -> DashboardError {
    DashboardError::MissingValue {
        table: table.to_string(),
        column: column.to_string(),
        row: index + 1,
    }
}

fn id_column(df: &DataFrame, table: &str, name: &str) -> Result<Vec<CustomerId>> {
    Ok(text_column(df, table, name)?
        .into_iter()
        .map(CustomerId::new)
        .collect())
}

fn int_column(df: &DataFrame, table: &str, name: &str) -> Result<Vec<i64>> {
    parsed_column(df, table, name, parse_whole_number)
}

fn float_column(df: &DataFrame, table: &str, name: &str) -> Result<Vec<f64>> {
    parsed_column(df, table, name, |text| {
        text.parse::<f64>().ok().filter(|value| value.is_finite())
    })
}

/// Integer value; `3.0` is accepted, `2.9` is not
fn parse_whole_number(text: &str) -> Option<i64> {
    text.parse::<i64>().ok().or_else(|| {
        let value = text.parse::<f64>().ok()?;
        (value.is_finite() && value.fract() == 0.0).then_some(value as i64)
    })
}

fn parsed_column<T>(
    df: &DataFrame,
    table: &str,
    name: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Vec<T>> {
    text_column(df, table, name)?
        .into_iter()
        .map(|text| {
            parse(&text).ok_or_else(|| DashboardError::InvalidNumber {
                table: table.to_string(),
                column: name.to_string(),
                value: text,
            })
        })
        .collect()
}

/// String column with surrounding whitespace stripped
fn text_column(df: &DataFrame, table: &str, name: &str) -> Result<Vec<String>> {
    let column = df.column(name)?.cast(&DataType::String)?;
    column
        .str()?
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            value
                .map(|text| text.trim().to_string())
                .ok_or_else(|| missing_value(table, name, index))
        })
        .collect()
}

fn date_column(df: &DataFrame, table: &str, name: &str) -> Result<Vec<NaiveDate>> {
    text_column(df, table, name)?
        .into_iter()
        .map(|text| {
            parse_date(&text).ok_or_else(|| DashboardError::InvalidDate {
                table: table.to_string(),
                column: name.to_string(),
                value: text,
            })
        })
        .collect()
}
