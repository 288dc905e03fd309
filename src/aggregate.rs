//! Revenue aggregation by month and by customer

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use crate::data::{Customer, CustomerId, Order, OrderMonth};
use crate::segment::Segment;

/// Total revenue for one calendar month
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyRevenue {
    pub order_month: OrderMonth,
    pub revenue: f64,
}

/// Per-customer order statistics
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerStats {
    pub customer_id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub city: String,
    /// First and last name joined by a single space
    pub full_name: String,
    pub order_count: usize,
    pub total_revenue: f64,
    pub avg_order_value: f64,
    pub segment: Segment,
}

/// Customer statistics plus the orders that could not be attributed to a customer
#[derive(Debug, Clone)]
pub struct CustomerReport {
    /// One row per customer with at least one order, ordered by customer id
    pub stats: Vec<CustomerStats>,
    /// Orders whose customer id is absent from the customer table
    pub unmatched_orders: usize,
    /// Customer rows ignored because an earlier row had the same id
    pub duplicate_customer_ids: usize,
}

/// Running totals for one customer while orders are scanned.
#[derive(Debug, Default)]
struct RevenueAccumulator {
    order_count: usize,
    total_revenue: f64,
}

impl RevenueAccumulator {
    fn add_order(&mut self, order: &Order) {
        self.order_count += 1;
        self.total_revenue += order.revenue;
    }
}

/// Sum order revenue per month, in chronological order.
///
/// Months without orders are absent rather than zero-filled.
pub fn monthly_revenue(orders: &[Order]) -> Vec<MonthlyRevenue> {
    let mut months: BTreeMap<OrderMonth, f64> = BTreeMap::new();
    for order in orders {
        *months.entry(order.order_month).or_insert(0.0) += order.revenue;
    }

    months
        .into_iter()
        .map(|(order_month, revenue)| MonthlyRevenue {
            order_month,
            revenue,
        })
        .collect()
}

/// Compute order count, total and average revenue for every ordering customer
///
/// Orders drive the join: customers with no orders never appear, and orders
/// referencing an unknown customer id are dropped from the result and counted
/// in `unmatched_orders`. When several customer rows share an id the first
/// one supplies the identity and the rest are counted in `duplicate_customer_ids`.
pub fn customer_stats(orders: &[Order], customers: &[Customer]) -> CustomerReport {
    let mut directory: HashMap<&CustomerId, &Customer> = HashMap::new();
    let mut duplicate_customer_ids = 0;

    for customer in customers {
        match directory.entry(&customer.customer_id) {
            Entry::Occupied(_) => duplicate_customer_ids += 1,
            Entry::Vacant(slot) => {
                slot.insert(customer);
            }
        }
    }

    if duplicate_customer_ids > 0 {
        tracing::warn!(
            duplicate_customer_ids,
            "Customer ids appear on more than one row; the first row of each is used"
        );
    }

    let mut totals: BTreeMap<CustomerId, RevenueAccumulator> = BTreeMap::new();
    let mut unmatched_orders = 0;

    for order in orders {
        if directory.contains_key(&order.customer_id) {
            totals
                .entry(order.customer_id.clone())
                .or_default()
                .add_order(order);
        } else {
            unmatched_orders += 1;
        }
    }

    if unmatched_orders > 0 {
        tracing::warn!(
            unmatched_orders,
            "Orders reference unknown customers and were left out of customer statistics"
        );
    }

    let stats = totals
        .into_iter()
        .filter_map(|(customer_id, running)| {
            let customer = directory.get(&customer_id)?;
            let avg_order_value = running.total_revenue / running.order_count as f64;
            Some(CustomerStats {
                customer_id,
                first_name: customer.first_name.clone(),
                last_name: customer.last_name.clone(),
                city: customer.city.clone(),
                full_name: format!("{} {}", customer.first_name, customer.last_name),
                order_count: running.order_count,
                total_revenue: running.total_revenue,
                avg_order_value,
                segment: Segment::from_revenue(running.total_revenue),
            })
        })
        .collect();

    CustomerReport {
        stats,
        unmatched_orders,
        duplicate_customer_ids,
    }
}

/// Highest-revenue customers, descending, ties kept in input order.
pub fn top_customers(stats: &[CustomerStats], limit: usize) -> Vec<CustomerStats> {
    let mut ranked = stats.to_vec();
    // sort_by is stable
    ranked.sort_by(|a, b| b.total_revenue.total_cmp(&a.total_revenue));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::revenue;
    use chrono::NaiveDate;

    fn make_order(
        order_id: &str,
        customer_id: i64,
        date: &str,
        quantity: i64,
        unit_price: f64,
        discount: f64,
    ) -> Order {
        let order_date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        Order {
            order_id: order_id.to_string(),
            customer_id: CustomerId::from(customer_id),
            order_date,
            quantity,
            unit_price,
            discount,
            payment_type: "card".to_string(),
            order_month: OrderMonth::from_date(order_date),
            revenue: revenue(quantity, unit_price, discount),
        }
    }

    fn make_customer(customer_id: i64, first_name: &str, last_name: &str, city: &str) -> Customer {
        Customer {
            customer_id: CustomerId::from(customer_id),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            city: city.to_string(),
            registration_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        }
    }

    fn sample_orders() -> Vec<Order> {
        vec![
            make_order("1", 2, "2024-03-02", 1, 2500.0, 0.0),
            make_order("2", 1, "2024-01-05", 2, 100.0, 0.1),
            make_order("3", 2, "2024-01-20", 4, 800.0, 0.0),
            make_order("4", 3, "2024-03-15", 10, 30.0, 0.5),
            make_order("5", 1, "2024-03-28", 1, 19.99, 0.0),
        ]
    }

    fn sample_customers() -> Vec<Customer> {
        vec![
            make_customer(1, "Ann", "Lee", "NYC"),
            make_customer(2, "Bo", "Chen", "Austin"),
            make_customer(3, "Cy", "Diaz", "Denver"),
            make_customer(4, "Dee", "Eze", "Miami"),
        ]
    }

    #[test]
    fn test_monthly_revenue_sorted_and_sparse() {
        let monthly = monthly_revenue(&sample_orders());

        let months: Vec<String> = monthly.iter().map(|m| m.order_month.to_string()).collect();
        assert_eq!(months, vec!["2024-01", "2024-03"]);
    }

    #[test]
    fn test_monthly_revenue_matches_order_sums() {
        let orders = sample_orders();
        let monthly = monthly_revenue(&orders);

        for row in &monthly {
            let expected: f64 = orders
                .iter()
                .filter(|order| order.order_month == row.order_month)
                .map(|order| order.revenue)
                .sum();
            assert!((row.revenue - expected).abs() < 1e-9);
        }
        assert!((monthly[0].revenue - 3380.0).abs() < 1e-9);
    }

    #[test]
    fn test_customer_stats_excludes_customers_without_orders() {
        let report = customer_stats(&sample_orders(), &sample_customers());

        let ids: Vec<&str> = report.stats.iter().map(|row| row.customer_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(report.unmatched_orders, 0);
    }

    #[test]
    fn test_customer_stats_values() {
        let report = customer_stats(&sample_orders(), &sample_customers());

        let bo = &report.stats[1];
        assert_eq!(bo.full_name, "Bo Chen");
        assert_eq!(bo.city, "Austin");
        assert_eq!(bo.order_count, 2);
        assert!((bo.total_revenue - 5700.0).abs() < 1e-9);
        assert!((bo.avg_order_value - 2850.0).abs() < 1e-9);
        assert_eq!(bo.segment, Segment::High);

        for row in &report.stats {
            assert!(row.order_count >= 1);
            let rebuilt = row.avg_order_value * row.order_count as f64;
            assert!((rebuilt - row.total_revenue).abs() < 1e-6);
            assert_eq!(row.segment, Segment::from_revenue(row.total_revenue));
        }
    }

    #[test]
    fn test_unmatched_orders_are_dropped_from_customer_stats() {
        let mut orders = sample_orders();
        orders.push(make_order("6", 99, "2024-02-01", 1, 500.0, 0.0));

        let report = customer_stats(&orders, &sample_customers());
        assert_eq!(report.unmatched_orders, 1);
        assert!(report.stats.iter().all(|row| row.customer_id.as_str() != "99"));

        // The order still counts toward monthly revenue
        let monthly = monthly_revenue(&orders);
        let february = monthly
            .iter()
            .find(|row| row.order_month.to_string() == "2024-02")
            .unwrap();
        assert!((february.revenue - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_top_customers_descending_and_stable() {
        let orders = vec![
            make_order("1", 1, "2024-01-01", 1, 300.0, 0.0),
            make_order("2", 2, "2024-01-01", 1, 900.0, 0.0),
            make_order("3", 3, "2024-01-01", 1, 300.0, 0.0),
            make_order("4", 4, "2024-01-01", 1, 50.0, 0.0),
        ];
        let report = customer_stats(&orders, &sample_customers());

        let top = top_customers(&report.stats, 10);
        let ids: Vec<&str> = top.iter().map(|row| row.customer_id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1", "3", "4"]);

        let top_two = top_customers(&report.stats, 2);
        assert_eq!(top_two.len(), 2);
        assert_eq!(top_two[0].customer_id.as_str(), "2");
        assert_eq!(top_two[1].customer_id.as_str(), "1");
    }

    #[test]
    fn test_top_customers_caps_at_limit() {
        let customers: Vec<Customer> = (1..=12)
            .map(|id| make_customer(id, "C", &id.to_string(), "Town"))
            .collect();
        let orders: Vec<Order> = (1..=12)
            .map(|id| make_order(&id.to_string(), id, "2024-05-01", 1, id as f64 * 10.0, 0.0))
            .collect();
        let report = customer_stats(&orders, &customers);

        let top = top_customers(&report.stats, 10);
        assert_eq!(top.len(), 10);
        assert_eq!(top[0].customer_id.as_str(), "12");
        assert!(top
            .windows(2)
            .all(|pair| pair[0].total_revenue >= pair[1].total_revenue));
    }

    #[test]
    fn test_duplicate_customer_ids_keep_first_row() {
        let mut customers = sample_customers();
        customers.push(make_customer(1, "Annie", "Leigh", "Boston"));

        let report = customer_stats(&sample_orders(), &customers);
        assert_eq!(report.duplicate_customer_ids, 1);
        assert_eq!(report.stats.len(), 3);

        let ann = &report.stats[0];
        assert_eq!(ann.full_name, "Ann Lee");
        assert_eq!(ann.city, "NYC");
        assert_eq!(ann.order_count, 2);
    }

    #[test]
    fn test_customer_stats_with_alphanumeric_ids() {
        let mut orders = sample_orders();
        let mut customers = sample_customers();
        for order in &mut orders {
            order.customer_id = CustomerId::new(format!("C00{}", order.customer_id));
        }
        for customer in &mut customers {
            customer.customer_id = CustomerId::new(format!("C00{}", customer.customer_id));
        }

        let report = customer_stats(&orders, &customers);
        assert_eq!(report.unmatched_orders, 0);
        let ids: Vec<&str> = report.stats.iter().map(|row| row.customer_id.as_str()).collect();
        assert_eq!(ids, vec!["C001", "C002", "C003"]);
        assert!((report.stats[1].total_revenue - 5700.0).abs() < 1e-9);
    }
}
