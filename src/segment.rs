//! Customer value tiers

use std::fmt;

use crate::aggregate::CustomerStats;

/// Lower bound (inclusive) of the high value tier
pub const HIGH_VALUE_THRESHOLD: f64 = 5000.0;
/// Lower bound (inclusive) of the medium value tier
pub const MEDIUM_VALUE_THRESHOLD: f64 = 2000.0;

/// Value tier a customer falls into based on total revenue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    High,
    Medium,
    Low,
}

impl Segment {
    /// All tiers in display order, highest first.
    pub const ALL: [Segment; 3] = [Segment::High, Segment::Medium, Segment::Low];

    pub fn from_revenue(total_revenue: f64) -> Self {
        if total_revenue >= HIGH_VALUE_THRESHOLD {
            Segment::High
        } else if total_revenue >= MEDIUM_VALUE_THRESHOLD {
            Segment::Medium
        } else {
            Segment::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Segment::High => "High Value",
            Segment::Medium => "Medium Value",
            Segment::Low => "Low Value",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Count customers per tier
///
/// Always returns one entry per tier in `Segment::ALL` order, including empty tiers.
pub fn segment_counts(stats: &[CustomerStats]) -> Vec<(Segment, usize)> {
    Segment::ALL
        .iter()
        .map(|&segment| {
            let count = stats.iter().filter(|row| row.segment == segment).count();
            (segment, count)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CustomerId;

    fn stats_with_revenue(customer_id: i64, total_revenue: f64) -> CustomerStats {
        CustomerStats {
            customer_id: CustomerId::from(customer_id),
            first_name: "Test".to_string(),
            last_name: format!("Customer{}", customer_id),
            city: "Springfield".to_string(),
            full_name: format!("Test Customer{}", customer_id),
            order_count: 1,
            total_revenue,
            avg_order_value: total_revenue,
            segment: Segment::from_revenue(total_revenue),
        }
    }

    #[test]
    fn test_segment_boundaries() {
        assert_eq!(Segment::from_revenue(4999.99), Segment::Medium);
        assert_eq!(Segment::from_revenue(5000.0), Segment::High);
        assert_eq!(Segment::from_revenue(1999.99), Segment::Low);
        assert_eq!(Segment::from_revenue(2000.0), Segment::Medium);
        assert_eq!(Segment::from_revenue(0.0), Segment::Low);
        assert_eq!(Segment::from_revenue(125_000.0), Segment::High);
    }

    #[test]
    fn test_segment_labels() {
        assert_eq!(Segment::High.label(), "High Value");
        assert_eq!(Segment::Medium.to_string(), "Medium Value");
        assert_eq!(Segment::Low.to_string(), "Low Value");
    }

    #[test]
    fn test_segment_counts_canonical_order() {
        // Low appears first in the input but High is still reported first
        let stats = vec![
            stats_with_revenue(1, 150.0),
            stats_with_revenue(2, 8000.0),
            stats_with_revenue(3, 90.0),
        ];

        let counts = segment_counts(&stats);
        assert_eq!(
            counts,
            vec![
                (Segment::High, 1),
                (Segment::Medium, 0),
                (Segment::Low, 2),
            ]
        );
    }

    #[test]
    fn test_segment_counts_empty() {
        let counts = segment_counts(&[]);
        assert_eq!(counts.len(), 3);
        assert!(counts.iter().all(|&(_, count)| count == 0));
    }
}
