//! Aggregate loyalty statistics.
//!
//! Everything here is a pure function of the customer set and an explicit
//! evaluation instant, so the same inputs always give the same report.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Customer, StampCard};

/// Trailing window for "new customers this month".
pub const MONTH_WINDOW_DAYS: i64 = 30;

/// Trailing window for "new customers this week" and recent activity.
pub const WEEK_WINDOW_DAYS: i64 = 7;

/// Full business report over a customer set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyReport {
    pub total_customers: u64,
    pub completed_cards: u64,
    pub active_cards: u64,
    pub total_stamps: u64,
    /// Percentage of completed cards, one decimal place.
    pub completion_rate: f64,
    /// One decimal place.
    pub avg_stamps_per_customer: f64,
    /// Customers per stamp count 0..=5. Completed cards are excluded, so the
    /// buckets sum to `active_cards`.
    pub stamp_distribution: [u64; StampCard::DAYS],
    pub new_customers_last_30_days: u64,
    pub new_customers_last_7_days: u64,
    /// Customers stamped in the trailing week.
    pub recent_activity: u64,
    /// One reward per completed card.
    pub free_rewards_given: u64,
    /// Evaluation instant the windows were measured from.
    pub generated_at: DateTime<Utc>,
}

/// The compact counters shown on the dashboard landing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_customers: u64,
    pub completed_cards: u64,
    pub total_stamps: u64,
    pub free_rewards: u64,
}

impl LoyaltyReport {
    /// Compute the report in a single pass.
    pub fn compute<'a, I>(customers: I, now: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = &'a Customer>,
    {
        let month_cutoff = now - Duration::days(MONTH_WINDOW_DAYS);
        let week_cutoff = now - Duration::days(WEEK_WINDOW_DAYS);

        let mut total_customers = 0u64;
        let mut completed_cards = 0u64;
        let mut total_stamps = 0u64;
        let mut stamp_distribution = [0u64; StampCard::DAYS];
        let mut new_customers_last_30_days = 0u64;
        let mut new_customers_last_7_days = 0u64;
        let mut recent_activity = 0u64;

        for customer in customers {
            total_customers += 1;

            let stamps = customer.stamps.count();
            total_stamps += u64::from(stamps);

            if customer.completed() {
                completed_cards += 1;
            } else if let Some(bucket) = stamp_distribution.get_mut(usize::from(stamps)) {
                *bucket += 1;
            }

            if customer.created_date > month_cutoff {
                new_customers_last_30_days += 1;
            }
            if customer.created_date > week_cutoff {
                new_customers_last_7_days += 1;
            }
            if customer
                .last_stamp_date
                .is_some_and(|stamped| stamped > week_cutoff)
            {
                recent_activity += 1;
            }
        }

        Self {
            total_customers,
            completed_cards,
            active_cards: total_customers - completed_cards,
            total_stamps,
            completion_rate: round_one_decimal(percentage(completed_cards, total_customers)),
            avg_stamps_per_customer: round_one_decimal(ratio(total_stamps, total_customers)),
            stamp_distribution,
            new_customers_last_30_days,
            new_customers_last_7_days,
            recent_activity,
            free_rewards_given: completed_cards,
            generated_at: now,
        }
    }

    /// Dashboard counters derived from this report.
    #[must_use]
    pub const fn stats(&self) -> DashboardStats {
        DashboardStats {
            total_customers: self.total_customers,
            completed_cards: self.completed_cards,
            total_stamps: self.total_stamps,
            free_rewards: self.free_rewards_given,
        }
    }
}

/// `part / whole`, or 0 for an empty set.
pub(crate) fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    // Customer counts stay far below 2^52.
    #[allow(clippy::cast_precision_loss)]
    let value = part as f64 / whole as f64;
    value
}

/// `part / whole * 100`, or 0 for an empty set.
pub(crate) fn percentage(part: u64, whole: u64) -> f64 {
    ratio(part, whole) * 100.0
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{CustomerId, MobileNumber, StampUpdate};

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_750_000_000, 0).unwrap()
    }

    fn customer(n: u16, mask: u8, created_days_ago: i64) -> Customer {
        let mut customer = Customer::register(
            CustomerId::from_number(1000 + n).unwrap(),
            format!("Customer {n}"),
            MobileNumber::parse(&format!("+9190000{n:05}")).unwrap(),
            now() - Duration::days(created_days_ago),
        );
        if mask != 0 {
            customer.apply(&StampUpdate::compute(
                StampCard::from_bits(mask),
                customer.created_date,
            ));
        }
        customer
    }

    #[test]
    fn test_empty_set_has_no_division_by_zero() {
        let customers: Vec<Customer> = Vec::new();
        let report = LoyaltyReport::compute(&customers, now());
        assert_eq!(report.total_customers, 0);
        assert!(report.completion_rate.abs() < f64::EPSILON);
        assert!(report.avg_stamps_per_customer.abs() < f64::EPSILON);
        assert_eq!(report.stamp_distribution, [0; 6]);
        assert_eq!(report.generated_at, now());
    }

    #[test]
    fn test_counts_and_rates() {
        let customers = vec![
            customer(1, 0b11_1111, 100),
            customer(2, 0b00_0111, 100),
            customer(3, 0b00_0001, 100),
        ];
        let report = LoyaltyReport::compute(&customers, now());

        assert_eq!(report.total_customers, 3);
        assert_eq!(report.completed_cards, 1);
        assert_eq!(report.active_cards, 2);
        assert_eq!(report.total_stamps, 10);
        assert!((report.completion_rate - 33.3).abs() < 1e-9);
        assert!((report.avg_stamps_per_customer - 3.3).abs() < 1e-9);
        assert_eq!(report.free_rewards_given, 1);
    }

    #[test]
    fn test_distribution_sums_to_active_cards() {
        let customers: Vec<Customer> = (0u8..64)
            .map(|mask| customer(u16::from(mask), mask, 1))
            .collect();
        let report = LoyaltyReport::compute(&customers, now());

        let bucket_sum: u64 = report.stamp_distribution.iter().sum();
        assert_eq!(bucket_sum, report.active_cards);
        assert_eq!(report.completed_cards, 1);
        // C(6, k) cards have exactly k stamps.
        assert_eq!(report.stamp_distribution, [1, 6, 15, 20, 15, 6]);
    }

    #[test]
    fn test_new_customer_windows() {
        let customers = vec![customer(1, 0, 10), customer(2, 0, 40)];
        let report = LoyaltyReport::compute(&customers, now());
        assert_eq!(report.new_customers_last_30_days, 1);
        assert_eq!(report.new_customers_last_7_days, 0);

        let customers = vec![customer(1, 0, 3), customer(2, 0, 20)];
        let report = LoyaltyReport::compute(&customers, now());
        assert_eq!(report.new_customers_last_30_days, 2);
        assert_eq!(report.new_customers_last_7_days, 1);
    }

    #[test]
    fn test_window_boundary_is_exclusive() {
        let customers = vec![customer(1, 0, 30)];
        let report = LoyaltyReport::compute(&customers, now());
        assert_eq!(report.new_customers_last_30_days, 0);
    }

    #[test]
    fn test_recent_activity_uses_last_stamp() {
        let mut active = customer(1, 0, 90);
        active.apply(&StampUpdate::compute(
            StampCard::from_bits(1),
            now() - Duration::days(2),
        ));
        let mut stale = customer(2, 0, 90);
        stale.apply(&StampUpdate::compute(
            StampCard::from_bits(1),
            now() - Duration::days(8),
        ));
        let never = customer(3, 0, 1);

        let report = LoyaltyReport::compute(&[active, stale, never], now());
        assert_eq!(report.recent_activity, 1);
    }

    #[test]
    fn test_recompute_is_deterministic() {
        let customers = vec![customer(1, 0b10_1010, 5), customer(2, 0b11_1111, 45)];
        assert_eq!(
            LoyaltyReport::compute(&customers, now()),
            LoyaltyReport::compute(&customers, now())
        );
    }

    #[test]
    fn test_stats_projection() {
        let customers = vec![customer(1, 0b11_1111, 1), customer(2, 0b00_0011, 1)];
        let stats = LoyaltyReport::compute(&customers, now()).stats();
        assert_eq!(
            stats,
            DashboardStats {
                total_customers: 2,
                completed_cards: 1,
                total_stamps: 8,
                free_rewards: 1,
            }
        );
    }
}
