//! Seeded synthetic instances.
//!
//! Produces [`OrderRecord`] sets with random routings, eligibility
//! subsets, processing times and due windows. The same
//! [`InstanceConfig`] (including its seed) always yields the same records.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::ingest::OrderRecord;
use crate::scheduler::TIMESTAMP_FORMAT;

/// Shape of a generated instance.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceConfig {
    /// Number of orders.
    pub orders: usize,
    /// Upper bound on operations per order (at least 1).
    pub max_operations: u32,
    /// Machines `M1..Mn` in the shop.
    pub machines: usize,
    /// Upper bound on eligible machines per operation.
    pub max_eligible: usize,
    /// Distinct product codes `P1..Pn`.
    pub products: usize,
    /// Upper bound on processing time (hours).
    pub max_processing_hours: f64,
    /// Arrivals spread over this many days.
    pub horizon_days: i64,
    /// Probability that an order is due before it arrives.
    pub inverted_window_rate: f64,
    /// When set, records are emitted in random order instead of grouped
    /// by order.
    pub shuffle_records: bool,
    /// RNG seed.
    pub seed: u64,
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            orders: 20,
            max_operations: 4,
            machines: 5,
            max_eligible: 3,
            products: 4,
            max_processing_hours: 8.0,
            horizon_days: 7,
            inverted_window_rate: 0.0,
            shuffle_records: false,
            seed: 42,
        }
    }
}

impl InstanceConfig {
    /// Default shape with `orders` orders.
    pub fn new(orders: usize) -> Self {
        Self {
            orders,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_machines(mut self, machines: usize, max_eligible: usize) -> Self {
        self.machines = machines;
        self.max_eligible = max_eligible;
        self
    }

    pub fn with_max_operations(mut self, max_operations: u32) -> Self {
        self.max_operations = max_operations;
        self
    }

    pub fn with_max_processing_hours(mut self, hours: f64) -> Self {
        self.max_processing_hours = hours;
        self
    }

    pub fn with_inverted_window_rate(mut self, rate: f64) -> Self {
        self.inverted_window_rate = rate;
        self
    }

    pub fn with_horizon_days(mut self, days: i64) -> Self {
        self.horizon_days = days;
        self
    }

    pub fn with_shuffled_records(mut self) -> Self {
        self.shuffle_records = true;
        self
    }

    /// Machine ids of the generated shop.
    pub fn machine_ids(&self) -> Vec<String> {
        (1..=self.machines.max(1)).map(|i| format!("M{i}")).collect()
    }
}

/// Generates a record set for `config`.
///
/// Every operation gets at least one eligible machine and a processing
/// time in `[0.25, max_processing_hours]` on a quarter-hour grid.
/// Due windows leave one to three times the order's total work as slack,
/// unless the order is drawn as inverted.
pub fn generate_records(config: &InstanceConfig) -> Vec<OrderRecord> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let machine_ids = config.machine_ids();
    let max_eligible = config.max_eligible.clamp(1, machine_ids.len());
    let max_quarters = ((config.max_processing_hours * 4.0).floor() as u32).max(1);
    let horizon_minutes = config
        .horizon_days
        .max(1)
        .checked_mul(24 * 60)
        .and_then(|m| u32::try_from(m).ok())
        .unwrap_or(u32::MAX);
    let products = config.products.max(1);
    let inverted_rate = if config.inverted_window_rate.is_finite() {
        config.inverted_window_rate.clamp(0.0, 1.0)
    } else {
        0.0
    };

    let mut records = Vec::new();
    for n in 1..=config.orders {
        let order_id = format!("ORD-{n:04}");
        let product = format!("P{}", rng.random_range(1..=products));
        let arrival = epoch() + Duration::minutes(i64::from(rng.random_range(0..horizon_minutes)));

        let operations = rng.random_range(1..=config.max_operations.max(1));
        let mut work_hours = 0.0;
        let mut rows = Vec::with_capacity(operations as usize);
        for sequence in 1..=operations {
            let mut pool = machine_ids.clone();
            pool.shuffle(&mut rng);
            pool.truncate(rng.random_range(1..=max_eligible));

            let hours = f64::from(rng.random_range(1..=max_quarters)) / 4.0;
            work_hours += hours;

            rows.push(
                OrderRecord::new(order_id.as_str(), sequence)
                    .with_product(product.as_str())
                    .with_machines(pool.join(","))
                    .with_processing_hours(hours),
            );
        }

        let slack_minutes = (work_hours * 60.0 * rng.random_range(1.0..3.0)).round() as i64;
        let due = if rng.random_bool(inverted_rate) {
            arrival - Duration::minutes(slack_minutes.max(60))
        } else {
            arrival + Duration::minutes(slack_minutes)
        };

        let arrival = arrival.format(TIMESTAMP_FORMAT).to_string();
        let due = due.format(TIMESTAMP_FORMAT).to_string();
        records.extend(
            rows.into_iter()
                .map(|r| r.with_window(arrival.as_str(), due.as_str())),
        );
    }

    if config.shuffle_records {
        records.shuffle(&mut rng);
    }

    debug!(
        orders = config.orders,
        records = records.len(),
        seed = config.seed,
        "instance generated"
    );
    records
}

fn epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}
