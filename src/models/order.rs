//! Order (job) and operation models.
//!
//! An order is a customer job made of an ordered sequence of operations.
//! Each operation may run on any machine in its eligibility set.
//!
//! # Time Representation
//! Entry and due dates are absolute timestamps. Processing times and all
//! scheduling offsets are in hours (`f64`) on the clock chosen by the
//! dispatching policy; offsets are turned back into timestamps by adding
//! them to the order's entry timestamp.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 1

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

const MS_PER_HOUR: f64 = 3_600_000.0;

/// A single processing step of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Identifier derived from the order id and sequence number.
    pub id: String,
    /// Position within the order (1-based).
    pub sequence: u32,
    /// Machines able to run this operation, in evaluation order.
    pub machines: Vec<String>,
    /// Processing time (hours).
    pub processing_hours: f64,
}

impl Operation {
    /// Creates an operation of `order_id` with a derived identifier.
    pub fn new(order_id: &str, sequence: u32) -> Self {
        Self {
            id: Self::derive_id(order_id, sequence),
            sequence,
            machines: Vec::new(),
            processing_hours: 1.0,
        }
    }

    /// Identifier for operation `sequence` of `order_id`.
    pub fn derive_id(order_id: &str, sequence: u32) -> String {
        format!("{order_id}_op{sequence}")
    }

    /// Sets the eligible machines.
    pub fn with_machines<I, S>(mut self, machines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.machines = machines.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the processing time (hours).
    pub fn with_processing_hours(mut self, hours: f64) -> Self {
        self.processing_hours = hours;
        self
    }

    /// Whether `machine_id` may run this operation.
    pub fn is_eligible(&self, machine_id: &str) -> bool {
        self.machines.iter().any(|m| m == machine_id)
    }
}

/// A customer order.
///
/// Progress through the operation list is tracked by the dispatching
/// policy, never on the order itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order identifier.
    pub id: String,
    /// Product code (drives changeover lookups).
    pub product: String,
    /// Arrival timestamp.
    pub entry: NaiveDateTime,
    /// Latest delivery timestamp.
    pub due: NaiveDateTime,
    /// Operations sorted by sequence number.
    pub operations: Vec<Operation>,
}

impl Order {
    /// Creates an order without operations.
    pub fn new(
        id: impl Into<String>,
        product: impl Into<String>,
        entry: NaiveDateTime,
        due: NaiveDateTime,
    ) -> Self {
        Self {
            id: id.into(),
            product: product.into(),
            entry,
            due,
            operations: Vec::new(),
        }
    }

    /// Appends an operation.
    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    /// Allowed duration: `due - entry` in hours.
    ///
    /// Negative when the due date precedes the entry date; such orders are
    /// scheduled anyway and simply report large tardiness.
    pub fn allowed_hours(&self) -> f64 {
        (self.due - self.entry).num_milliseconds() as f64 / MS_PER_HOUR
    }

    /// Tardiness of an operation finishing at `finish_hours`.
    #[inline]
    pub fn tardiness_at(&self, finish_hours: f64) -> f64 {
        (finish_hours - self.allowed_hours()).max(0.0)
    }

    /// Absolute timestamp `hours` after this order's entry, or `None` when
    /// it falls outside the representable calendar.
    pub fn timestamp_at(&self, hours: f64) -> Option<NaiveDateTime> {
        if !hours.is_finite() {
            return None;
        }
        TimeDelta::try_milliseconds((hours * MS_PER_HOUR).round() as i64)
            .and_then(|offset| self.entry.checked_add_signed(offset))
    }

    /// Total processing time of all operations (hours).
    pub fn total_processing_hours(&self) -> f64 {
        self.operations.iter().map(|op| op.processing_hours).sum()
    }

    /// Number of operations.
    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }
}
