//! Schedule (solution) model.
//!
//! A schedule is the append-only list of operation placements produced by
//! one dispatching run, together with the penalty it accumulated.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Operation, Order};
use crate::error::{Result, ScheduleError};

/// Placement of one operation on one machine.
///
/// `start_hours` / `finish_hours` are on the policy clock; `start` /
/// `finish` are the same instants expressed from the order's entry date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub order_id: String,
    pub product: String,
    pub operation_id: String,
    /// Sequence number of the operation within its order.
    pub sequence: u32,
    pub machine_id: String,
    /// Processing time (hours).
    pub processing_hours: f64,
    /// Setup absorbed before processing (hours). Included in
    /// `[start_hours - changeover_hours, start_hours)`.
    pub changeover_hours: f64,
    pub start_hours: f64,
    pub finish_hours: f64,
    pub start: NaiveDateTime,
    pub finish: NaiveDateTime,
    /// `max(0, finish_hours - allowed_hours)`.
    pub tardiness: f64,
    /// `tardiness * weight`.
    pub penalty: f64,
}

impl ScheduleEntry {
    /// Builds the entry for `operation` of `order` placed on `machine_id`
    /// over `[start_hours, finish_hours)`.
    ///
    /// Fails when either end cannot be expressed as a calendar timestamp.
    pub fn place(
        order: &Order,
        operation: &Operation,
        machine_id: impl Into<String>,
        start_hours: f64,
        finish_hours: f64,
        tardiness_weight: f64,
    ) -> Result<Self> {
        let timestamp = |hours: f64| {
            order
                .timestamp_at(hours)
                .ok_or_else(|| ScheduleError::TimestampOutOfRange {
                    operation_id: operation.id.clone(),
                    hours,
                })
        };
        let start = timestamp(start_hours)?;
        let finish = timestamp(finish_hours)?;

        let tardiness = order.tardiness_at(finish_hours);
        Ok(Self {
            order_id: order.id.clone(),
            product: order.product.clone(),
            operation_id: operation.id.clone(),
            sequence: operation.sequence,
            machine_id: machine_id.into(),
            processing_hours: operation.processing_hours,
            changeover_hours: 0.0,
            start_hours,
            finish_hours,
            start,
            finish,
            tardiness,
            penalty: tardiness * tardiness_weight,
        })
    }

    /// Sets the absorbed changeover time.
    pub fn with_changeover(mut self, hours: f64) -> Self {
        self.changeover_hours = hours;
        self
    }

    /// Occupied duration (hours).
    #[inline]
    pub fn duration_hours(&self) -> f64 {
        self.finish_hours - self.start_hours
    }

    /// Whether this operation finished past its allowed duration.
    #[inline]
    pub fn is_late(&self) -> bool {
        self.tardiness > 0.0
    }
}

/// Output of one dispatching run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Entries in commit order.
    pub entries: Vec<ScheduleEntry>,
    /// Sum of entry penalties.
    pub total_penalty: f64,
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry and accumulates its penalty.
    pub fn push(&mut self, entry: ScheduleEntry) {
        self.total_penalty += entry.penalty;
        self.entries.push(entry);
    }

    /// Appends all entries of another schedule.
    pub fn extend(&mut self, other: Schedule) {
        self.total_penalty += other.total_penalty;
        self.entries.extend(other.entries);
    }

    /// Latest finish on the policy clock (hours).
    pub fn makespan_hours(&self) -> f64 {
        self.entries
            .iter()
            .map(|e| e.finish_hours)
            .fold(0.0, f64::max)
    }

    /// Finds the entry of an operation.
    pub fn entry_for_operation(&self, operation_id: &str) -> Option<&ScheduleEntry> {
        self.entries.iter().find(|e| e.operation_id == operation_id)
    }

    /// Entries of an order, in commit order.
    pub fn entries_for_order(&self, order_id: &str) -> Vec<&ScheduleEntry> {
        self.entries
            .iter()
            .filter(|e| e.order_id == order_id)
            .collect()
    }

    /// Entries on a machine, in commit order.
    pub fn entries_for_machine(&self, machine_id: &str) -> Vec<&ScheduleEntry> {
        self.entries
            .iter()
            .filter(|e| e.machine_id == machine_id)
            .collect()
    }

    /// Completion of an order: latest finish of its operations (hours).
    pub fn order_completion_hours(&self, order_id: &str) -> Option<f64> {
        self.entries_for_order(order_id)
            .iter()
            .map(|e| e.finish_hours)
            .reduce(f64::max)
    }

    /// Busy hours per machine (processing plus changeover).
    pub fn busy_hours_by_machine(&self) -> BTreeMap<String, f64> {
        let mut busy: BTreeMap<String, f64> = BTreeMap::new();
        for e in &self.entries {
            *busy.entry(e.machine_id.clone()).or_insert(0.0) +=
                e.duration_hours() + e.changeover_hours;
        }
        busy
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the schedule has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn order() -> Order {
        let entry = NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        // Allowed duration: 10h.
        Order::new("A", "P1", entry, entry + chrono::Duration::hours(10))
            .with_operation(Operation::new("A", 1).with_processing_hours(4.0))
            .with_operation(Operation::new("A", 2).with_processing_hours(8.0))
    }

    fn sample_schedule() -> Schedule {
        let o = order();
        let mut s = Schedule::new();
        s.push(ScheduleEntry::place(&o, &o.operations[0], "M1", 0.0, 4.0, 2.0).unwrap());
        s.push(
            ScheduleEntry::place(&o, &o.operations[1], "M2", 4.0, 12.0, 2.0)
                .unwrap()
                .with_changeover(1.0),
        );
        s
    }

    #[test]
    fn test_place_rejects_unrepresentable_finish() {
        let o = order();
        let placed = ScheduleEntry::place(&o, &o.operations[0], "M1", 0.0, 1.0e10, 1.0);
        match placed {
            Err(ScheduleError::TimestampOutOfRange { operation_id, .. }) => {
                assert_eq!(operation_id, "A_op1")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_place_computes_tardiness_and_penalty() {
        let s = sample_schedule();
        let first = &s.entries[0];
        assert_eq!(first.tardiness, 0.0);
        assert_eq!(first.penalty, 0.0);
        assert!(!first.is_late());

        let second = &s.entries[1];
        assert!((second.tardiness - 2.0).abs() < 1e-10);
        assert!((second.penalty - 4.0).abs() < 1e-10);
        assert!(second.is_late());
        let entry = order().entry;
        assert_eq!(second.start, entry + chrono::Duration::hours(4));
        assert_eq!(second.finish, entry + chrono::Duration::hours(12));
    }

    #[test]
    fn test_total_penalty_accumulates() {
        let s = sample_schedule();
        assert!((s.total_penalty - 4.0).abs() < 1e-10);

        let mut merged = Schedule::new();
        merged.extend(sample_schedule());
        merged.extend(sample_schedule());
        assert_eq!(merged.len(), 4);
        assert!((merged.total_penalty - 8.0).abs() < 1e-10);
    }

    #[test]
    fn test_queries() {
        let s = sample_schedule();
        assert_eq!(s.makespan_hours(), 12.0);
        assert_eq!(s.entry_for_operation("A_op2").unwrap().machine_id, "M2");
        assert!(s.entry_for_operation("A_op9").is_none());
        assert_eq!(s.entries_for_order("A").len(), 2);
        assert_eq!(s.entries_for_machine("M1").len(), 1);
        assert_eq!(s.order_completion_hours("A"), Some(12.0));
        assert_eq!(s.order_completion_hours("Z"), None);
    }

    #[test]
    fn test_busy_hours_include_changeover() {
        let busy = sample_schedule().busy_hours_by_machine();
        assert!((busy["M1"] - 4.0).abs() < 1e-10);
        assert!((busy["M2"] - 9.0).abs() < 1e-10);
    }

    #[test]
    fn test_empty_schedule() {
        let s = Schedule::new();
        assert!(s.is_empty());
        assert_eq!(s.makespan_hours(), 0.0);
        assert_eq!(s.total_penalty, 0.0);
    }
}
