//! Schedule & metrics assembler.
//!
//! Converts a dispatching result into the external report: readable
//! timestamps, display rounding, and the aggregate run metrics. Values
//! computed by the policy are never altered; rounding only applies to the
//! report copy.

use serde::{Deserialize, Serialize};

use super::ScheduleKpi;
use crate::models::{Order, Schedule, ScheduleEntry};

/// Timestamp layout used in reports.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Decimal places kept for display.
const DISPLAY_DECIMALS: i32 = 2;

/// Aggregate penalty metrics of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunMetrics {
    /// Sum of penalties over all schedule entries.
    pub total_penalty: f64,
    /// Total penalty divided by order count; 0 without orders.
    pub average_penalty: f64,
}

impl RunMetrics {
    /// Exact metrics of `schedule` over `order_count` orders.
    pub fn from_schedule(schedule: &Schedule, order_count: usize) -> Self {
        let total_penalty = schedule.total_penalty;
        Self {
            total_penalty,
            average_penalty: if order_count == 0 {
                0.0
            } else {
                total_penalty / order_count as f64
            },
        }
    }

    /// Copy rounded for display.
    pub fn rounded(&self) -> Self {
        Self {
            total_penalty: round(self.total_penalty),
            average_penalty: round(self.average_penalty),
        }
    }
}

/// One schedule entry in report form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub order_id: String,
    pub product: String,
    pub operation_id: String,
    pub machine_id: String,
    pub processing_hours: f64,
    pub start: String,
    pub finish: String,
    pub tardiness_hours: f64,
    pub penalty: f64,
}

impl From<&ScheduleEntry> for ReportRow {
    fn from(e: &ScheduleEntry) -> Self {
        Self {
            order_id: e.order_id.clone(),
            product: e.product.clone(),
            operation_id: e.operation_id.clone(),
            machine_id: e.machine_id.clone(),
            processing_hours: e.processing_hours,
            start: e.start.format(TIMESTAMP_FORMAT).to_string(),
            finish: e.finish.format(TIMESTAMP_FORMAT).to_string(),
            tardiness_hours: round(e.tardiness),
            penalty: round(e.penalty),
        }
    }
}

/// Result payload of a scheduling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleReport {
    /// Policy that produced the schedule.
    pub policy: String,
    /// Rows in commit order.
    pub rows: Vec<ReportRow>,
    /// Display-rounded run metrics.
    pub metrics: RunMetrics,
    pub kpi: ScheduleKpi,
    /// Non-fatal data-quality findings.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ScheduleReport {
    /// Assembles the report for `schedule` built from `orders`.
    pub fn assemble(policy: &str, schedule: &Schedule, orders: &[Order]) -> Self {
        Self {
            policy: policy.to_string(),
            rows: schedule.entries.iter().map(ReportRow::from).collect(),
            metrics: RunMetrics::from_schedule(schedule, orders.len()).rounded(),
            kpi: ScheduleKpi::calculate(schedule, orders),
            warnings: Vec::new(),
        }
    }

    /// Attaches data-quality warnings.
    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }
}

fn round(value: f64) -> f64 {
    let factor = 10f64.powi(DISPLAY_DECIMALS);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Operation;
    use chrono::{Duration, NaiveDate};

    fn order() -> Order {
        let entry = NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        Order::new("A", "P1", entry, entry + Duration::hours(1))
            .with_operation(Operation::new("A", 1).with_processing_hours(1.333))
    }

    fn schedule(o: &Order) -> Schedule {
        let mut s = Schedule::new();
        s.push(ScheduleEntry::place(o, &o.operations[0], "M1", 0.5, 1.833, 3.0).unwrap());
        s
    }

    #[test]
    fn test_row_formatting() {
        let o = order();
        let s = schedule(&o);
        let row = ReportRow::from(&s.entries[0]);

        assert_eq!(row.start, "2025-03-01 08:30");
        assert_eq!(row.finish, "2025-03-01 09:49");
        assert_eq!(row.tardiness_hours, 0.83);
        assert_eq!(row.penalty, 2.5);
    }

    #[test]
    fn test_assemble_leaves_schedule_exact() {
        let o = order();
        let s = schedule(&o);
        let report = ScheduleReport::assemble("edd", &s, std::slice::from_ref(&o));

        assert_eq!(report.metrics.total_penalty, 2.5);
        assert!((s.total_penalty - 2.499).abs() < 1e-9);
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.policy, "edd");
    }

    #[test]
    fn test_metrics_average() {
        let o = order();
        let s = schedule(&o);
        let m = RunMetrics::from_schedule(&s, 2);
        assert!((m.average_penalty - s.total_penalty / 2.0).abs() < 1e-12);

        let empty = RunMetrics::from_schedule(&Schedule::new(), 0);
        assert_eq!(empty, RunMetrics::default());
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let o = order();
        let report = ScheduleReport::assemble("edd", &schedule(&o), std::slice::from_ref(&o));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["rows"][0]["operationId"], "A_op1");
        assert_eq!(json["metrics"]["totalPenalty"], 2.5);
        assert!(json.get("warnings").is_none());
    }
}
