//! Schedule quality metrics (KPIs).
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Makespan (C_max) | Latest finish on the policy clock |
//! | Total Tardiness | Sum of per-operation tardiness |
//! | Maximum Tardiness | Largest single operation delay |
//! | Late Operations | Operations with tardiness > 0 |
//! | On-Time Rate | Fraction of orders whose final operation is on time |
//! | Utilization | Busy hours / makespan, per machine |
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{Order, Schedule};

/// Schedule performance indicators. Times are in hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleKpi {
    pub makespan_hours: f64,
    pub total_tardiness_hours: f64,
    pub max_tardiness_hours: f64,
    pub late_operations: usize,
    /// Fraction of orders finishing on time (0.0..1.0).
    pub on_time_rate: f64,
    /// Mean of per-machine utilization.
    pub avg_utilization: f64,
    pub busy_hours_by_machine: BTreeMap<String, f64>,
    pub utilization_by_machine: BTreeMap<String, f64>,
}

impl ScheduleKpi {
    /// Computes KPIs from a schedule and the orders it was built from.
    pub fn calculate(schedule: &Schedule, orders: &[Order]) -> Self {
        let makespan = schedule.makespan_hours();

        let mut total_tardiness = 0.0;
        let mut max_tardiness: f64 = 0.0;
        let mut late_operations = 0;
        for e in &schedule.entries {
            total_tardiness += e.tardiness;
            max_tardiness = max_tardiness.max(e.tardiness);
            if e.is_late() {
                late_operations += 1;
            }
        }

        let mut counted = 0usize;
        let mut on_time = 0usize;
        for order in orders {
            if let Some(completion) = schedule.order_completion_hours(&order.id) {
                counted += 1;
                if order.tardiness_at(completion) == 0.0 {
                    on_time += 1;
                }
            }
        }

        let busy_hours_by_machine = schedule.busy_hours_by_machine();
        let utilization_by_machine: BTreeMap<String, f64> = if makespan > 0.0 {
            busy_hours_by_machine
                .iter()
                .map(|(id, busy)| (id.clone(), busy / makespan))
                .collect()
        } else {
            BTreeMap::new()
        };
        let avg_utilization = if utilization_by_machine.is_empty() {
            0.0
        } else {
            utilization_by_machine.values().sum::<f64>() / utilization_by_machine.len() as f64
        };

        Self {
            makespan_hours: makespan,
            total_tardiness_hours: total_tardiness,
            max_tardiness_hours: max_tardiness,
            late_operations,
            on_time_rate: if counted == 0 {
                1.0
            } else {
                on_time as f64 / counted as f64
            },
            avg_utilization,
            busy_hours_by_machine,
            utilization_by_machine,
        }
    }
}
