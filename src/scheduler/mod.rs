//! Scheduling entry point, configuration, and result assembly.
//!
//! # Flow
//!
//! records → [`build_orders`] → [`validate_orders`] → dispatching policy
//! on a fresh machine pool → [`ScheduleReport`] → optional [`HistorySink`].
//!
//! # Example
//!
//! ```
//! use shopfloor_schedule::ingest::OrderRecord;
//! use shopfloor_schedule::scheduler::run_schedule;
//!
//! let records = vec![
//!     OrderRecord::new("A", 1)
//!         .with_product("P1")
//!         .with_machines("M1,M2")
//!         .with_processing_hours(5.0)
//!         .with_window("2025-03-01 00:00", "2025-03-03 00:00"),
//! ];
//! let report = run_schedule(&records, "edd", 50, 1.0, 1.0).unwrap();
//! assert_eq!(report.rows.len(), 1);
//! assert_eq!(report.metrics.total_penalty, 0.0);
//! ```

mod config;
mod history;
mod kpi;
mod report;

pub use config::ScheduleConfig;
pub use history::{HistoryRecord, HistorySink, MODULE_NAME};
pub use kpi::ScheduleKpi;
pub use report::{ReportRow, RunMetrics, ScheduleReport, TIMESTAMP_FORMAT};

use std::time::Instant;

use serde_json::json;
use tracing::{info, warn};

use crate::dispatching::{DispatchContext, PolicyKind};
use crate::error::Result;
use crate::ingest::{build_orders, OrderRecord};
use crate::models::{ChangeoverMatrix, MachinePool, Order, Schedule};
use crate::validation::validate_orders;

/// Exact output of a dispatching run, before report formatting.
#[derive(Debug, Clone)]
pub struct ScheduleOutcome {
    /// Policy name.
    pub policy: &'static str,
    pub schedule: Schedule,
    /// Exact (unrounded) run metrics.
    pub metrics: RunMetrics,
    /// Machine state after the run.
    pub machines: MachinePool,
    /// Non-fatal validation findings.
    pub warnings: Vec<String>,
}

/// Configured scheduling engine.
///
/// Every run works on its own copy of the machine pool, so one
/// `Scheduler` can serve independent requests.
#[derive(Debug, Clone)]
pub struct Scheduler {
    config: ScheduleConfig,
    context: DispatchContext,
}

impl Scheduler {
    /// Creates a scheduler; rejects invalid parameters.
    pub fn new(config: ScheduleConfig) -> Result<Self> {
        config.validate()?;
        let context = DispatchContext::new()
            .with_tardiness_weight(config.tardiness_weight)
            .with_changeovers(ChangeoverMatrix::uniform(config.default_changeover_hours));
        Ok(Self { config, context })
    }

    /// Replaces the uniform changeover matrix.
    pub fn with_changeovers(mut self, changeovers: ChangeoverMatrix) -> Self {
        self.context.changeovers = changeovers;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    /// Builds orders from `records`, schedules them, and assembles the report.
    pub fn run(&self, records: &[OrderRecord]) -> Result<ScheduleReport> {
        let book = build_orders(records)?;
        let outcome = self.dispatch(&book.orders, &book.machines)?;
        Ok(ScheduleReport::assemble(outcome.policy, &outcome.schedule, &book.orders)
            .with_warnings(outcome.warnings))
    }

    /// Like [`run`](Self::run), then hands the run to `sink`.
    ///
    /// Nothing is recorded when the run fails.
    pub fn run_and_record(
        &self,
        records: &[OrderRecord],
        sink: &mut dyn HistorySink,
    ) -> Result<ScheduleReport> {
        let report = self.run(records)?;

        let params = json!({
            "inputData": records,
            "batchSize": self.config.batch_size,
            "tardinessWeight": self.config.tardiness_weight,
            "defaultChangeoverHours": self.config.default_changeover_hours,
        });
        let result = serde_json::to_value(&report)?;
        sink.record(HistoryRecord::new(self.config.policy.as_str(), params, result));

        Ok(report)
    }

    /// Validates and dispatches `orders` on a copy of `machines`.
    pub fn dispatch(&self, orders: &[Order], machines: &MachinePool) -> Result<ScheduleOutcome> {
        let started = Instant::now();

        let mut warnings = Vec::new();
        for issue in validate_orders(orders, machines) {
            if issue.is_fatal() {
                return Err(issue.into());
            }
            warn!(entity = %issue.entity_id, kind = ?issue.kind, "{}", issue.message);
            warnings.push(issue.message);
        }

        let policy = self.config.policy.build(self.config.batch_size);
        let operations: usize = orders.iter().map(Order::operation_count).sum();
        info!(
            policy = policy.name(),
            orders = orders.len(),
            operations,
            machines = machines.len(),
            "dispatch started"
        );

        let mut pool = machines.fork();
        let schedule = policy.dispatch(orders, &mut pool, &self.context)?;
        let metrics = RunMetrics::from_schedule(&schedule, orders.len());

        info!(
            policy = policy.name(),
            total_penalty = metrics.total_penalty,
            makespan = schedule.makespan_hours(),
            elapsed = ?started.elapsed(),
            "dispatch finished"
        );

        Ok(ScheduleOutcome {
            policy: policy.name(),
            schedule,
            metrics,
            machines: pool,
            warnings,
        })
    }
}

/// One-shot entry point.
///
/// The policy name is parsed before any record is read, so an unknown
/// selector fails without doing scheduling work.
pub fn run_schedule(
    records: &[OrderRecord],
    policy: &str,
    batch_size: usize,
    tardiness_weight: f64,
    default_changeover_hours: f64,
) -> Result<ScheduleReport> {
    let policy: PolicyKind = policy.parse()?;
    let config = ScheduleConfig::new(policy)
        .with_batch_size(batch_size)
        .with_tardiness_weight(tardiness_weight)
        .with_default_changeover(default_changeover_hours);
    Scheduler::new(config)?.run(records)
}
