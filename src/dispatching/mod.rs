//! Dispatching policies.
//!
//! Each policy takes the order model and an owned machine pool and commits
//! every operation to a machine and time interval.
//!
//! | Policy | Order of work | Changeover |
//! |--------|---------------|------------|
//! | [`Edd`] | orders by due date, operations in sequence | no |
//! | [`SptGreedy`] | shortest ready operation first | yes |
//! | [`BatchEdd`] | entry-date batches, EDD inside each | no |
//!
//! # Usage
//!
//! ```
//! use shopfloor_schedule::dispatching::{DispatchContext, DispatchPolicy, PolicyKind};
//! use shopfloor_schedule::models::MachinePool;
//!
//! let policy = "greedy".parse::<PolicyKind>().unwrap().build(50);
//! let mut pool = MachinePool::from_ids(["M1"]);
//! let schedule = policy.dispatch(&[], &mut pool, &DispatchContext::new()).unwrap();
//! assert!(schedule.is_empty());
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Jackson (1955), EDD optimal for maximum lateness on a single machine

mod batch;
mod context;
mod edd;
mod greedy;

pub use batch::BatchEdd;
pub use context::DispatchContext;
pub use edd::Edd;
pub use greedy::SptGreedy;

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::str::FromStr;

use crate::error::{Result, ScheduleError};
use crate::models::{MachinePool, Operation, Order, Schedule};

/// A policy that places every operation of a set of orders.
///
/// Policies fail fast: if any operation cannot be placed the run aborts
/// and no partial schedule is returned. The pool is left in whatever
/// state the run reached, so callers retry with a fresh pool.
pub trait DispatchPolicy: Send + Sync + Debug {
    /// Policy name (e.g., "edd").
    fn name(&self) -> &'static str;

    /// Places every operation of `orders`, mutating `pool`.
    fn dispatch(
        &self,
        orders: &[Order],
        pool: &mut MachinePool,
        context: &DispatchContext,
    ) -> Result<Schedule>;

    /// Policy description.
    fn description(&self) -> &'static str {
        self.name()
    }
}

/// Policy selector accepted at the entry point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    #[default]
    Edd,
    Greedy,
    Batch,
}

impl PolicyKind {
    /// All selectors.
    pub const ALL: [PolicyKind; 3] = [PolicyKind::Edd, PolicyKind::Greedy, PolicyKind::Batch];

    /// Selector name as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Edd => "edd",
            Self::Greedy => "greedy",
            Self::Batch => "batch",
        }
    }

    /// Instantiates the policy. `batch_size` is only read by `batch`.
    pub fn build(self, batch_size: usize) -> Box<dyn DispatchPolicy> {
        match self {
            Self::Edd => Box::new(Edd),
            Self::Greedy => Box::new(SptGreedy),
            Self::Batch => Box::new(BatchEdd::new(batch_size)),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyKind {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "edd" => Ok(Self::Edd),
            "greedy" => Ok(Self::Greedy),
            "batch" => Ok(Self::Batch),
            _ => Err(ScheduleError::UnknownPolicy(s.to_string())),
        }
    }
}

/// Best machine found for one operation.
#[derive(Debug, Clone)]
pub(crate) struct Placement {
    pub machine_id: String,
    pub changeover_hours: f64,
    pub start_hours: f64,
    pub finish_hours: f64,
}

/// Evaluates every eligible machine and returns the one with the earliest
/// finish. Ties keep the first machine in the eligibility list.
///
/// `start = max(available + setup(machine), ready_hours)` where `setup`
/// returns the changeover the machine needs before this operation.
pub(crate) fn earliest_finish<F>(
    operation: &Operation,
    pool: &MachinePool,
    ready_hours: f64,
    setup: F,
) -> Result<Placement>
where
    F: Fn(&str, Option<&str>) -> f64,
{
    let mut best: Option<Placement> = None;

    for machine_id in &operation.machines {
        let machine = pool
            .get(machine_id)
            .ok_or_else(|| ScheduleError::UnknownMachine {
                operation_id: operation.id.clone(),
                machine_id: machine_id.clone(),
            })?;

        let changeover = setup(&machine.id, machine.last_product.as_deref());
        let start = (machine.available_at + changeover).max(ready_hours);
        let finish = start + operation.processing_hours;

        if best.as_ref().map_or(true, |b| finish < b.finish_hours) {
            best = Some(Placement {
                machine_id: machine.id.clone(),
                changeover_hours: changeover,
                start_hours: start,
                finish_hours: finish,
            });
        }
    }

    best.ok_or_else(|| ScheduleError::NoEligibleMachine(operation.id.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_kind_parse() {
        assert_eq!("edd".parse::<PolicyKind>().unwrap(), PolicyKind::Edd);
        assert_eq!(" Greedy ".parse::<PolicyKind>().unwrap(), PolicyKind::Greedy);
        assert_eq!("BATCH".parse::<PolicyKind>().unwrap(), PolicyKind::Batch);

        let err = "fifo".parse::<PolicyKind>().unwrap_err();
        assert!(matches!(err, ScheduleError::UnknownPolicy(ref s) if s == "fifo"));
    }

    #[test]
    fn test_policy_kind_roundtrip_names() {
        for kind in PolicyKind::ALL {
            assert_eq!(kind.as_str().parse::<PolicyKind>().unwrap(), kind);
            assert_eq!(kind.build(10).name(), kind.as_str());
        }
        assert_eq!(
            serde_json::to_string(&PolicyKind::Greedy).unwrap(),
            "\"greedy\""
        );
    }

    #[test]
    fn test_earliest_finish_tie_keeps_first() {
        let mut pool = MachinePool::from_ids(["M1", "M2"]);
        pool.commit("M1", 5.0, "P");
        pool.commit("M2", 4.0, "P");
        let op = Operation::new("A", 2)
            .with_machines(["M1", "M2"])
            .with_processing_hours(3.0);

        // Both can start at 5 (order is busy until then).
        let p = earliest_finish(&op, &pool, 5.0, |_, _| 0.0).unwrap();
        assert_eq!(p.machine_id, "M1");
        assert_eq!(p.start_hours, 5.0);
        assert_eq!(p.finish_hours, 8.0);
    }

    #[test]
    fn test_earliest_finish_prefers_free_machine() {
        let mut pool = MachinePool::from_ids(["M1", "M2"]);
        pool.commit("M1", 5.0, "P");
        let op = Operation::new("A", 1)
            .with_machines(["M1", "M2"])
            .with_processing_hours(2.0);

        let p = earliest_finish(&op, &pool, 0.0, |_, _| 0.0).unwrap();
        assert_eq!(p.machine_id, "M2");
        assert_eq!(p.finish_hours, 2.0);
    }

    #[test]
    fn test_earliest_finish_applies_setup() {
        let mut pool = MachinePool::from_ids(["M1"]);
        pool.commit("M1", 2.0, "OTHER");
        let op = Operation::new("A", 1)
            .with_machines(["M1"])
            .with_processing_hours(1.0);

        let p = earliest_finish(&op, &pool, 0.0, |_, last| {
            if last.is_some() {
                1.5
            } else {
                0.0
            }
        })
        .unwrap();
        assert_eq!(p.changeover_hours, 1.5);
        assert_eq!(p.start_hours, 3.5);
        assert_eq!(p.finish_hours, 4.5);
    }

    #[test]
    fn test_earliest_finish_errors() {
        let pool = MachinePool::from_ids(["M1"]);

        let none = Operation::new("A", 1);
        assert!(matches!(
            earliest_finish(&none, &pool, 0.0, |_, _| 0.0),
            Err(ScheduleError::NoEligibleMachine(ref id)) if id == "A_op1"
        ));

        let ghost = Operation::new("A", 1).with_machines(["M9"]);
        assert!(matches!(
            earliest_finish(&ghost, &pool, 0.0, |_, _| 0.0),
            Err(ScheduleError::UnknownMachine { .. })
        ));
    }
}
