//! Earliest-Due-Date dispatching.
//!
//! # Algorithm
//!
//! 1. Stable-sort orders by due timestamp (ties keep input order).
//! 2. For each order, place its operations in sequence order.
//! 3. Each operation goes to the eligible machine with the earliest
//!    finish, never starting before the previous operation of the same
//!    order finished.
//!
//! No changeover time is charged. Tardiness is measured per operation
//! against the order's allowed duration (`due - entry`).
//!
//! # Complexity
//! O(n log n + n * m * c) where n=orders, m=operations/order,
//! c=eligible machines.
//!
//! # Reference
//! Jackson (1955): optimal for maximum lateness only on a single machine
//! without precedence; a heuristic here.

use tracing::debug;

use super::{earliest_finish, DispatchContext, DispatchPolicy};
use crate::error::Result;
use crate::models::{MachinePool, Order, Schedule, ScheduleEntry};

/// Earliest-Due-Date policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Edd;

impl DispatchPolicy for Edd {
    fn name(&self) -> &'static str {
        "edd"
    }

    fn dispatch(
        &self,
        orders: &[Order],
        pool: &mut MachinePool,
        context: &DispatchContext,
    ) -> Result<Schedule> {
        let refs: Vec<&Order> = orders.iter().collect();
        dispatch_by_due_date(&refs, pool, context)
    }

    fn description(&self) -> &'static str {
        "Earliest Due Date"
    }
}

/// EDD pass over an arbitrary subset of orders, in the given tie order.
pub(crate) fn dispatch_by_due_date(
    orders: &[&Order],
    pool: &mut MachinePool,
    context: &DispatchContext,
) -> Result<Schedule> {
    let mut sorted = orders.to_vec();
    sorted.sort_by_key(|o| o.due);

    let mut schedule = Schedule::new();
    for order in sorted {
        let mut prev_finish = 0.0;

        for op in &order.operations {
            let placement = earliest_finish(op, pool, prev_finish, |_, _| 0.0)?;

            pool.commit(&placement.machine_id, placement.finish_hours, &order.product);
            prev_finish = placement.finish_hours;

            debug!(
                operation = %op.id,
                machine = %placement.machine_id,
                start = placement.start_hours,
                finish = placement.finish_hours,
                "edd placed operation"
            );

            schedule.push(ScheduleEntry::place(
                order,
                op,
                placement.machine_id,
                placement.start_hours,
                placement.finish_hours,
                context.tardiness_weight,
            )?);
        }
    }

    Ok(schedule)
}
