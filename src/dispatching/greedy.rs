//! Global shortest-processing-time greedy dispatching.
//!
//! # Algorithm
//!
//! A discrete-event loop over a ready pool holding, per order, the next
//! unscheduled operation (initially every order's first operation).
//!
//! 1. Pop the ready operation with the smallest processing time
//!    (ties: the one that entered the pool first).
//! 2. Place it on the eligible machine with the earliest finish, where
//!    `start = max(available + changeover, order_finish, 0)`.
//! 3. Commit machine and order state; push the order's next operation.
//!
//! An operation only enters the pool after its predecessor is committed,
//! which is how intra-order precedence holds.
//!
//! # Complexity
//! O(n log n + n * c) where n=operations, c=eligible machines.
//!
//! # Reference
//! Smith (1956), SPT optimal for mean flow time on a single machine.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::debug;

use super::{earliest_finish, DispatchContext, DispatchPolicy};
use crate::error::Result;
use crate::models::{MachinePool, Order, Schedule, ScheduleEntry};

/// Shortest-processing-time greedy policy with precedence.
#[derive(Debug, Clone, Copy, Default)]
pub struct SptGreedy;

/// Ready-pool entry. Max-heap order is reversed so the heap pops the
/// shortest operation, then the earliest arrival in the pool.
#[derive(Debug)]
struct Ready {
    processing_hours: f64,
    arrival: usize,
    order: usize,
    step: usize,
}

impl PartialEq for Ready {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ready {}

impl PartialOrd for Ready {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ready {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .processing_hours
            .total_cmp(&self.processing_hours)
            .then_with(|| other.arrival.cmp(&self.arrival))
    }
}

impl DispatchPolicy for SptGreedy {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn dispatch(
        &self,
        orders: &[Order],
        pool: &mut MachinePool,
        context: &DispatchContext,
    ) -> Result<Schedule> {
        let mut schedule = Schedule::new();
        let mut order_finish = vec![0.0_f64; orders.len()];
        let mut ready = BinaryHeap::new();
        let mut arrivals = 0usize;

        for (i, order) in orders.iter().enumerate() {
            if let Some(op) = order.operations.first() {
                ready.push(Ready {
                    processing_hours: op.processing_hours,
                    arrival: arrivals,
                    order: i,
                    step: 0,
                });
                arrivals += 1;
            }
        }

        while let Some(next) = ready.pop() {
            let order = &orders[next.order];
            let op = &order.operations[next.step];

            let placement = earliest_finish(
                op,
                pool,
                order_finish[next.order].max(0.0),
                |machine, last| context.changeovers.changeover(machine, last, &order.product),
            )?;

            pool.commit(&placement.machine_id, placement.finish_hours, &order.product);
            order_finish[next.order] = placement.finish_hours;

            debug!(
                operation = %op.id,
                machine = %placement.machine_id,
                changeover = placement.changeover_hours,
                start = placement.start_hours,
                finish = placement.finish_hours,
                "greedy placed operation"
            );

            if let Some(following) = order.operations.get(next.step + 1) {
                ready.push(Ready {
                    processing_hours: following.processing_hours,
                    arrival: arrivals,
                    order: next.order,
                    step: next.step + 1,
                });
                arrivals += 1;
            }

            schedule.push(
                ScheduleEntry::place(
                    order,
                    op,
                    placement.machine_id,
                    placement.start_hours,
                    placement.finish_hours,
                    context.tardiness_weight,
                )?
                .with_changeover(placement.changeover_hours),
            );
        }

        Ok(schedule)
    }

    fn description(&self) -> &'static str {
        "Global Shortest Processing Time with precedence"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChangeoverMatrix, Operation};
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn day(d: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::days(d)
    }

    fn single(id: &str, product: &str, machines: &[&str], hours: f64) -> Order {
        Order::new(id, product, day(0), day(2)).with_operation(op(id, 1, machines, hours))
    }

    fn op(order_id: &str, sequence: u32, machines: &[&str], hours: f64) -> Operation {
        Operation::new(order_id, sequence)
            .with_machines(machines.iter().copied())
            .with_processing_hours(hours)
    }

    fn two_orders() -> Vec<Order> {
        vec![
            Order::new("A", "PA", day(0), day(2))
                .with_operation(op("A", 1, &["M1"], 5.0))
                .with_operation(op("A", 2, &["M1", "M2"], 3.0)),
            Order::new("B", "PB", day(0), day(1)).with_operation(op("B", 1, &["M2"], 4.0)),
        ]
    }

    #[test]
    fn test_greedy_picks_shortest_ready_first() {
        let orders = two_orders();
        let mut pool = MachinePool::discover(&orders);
        let schedule = SptGreedy
            .dispatch(&orders, &mut pool, &DispatchContext::new())
            .unwrap();

        let ids: Vec<&str> = schedule.entries.iter().map(|e| e.operation_id.as_str()).collect();
        // B_op1 (4h) beats A_op1 (5h); A_op2 only becomes ready after A_op1.
        assert_eq!(ids, vec!["B_op1", "A_op1", "A_op2"]);

        let a2 = schedule.entry_for_operation("A_op2").unwrap();
        assert_eq!(a2.start_hours, 5.0);
        assert_eq!(a2.finish_hours, 8.0);
    }

    #[test]
    fn test_greedy_successor_competes_with_pool() {
        // A: 1h then 1h; B: 3h. After A_op1 commits, A_op2 (1h) beats B (3h).
        let orders = vec![
            Order::new("A", "P", day(0), day(1))
                .with_operation(op("A", 1, &["M1"], 1.0))
                .with_operation(op("A", 2, &["M1"], 1.0)),
            single("B", "P", &["M1"], 3.0),
        ];
        let mut pool = MachinePool::discover(&orders);
        let schedule = SptGreedy
            .dispatch(&orders, &mut pool, &DispatchContext::new())
            .unwrap();

        let ids: Vec<&str> = schedule.entries.iter().map(|e| e.operation_id.as_str()).collect();
        assert_eq!(ids, vec!["A_op1", "A_op2", "B_op1"]);
    }

    #[test]
    fn test_greedy_ties_first_in() {
        let orders = vec![
            single("X", "P", &["M1"], 2.0),
            single("Y", "P", &["M1"], 2.0),
            single("Z", "P", &["M1"], 2.0),
        ];
        let mut pool = MachinePool::discover(&orders);
        let schedule = SptGreedy
            .dispatch(&orders, &mut pool, &DispatchContext::new())
            .unwrap();

        let ids: Vec<&str> = schedule.entries.iter().map(|e| e.order_id.as_str()).collect();
        assert_eq!(ids, vec!["X", "Y", "Z"]);
    }

    #[test]
    fn test_greedy_charges_changeover_on_product_switch() {
        let orders = vec![
            single("A", "P1", &["M1"], 1.0),
            single("B", "P2", &["M1"], 2.0),
            single("C", "P2", &["M1"], 3.0),
        ];
        let mut pool = MachinePool::discover(&orders);
        let ctx = DispatchContext::new().with_changeovers(ChangeoverMatrix::uniform(0.5));
        let schedule = SptGreedy.dispatch(&orders, &mut pool, &ctx).unwrap();

        let a = schedule.entry_for_operation("A_op1").unwrap();
        assert_eq!((a.changeover_hours, a.start_hours, a.finish_hours), (0.0, 0.0, 1.0));

        let b = schedule.entry_for_operation("B_op1").unwrap();
        assert_eq!((b.changeover_hours, b.start_hours, b.finish_hours), (0.5, 1.5, 3.5));

        // Same product as the previous job on M1: no switch.
        let c = schedule.entry_for_operation("C_op1").unwrap();
        assert_eq!((c.changeover_hours, c.start_hours), (0.0, 3.5));
    }

    #[test]
    fn test_greedy_changeover_steers_machine_choice() {
        let orders = vec![single("A", "P1", &["M1", "M2"], 2.0)];
        let mut pool = MachinePool::discover(&orders);
        pool.commit("M1", 1.0, "P9");
        pool.commit("M2", 1.5, "P1");
        let ctx = DispatchContext::new().with_changeovers(ChangeoverMatrix::uniform(1.0));
        let schedule = SptGreedy.dispatch(&orders, &mut pool, &ctx).unwrap();

        // M1: 1.0 + 1.0 switch → finish 4.0; M2: 1.5 + 0 → finish 3.5.
        assert_eq!(schedule.entries[0].machine_id, "M2");
        assert_eq!(schedule.entries[0].finish_hours, 3.5);
    }

    #[test]
    fn test_greedy_empty_orders() {
        let mut pool = MachinePool::from_ids(["M1"]);
        let schedule = SptGreedy
            .dispatch(&[], &mut pool, &DispatchContext::new())
            .unwrap();
        assert!(schedule.is_empty());
        assert_eq!(schedule.total_penalty, 0.0);
    }
}
