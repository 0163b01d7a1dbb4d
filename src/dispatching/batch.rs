//! Batch-partitioned EDD dispatching.
//!
//! Orders are split by entry date into fixed-size batches. Each batch runs
//! an EDD pass on a fork of the machine pool; the fork's final state is
//! folded back before the next batch starts, so machine continuity holds
//! across batches. Batches are strictly sequential.
//!
//! Within a batch, orders keep their input order before the EDD sort, so a
//! single batch covering every order reproduces plain [`Edd`](super::Edd).

use tracing::debug;

use super::edd::dispatch_by_due_date;
use super::{DispatchContext, DispatchPolicy};
use crate::error::{Result, ScheduleError};
use crate::models::{MachinePool, Order, Schedule};

/// Batch-partitioned EDD policy.
#[derive(Debug, Clone, Copy)]
pub struct BatchEdd {
    batch_size: usize,
}

impl BatchEdd {
    /// Creates the policy with the given batch size.
    pub fn new(batch_size: usize) -> Self {
        Self { batch_size }
    }

    /// Configured batch size.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Order indices per batch: entry-date order, then input order inside
    /// each batch.
    pub fn partition(&self, orders: &[Order]) -> Vec<Vec<usize>> {
        let mut by_entry: Vec<usize> = (0..orders.len()).collect();
        by_entry.sort_by_key(|&i| orders[i].entry);

        by_entry
            .chunks(self.batch_size.max(1))
            .map(|chunk| {
                let mut batch = chunk.to_vec();
                batch.sort_unstable();
                batch
            })
            .collect()
    }
}

impl Default for BatchEdd {
    fn default() -> Self {
        Self::new(50)
    }
}

impl DispatchPolicy for BatchEdd {
    fn name(&self) -> &'static str {
        "batch"
    }

    fn dispatch(
        &self,
        orders: &[Order],
        pool: &mut MachinePool,
        context: &DispatchContext,
    ) -> Result<Schedule> {
        if self.batch_size == 0 {
            return Err(ScheduleError::InvalidConfig(
                "batch size must be at least 1".into(),
            ));
        }

        let batches = self.partition(orders);
        let mut schedule = Schedule::new();

        for (n, batch) in batches.iter().enumerate() {
            let members: Vec<&Order> = batch.iter().map(|&i| &orders[i]).collect();

            let mut fork = pool.fork();
            let part = dispatch_by_due_date(&members, &mut fork, context)?;
            pool.absorb(&fork);

            debug!(
                batch = n + 1,
                of = batches.len(),
                orders = members.len(),
                operations = part.len(),
                penalty = part.total_penalty,
                horizon = pool.horizon(),
                "batch dispatched"
            );
            schedule.extend(part);
        }

        Ok(schedule)
    }

    fn description(&self) -> &'static str {
        "Batch-partitioned Earliest Due Date"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatching::Edd;
    use crate::models::Operation;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn day(d: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::days(d)
    }

    fn order(id: &str, entry: i64, due: i64, hours: f64) -> Order {
        Order::new(id, "P", day(entry), day(due)).with_operation(
            Operation::new(id, 1)
                .with_machines(["M1"])
                .with_processing_hours(hours),
        )
    }

    #[test]
    fn test_partition_by_entry_date() {
        let orders = vec![
            order("late", 3, 9, 1.0),
            order("early", 0, 9, 1.0),
            order("mid", 1, 9, 1.0),
            order("mid2", 1, 9, 1.0),
            order("last", 5, 9, 1.0),
        ];
        let batches = BatchEdd::new(2).partition(&orders);
        // Entry order: early(1), mid(2), mid2(3), late(0), last(4).
        assert_eq!(batches, vec![vec![1, 2], vec![0, 3], vec![4]]);
    }

    #[test]
    fn test_machine_state_carries_across_batches() {
        let orders = vec![order("A", 0, 5, 4.0), order("B", 1, 5, 2.0)];
        let mut pool = MachinePool::discover(&orders);
        let schedule = BatchEdd::new(1)
            .dispatch(&orders, &mut pool, &DispatchContext::new())
            .unwrap();

        let b = schedule.entry_for_operation("B_op1").unwrap();
        // Second batch sees M1 busy until 4.
        assert_eq!(b.start_hours, 4.0);
        assert_eq!(b.finish_hours, 6.0);
        assert_eq!(pool.get("M1").unwrap().available_at, 6.0);
    }

    #[test]
    fn test_batch_overrides_due_date_across_batches() {
        // B is due first but arrives later; with size 1 it cannot jump ahead.
        let orders = vec![order("A", 0, 9, 3.0), order("B", 1, 2, 1.0)];

        let mut pool = MachinePool::discover(&orders);
        let batched = BatchEdd::new(1)
            .dispatch(&orders, &mut pool, &DispatchContext::new())
            .unwrap();
        assert_eq!(batched.entries[0].order_id, "A");

        let mut pool = MachinePool::discover(&orders);
        let edd = Edd.dispatch(&orders, &mut pool, &DispatchContext::new()).unwrap();
        assert_eq!(edd.entries[0].order_id, "B");
    }

    #[test]
    fn test_single_batch_matches_edd() {
        let orders = vec![
            order("A", 2, 6, 3.0),
            order("B", 0, 6, 1.0),
            order("C", 1, 4, 2.0),
            order("D", 0, 5, 4.0),
        ];
        let ctx = DispatchContext::new().with_tardiness_weight(2.0);

        let mut edd_pool = MachinePool::discover(&orders);
        let edd = Edd.dispatch(&orders, &mut edd_pool, &ctx).unwrap();

        let mut batch_pool = MachinePool::discover(&orders);
        let batched = BatchEdd::new(orders.len())
            .dispatch(&orders, &mut batch_pool, &ctx)
            .unwrap();

        assert_eq!(edd, batched);
        assert_eq!(edd_pool, batch_pool);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let orders = vec![order("A", 0, 1, 1.0)];
        let mut pool = MachinePool::discover(&orders);
        let err = BatchEdd::new(0)
            .dispatch(&orders, &mut pool, &DispatchContext::new())
            .unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidConfig(_)));
    }
}
