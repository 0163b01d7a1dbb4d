//! Machine and machine pool.
//!
//! Machine state (next free time, last product) is the only mutable
//! resource a dispatching run touches. A pool is owned by exactly one run;
//! batch partitioning works on an explicit [`MachinePool::fork`] and folds
//! the result back with [`MachinePool::absorb`].

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use super::Order;

/// A machine and its dispatching state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    /// Unique machine identifier.
    pub id: String,
    /// Earliest time (hours) a new operation may start.
    pub available_at: f64,
    /// Product of the most recently committed operation.
    pub last_product: Option<String>,
}

impl Machine {
    /// Creates an idle machine (free at t=0, no history).
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            available_at: 0.0,
            last_product: None,
        }
    }
}

/// Ordered set of machines with per-machine state.
///
/// Iteration follows registration order, which for discovered pools is
/// lexicographic by machine id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MachinePool {
    machines: Vec<Machine>,
    index: HashMap<String, usize>,
}

impl MachinePool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every machine named in any operation's eligibility set.
    pub fn discover(orders: &[Order]) -> Self {
        let ids: BTreeSet<&str> = orders
            .iter()
            .flat_map(|o| o.operations.iter())
            .flat_map(|op| op.machines.iter().map(String::as_str))
            .collect();
        Self::from_ids(ids)
    }

    /// Creates a pool of idle machines in the given order.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut pool = Self::new();
        for id in ids {
            pool.register(id);
        }
        pool
    }

    /// Registers an idle machine. Re-registering an id is a no-op.
    pub fn register(&mut self, id: impl Into<String>) {
        let id = id.into();
        if self.index.contains_key(&id) {
            return;
        }
        self.index.insert(id.clone(), self.machines.len());
        self.machines.push(Machine::new(id));
    }

    /// Looks up a machine.
    pub fn get(&self, id: &str) -> Option<&Machine> {
        self.index.get(id).map(|&i| &self.machines[i])
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Records that `id` runs `product` until `finish_hours`.
    ///
    /// Returns `false` if the machine is not registered.
    pub fn commit(&mut self, id: &str, finish_hours: f64, product: &str) -> bool {
        match self.index.get(id) {
            Some(&i) => {
                let machine = &mut self.machines[i];
                machine.available_at = finish_hours;
                machine.last_product = Some(product.to_string());
                true
            }
            None => false,
        }
    }

    /// Deep copy for an isolated sub-run.
    pub fn fork(&self) -> Self {
        self.clone()
    }

    /// Overwrites the state of every machine in `self` with the state the
    /// same machine has in `other`. Machines absent from `other` keep
    /// their current state.
    pub fn absorb(&mut self, other: &MachinePool) {
        for machine in &mut self.machines {
            if let Some(theirs) = other.get(&machine.id) {
                machine.available_at = theirs.available_at;
                machine.last_product = theirs.last_product.clone();
            }
        }
    }

    /// Machines in registration order.
    pub fn machines(&self) -> &[Machine] {
        &self.machines
    }

    /// Machine ids in registration order.
    pub fn ids(&self) -> Vec<String> {
        self.machines.iter().map(|m| m.id.clone()).collect()
    }

    /// Latest `available_at` across the pool (hours).
    pub fn horizon(&self) -> f64 {
        self.machines
            .iter()
            .map(|m| m.available_at)
            .fold(0.0, f64::max)
    }

    /// Number of machines.
    pub fn len(&self) -> usize {
        self.machines.len()
    }

    /// Whether the pool has no machines.
    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }
}
