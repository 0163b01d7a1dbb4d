//! Changeover (switch) time lookup.
//!
//! A machine that moves from one product to another needs extra setup
//! time. Entries can be given per machine and product transition, or per
//! ordered machine pair; everything else resolves to a single default.
//!
//! # Reference
//! Allahverdi et al. (2008), "A survey of scheduling problems with
//! setup times or costs"

use std::collections::HashMap;

/// Read-only changeover table (hours).
#[derive(Debug, Clone, Default)]
pub struct ChangeoverMatrix {
    /// (from_machine, to_machine) → hours.
    machine_pairs: HashMap<(String, String), f64>,
    /// machine → (from_product, to_product) → hours.
    product_transitions: HashMap<String, HashMap<(String, String), f64>>,
    /// Switch time when no explicit entry exists.
    pub default_hours: f64,
}

impl ChangeoverMatrix {
    /// Creates an empty matrix with a zero default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Matrix where every transition costs `default_hours`.
    pub fn uniform(default_hours: f64) -> Self {
        Self::new().with_default(default_hours)
    }

    /// Sets the default switch time. Negative values clamp to zero.
    pub fn with_default(mut self, hours: f64) -> Self {
        self.default_hours = hours.max(0.0);
        self
    }

    /// Defines the switch time between an ordered machine pair.
    pub fn set_machine_pair(&mut self, from: impl Into<String>, to: impl Into<String>, hours: f64) {
        self.machine_pairs
            .insert((from.into(), to.into()), hours.max(0.0));
    }

    /// Defines the switch time on `machine` from one product to another.
    pub fn set_product_transition(
        &mut self,
        machine: impl Into<String>,
        from_product: impl Into<String>,
        to_product: impl Into<String>,
        hours: f64,
    ) {
        self.product_transitions
            .entry(machine.into())
            .or_default()
            .insert((from_product.into(), to_product.into()), hours.max(0.0));
    }

    /// Switch time between two machines; the default if unset.
    pub fn machine_pair(&self, from: &str, to: &str) -> f64 {
        self.machine_pairs
            .get(&(from.to_string(), to.to_string()))
            .copied()
            .unwrap_or(self.default_hours)
    }

    /// Setup time `machine` needs before running `next` after `previous`.
    ///
    /// Zero when the machine has no history or the product is unchanged.
    /// Otherwise: explicit product transition, then the machine's own
    /// (machine, machine) pair entry, then the default.
    pub fn changeover(&self, machine: &str, previous: Option<&str>, next: &str) -> f64 {
        let previous = match previous {
            Some(p) if p != next => p,
            _ => return 0.0,
        };

        if let Some(hours) = self
            .product_transitions
            .get(machine)
            .and_then(|t| t.get(&(previous.to_string(), next.to_string())))
        {
            return *hours;
        }

        self.machine_pair(machine, machine)
    }

    /// Number of explicitly defined entries.
    pub fn entry_count(&self) -> usize {
        self.machine_pairs.len()
            + self
                .product_transitions
                .values()
                .map(HashMap::len)
                .sum::<usize>()
    }
}
