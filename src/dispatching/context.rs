//! Read-only parameters shared by every dispatching policy.

use crate::models::ChangeoverMatrix;

/// Run parameters passed to a dispatching policy.
///
/// The context never changes during a run; all mutable state lives in the
/// [`MachinePool`](crate::models::MachinePool) the policy is handed.
#[derive(Debug, Clone)]
pub struct DispatchContext {
    /// Multiplier applied to every operation's tardiness.
    pub tardiness_weight: f64,
    /// Product switch times.
    pub changeovers: ChangeoverMatrix,
}

impl DispatchContext {
    /// Unit weight, no changeover cost.
    pub fn new() -> Self {
        Self {
            tardiness_weight: 1.0,
            changeovers: ChangeoverMatrix::new(),
        }
    }

    /// Sets the tardiness weight.
    pub fn with_tardiness_weight(mut self, weight: f64) -> Self {
        self.tardiness_weight = weight;
        self
    }

    /// Sets the changeover matrix.
    pub fn with_changeovers(mut self, changeovers: ChangeoverMatrix) -> Self {
        self.changeovers = changeovers;
        self
    }
}

impl Default for DispatchContext {
    fn default() -> Self {
        Self::new()
    }
}
