//! Input validation for a scheduling run.
//!
//! Checks the built order model against the machine pool before any
//! operation is dispatched. Detects:
//! - Duplicate sequence numbers within an order (fatal)
//! - Operations with no eligible machine, or an empty pool (fatal)
//! - References to unregistered machines (fatal)
//! - Gaps in sequence numbering (warning)
//! - Due date before entry date (warning; the run proceeds and reports
//!   the resulting tardiness)

use std::collections::HashSet;

use crate::error::ScheduleError;
use crate::models::{MachinePool, Order};

/// A validation finding.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    /// Issue category.
    pub kind: ValidationIssueKind,
    /// Offending order, operation or machine.
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation findings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssueKind {
    /// Two operations of one order share a sequence number.
    DuplicateSequence { sequence: u32 },
    /// Sequence numbers do not run 1, 2, 3, ...
    NonContiguousSequence,
    /// Due timestamp precedes entry timestamp.
    DueBeforeEntry,
    /// Operation eligibility is empty.
    NoEligibleMachine,
    /// Operation names a machine the pool does not know.
    UnknownMachine { machine_id: String },
    /// Orders exist but no machine does.
    EmptyMachinePool,
}

impl ValidationIssueKind {
    /// Whether the run must abort.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::NonContiguousSequence | Self::DueBeforeEntry)
    }
}

impl ValidationIssue {
    fn new(
        kind: ValidationIssueKind,
        entity_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            entity_id: entity_id.into(),
            message: message.into(),
        }
    }

    /// Whether the run must abort.
    pub fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }
}

impl From<ValidationIssue> for ScheduleError {
    fn from(issue: ValidationIssue) -> Self {
        match issue.kind {
            ValidationIssueKind::DuplicateSequence { sequence } => Self::DuplicateOperation {
                order_id: issue.entity_id,
                sequence,
            },
            ValidationIssueKind::NoEligibleMachine => Self::NoEligibleMachine(issue.entity_id),
            ValidationIssueKind::UnknownMachine { machine_id } => Self::UnknownMachine {
                operation_id: issue.entity_id,
                machine_id,
            },
            ValidationIssueKind::EmptyMachinePool => Self::EmptyMachinePool,
            ValidationIssueKind::NonContiguousSequence | ValidationIssueKind::DueBeforeEntry => {
                Self::InvalidConfig(issue.message)
            }
        }
    }
}

/// Validates orders against the pool.
///
/// Returns every finding; callers abort on the first fatal one and log
/// the rest.
pub fn validate_orders(orders: &[Order], pool: &MachinePool) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if pool.is_empty() && orders.iter().any(|o| !o.operations.is_empty()) {
        issues.push(ValidationIssue::new(
            ValidationIssueKind::EmptyMachinePool,
            "",
            "No machine is named by any operation",
        ));
    }

    for order in orders {
        if order.due < order.entry {
            issues.push(ValidationIssue::new(
                ValidationIssueKind::DueBeforeEntry,
                &order.id,
                format!(
                    "Order '{}' is due {} before it arrives {}",
                    order.id, order.due, order.entry
                ),
            ));
        }

        let mut seen = HashSet::new();
        for op in &order.operations {
            if !seen.insert(op.sequence) {
                issues.push(ValidationIssue::new(
                    ValidationIssueKind::DuplicateSequence {
                        sequence: op.sequence,
                    },
                    &order.id,
                    format!("Order '{}' lists operation {} twice", order.id, op.sequence),
                ));
            }
        }

        let contiguous = order
            .operations
            .iter()
            .enumerate()
            .all(|(i, op)| op.sequence as usize == i + 1);
        if !contiguous && seen.len() == order.operations.len() {
            issues.push(ValidationIssue::new(
                ValidationIssueKind::NonContiguousSequence,
                &order.id,
                format!("Order '{}' operation numbers do not run 1..n", order.id),
            ));
        }

        for op in &order.operations {
            if op.machines.is_empty() {
                if !pool.is_empty() {
                    issues.push(ValidationIssue::new(
                        ValidationIssueKind::NoEligibleMachine,
                        &op.id,
                        format!("Operation '{}' has no eligible machine", op.id),
                    ));
                }
                continue;
            }
            for machine_id in &op.machines {
                if !pool.contains(machine_id) {
                    issues.push(ValidationIssue::new(
                        ValidationIssueKind::UnknownMachine {
                            machine_id: machine_id.clone(),
                        },
                        &op.id,
                        format!(
                            "Operation '{}' references unknown machine '{}'",
                            op.id, machine_id
                        ),
                    ));
                }
            }
        }
    }

    issues
}
