//! Error types for the scheduling engine.
//!
//! Every failure is fatal for the run that raised it. [`ErrorKind`]
//! tells the caller whether it was a configuration problem, bad input
//! data, or an instance that cannot be placed on the machine pool.

/// Broad failure classes reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown policy, invalid parameter, missing identifier column.
    Configuration,
    /// Records that cannot be turned into a consistent order model.
    Input,
    /// An operation cannot be placed on any machine.
    Infeasibility,
}

/// Scheduling engine error.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("unknown scheduling policy '{0}' (expected edd, greedy or batch)")]
    UnknownPolicy(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("record #{row} has no order identifier")]
    MissingOrderId { row: usize },

    #[error("order '{order_id}' has no {field} timestamp")]
    MissingTimestamp {
        order_id: String,
        field: &'static str,
    },

    #[error("order '{order_id}': cannot parse {field} timestamp '{value}'")]
    InvalidTimestamp {
        order_id: String,
        field: &'static str,
        value: String,
    },

    #[error("order '{order_id}' lists operation {sequence} more than once")]
    DuplicateOperation { order_id: String, sequence: u32 },

    #[error("machine pool is empty, nothing can be scheduled")]
    EmptyMachinePool,

    #[error("operation '{0}' has no eligible machine")]
    NoEligibleMachine(String),

    #[error("operation '{operation_id}' references unregistered machine '{machine_id}'")]
    UnknownMachine {
        operation_id: String,
        machine_id: String,
    },

    #[error("operation '{operation_id}': offset {hours} h is outside the calendar")]
    TimestampOutOfRange { operation_id: String, hours: f64 },

    #[error("failed to serialize run payload: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ScheduleError {
    /// Failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownPolicy(_) | Self::InvalidConfig(_) | Self::MissingOrderId { .. } => {
                ErrorKind::Configuration
            }
            Self::MissingTimestamp { .. }
            | Self::InvalidTimestamp { .. }
            | Self::DuplicateOperation { .. }
            | Self::TimestampOutOfRange { .. }
            | Self::Serialization(_) => ErrorKind::Input,
            Self::EmptyMachinePool | Self::NoEligibleMachine(_) | Self::UnknownMachine { .. } => {
                ErrorKind::Infeasibility
            }
        }
    }
}

/// Crate result alias.
pub type Result<T> = std::result::Result<T, ScheduleError>;
