//! Multi-machine production scheduling engine.
//!
//! Takes flat order/operation records, builds an order model with a
//! machine pool, and produces a schedule with one of three dispatching
//! policies. Every operation is placed on a machine with start and finish
//! times, and the run is scored by (weighted) tardiness penalties.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Order`, `Operation`, `Machine`,
//!   `MachinePool`, `ChangeoverMatrix`, `Schedule`, `ScheduleEntry`
//! - **`ingest`**: Record schema and the order model builder
//! - **`validation`**: Input integrity checks (duplicate operations,
//!   machine references, due/entry ordering)
//! - **`dispatching`**: EDD, SPT-greedy, and batch-EDD policies
//! - **`scheduler`**: Run configuration, entry point, report and KPIs,
//!   history hand-off
//! - **`generator`**: Seeded synthetic instances
//!
//! # Policies
//!
//! | Name | Rule | Changeover |
//! |------|------|------------|
//! | `edd` | Orders by due date, operations in sequence | none |
//! | `greedy` | Shortest ready operation first | charged |
//! | `batch` | EDD within arrival-ordered batches | none |
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Jackson (1955), "Scheduling a Production Line to Minimize Maximum Tardiness"
//! - Blazewicz et al. (2019), "Handbook on Scheduling"

pub mod dispatching;
pub mod error;
pub mod generator;
pub mod ingest;
pub mod models;
pub mod scheduler;
pub mod validation;

pub use dispatching::{DispatchPolicy, PolicyKind};
pub use error::{ErrorKind, Result, ScheduleError};
pub use ingest::{build_orders, OrderBook, OrderRecord};
pub use scheduler::{run_schedule, ScheduleConfig, ScheduleReport, Scheduler};
