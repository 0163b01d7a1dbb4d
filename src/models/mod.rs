//! Scheduling domain models.
//!
//! Provides the data types for the production scheduling problem and its
//! solution.
//!
//! # Domain Mappings
//!
//! | Type | Shop floor | Mutable during a run |
//! |------|-----------|----------------------|
//! | Order | Customer job | no |
//! | Operation | Processing step | no |
//! | Machine / MachinePool | Work centres | yes |
//! | ChangeoverMatrix | Product switch times | no |
//! | Schedule / ScheduleEntry | Production plan | append-only |

mod changeover;
mod machine;
mod order;
mod schedule;

pub use changeover::ChangeoverMatrix;
pub use machine::{Machine, MachinePool};
pub use order::{Operation, Order};
pub use schedule::{Schedule, ScheduleEntry};
