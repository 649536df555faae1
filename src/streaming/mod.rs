//! Chunk proximity tracking, background mesh builds and residency limits

pub mod proximity;
pub mod scheduler;
pub mod budget;

pub use proximity::ProximityIndex;
pub use scheduler::{BuildKind, BuildOutcome, UpdateScheduler};
pub use budget::ResidencyBudget;
