pub mod job;

pub use job::{perform, PerformOutcome, ReservedJob};
