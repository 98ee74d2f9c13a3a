pub mod json;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{JobRecord, JobRef, QueueError, QueueResult};

pub use json::JsonCodec;

/// Builds canonical records from a job reference and its arguments.
///
/// The class is always stored by name, so records compare by name and
/// never hold on to a job implementation.
pub struct RecordCodec;

impl RecordCodec {
    /// Record for an immediate job
    pub fn encode(job: &JobRef, args: Vec<Value>) -> QueueResult<JobRecord> {
        Ok(JobRecord::new(Self::class_name(job)?, args))
    }

    /// Record for a job due at `time`, created at `stored_at`
    pub fn encode_scheduled(
        job: &JobRef,
        args: Vec<Value>,
        time: DateTime<Utc>,
        stored_at: DateTime<Utc>,
    ) -> QueueResult<JobRecord> {
        Ok(Self::encode(job, args)?
            .with_time(time)
            .with_stored_at(stored_at))
    }

    /// String form of the job, rejecting empty names
    pub fn class_name(job: &JobRef) -> QueueResult<String> {
        let name = job.name();
        if name.is_empty() {
            return Err(QueueError::NoClass);
        }
        Ok(name.to_string())
    }
}
