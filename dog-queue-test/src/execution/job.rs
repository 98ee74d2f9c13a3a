use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::{codec::JsonCodec, Job, JobError, JobRecord, QueueName, QueueResult};

/// Result of running one job at the engine boundary, where failures are
/// contained instead of propagated
#[derive(Debug, Clone, PartialEq)]
pub enum PerformOutcome {
    Performed,
    /// A before_perform hook skipped the job
    Skipped,
    Failed(JobError),
}

impl PerformOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Run a job through its perform hooks.
///
/// Order: `before_perform`, `around_perform` wrapping `perform`, then
/// `after_perform`. Returns `Ok(false)` when the job was skipped. Any other
/// error is handed to the job's failure hooks and returned.
pub fn perform(job: &dyn Job, args: &[Value]) -> Result<bool, JobError> {
    match run_with_hooks(job, args) {
        Ok(()) => Ok(true),
        Err(err) if err.is_skip() => Ok(false),
        Err(err) => {
            if let Some(hooks) = job.failure_hooks() {
                hooks.on_failure(&err, args);
            }
            Err(err)
        }
    }
}

fn run_with_hooks(job: &dyn Job, args: &[Value]) -> Result<(), JobError> {
    let hooks = job.perform_hooks();

    if let Some(hooks) = hooks {
        hooks.before_perform(args)?;
    }

    match hooks {
        Some(hooks) => hooks.around_perform(args, &mut || job.perform(args))?,
        None => job.perform(args)?,
    }

    if let Some(hooks) = hooks {
        hooks.after_perform(args)?;
    }

    Ok(())
}

/// Contained variant used by inline mode and `perform_next`/`perform_all`
pub(crate) fn perform_contained(job: Option<&dyn Job>, record: &JobRecord) -> PerformOutcome {
    let result = match job {
        Some(job) => perform(job, &record.args),
        None => Err(JobError::UnknownJobType(record.class.clone())),
    };

    match result {
        Ok(true) => PerformOutcome::Performed,
        Ok(false) => {
            tracing::debug!("job {} skipped by before_perform", record.class);
            PerformOutcome::Skipped
        }
        Err(err) => {
            tracing::warn!("job {} failed: {}", record.class, err);
            PerformOutcome::Failed(err)
        }
    }
}

/// A job taken off a queue, ready to run
#[derive(Clone)]
pub struct ReservedJob {
    queue: QueueName,
    record: JobRecord,
    job: Option<Arc<dyn Job>>,
}

impl ReservedJob {
    pub fn new(queue: QueueName, record: JobRecord, job: Option<Arc<dyn Job>>) -> Self {
        Self { queue, record, job }
    }

    /// Queue the job was reserved from
    pub fn queue(&self) -> &QueueName {
        &self.queue
    }

    pub fn record(&self) -> &JobRecord {
        &self.record
    }

    pub fn class(&self) -> &str {
        &self.record.class
    }

    pub fn args(&self) -> &[Value] {
        &self.record.args
    }

    /// Registered implementation of the record's class, if any
    pub fn job(&self) -> Option<&Arc<dyn Job>> {
        self.job.as_ref()
    }

    /// String-keyed payload, as a worker would receive it
    pub fn payload(&self) -> QueueResult<Value> {
        JsonCodec::to_payload(&self.record)
    }

    /// Run the job; failures reach the failure hooks and are returned
    pub fn perform(&self) -> Result<bool, JobError> {
        match &self.job {
            Some(job) => perform(job.as_ref(), &self.record.args),
            None => Err(JobError::UnknownJobType(self.record.class.clone())),
        }
    }
}

impl fmt::Debug for ReservedJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReservedJob")
            .field("queue", &self.queue)
            .field("record", &self.record)
            .field("registered", &self.job.is_some())
            .finish()
    }
}
