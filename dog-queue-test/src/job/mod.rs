pub mod registry;
pub mod resolver;

pub use registry::JobRegistry;
pub use resolver::QueueResolver;

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::{JobError, QueueName};

/// A job type the queue can record and run.
///
/// `job_type` is the name stored on every record. A job advertises its
/// queue either through `declared_queue` (checked first) or `queue`.
/// Hooks are optional capabilities: return `Some(self)` from the matching
/// accessor to opt in.
pub trait Job: Send + Sync + 'static {
    /// Name recorded as the record's class
    fn job_type(&self) -> &str;

    /// Queue declared directly on the job type
    fn declared_queue(&self) -> Option<QueueName> {
        None
    }

    /// Queue computed by the job type
    fn queue(&self) -> Option<QueueName> {
        None
    }

    /// Job body
    fn perform(&self, args: &[Value]) -> Result<(), JobError>;

    fn enqueue_hooks(&self) -> Option<&dyn EnqueueHooks> {
        None
    }

    fn perform_hooks(&self) -> Option<&dyn PerformHooks> {
        None
    }

    fn failure_hooks(&self) -> Option<&dyn FailureHooks> {
        None
    }
}

/// Callbacks around enqueueing
pub trait EnqueueHooks: Send + Sync {
    /// Returning `false` aborts the enqueue
    fn before_enqueue(&self, _args: &[Value]) -> bool {
        true
    }

    fn after_enqueue(&self, _args: &[Value]) {}
}

/// Callbacks around performing
pub trait PerformHooks: Send + Sync {
    /// Return `Err(JobError::DontPerform)` to skip the job
    fn before_perform(&self, _args: &[Value]) -> Result<(), JobError> {
        Ok(())
    }

    /// Wraps the job body; call `perform` to run it
    fn around_perform(
        &self,
        _args: &[Value],
        perform: &mut dyn FnMut() -> Result<(), JobError>,
    ) -> Result<(), JobError> {
        perform()
    }

    fn after_perform(&self, _args: &[Value]) -> Result<(), JobError> {
        Ok(())
    }
}

/// Called when performing fails
pub trait FailureHooks: Send + Sync {
    fn on_failure(&self, error: &JobError, args: &[Value]);
}

/// A job given either as a registered job or by name
#[derive(Clone)]
pub enum JobRef {
    Class(Arc<dyn Job>),
    Name(String),
}

impl JobRef {
    /// String form stored on records
    pub fn name(&self) -> &str {
        match self {
            Self::Class(job) => job.job_type(),
            Self::Name(name) => name,
        }
    }

    pub fn as_job(&self) -> Option<&Arc<dyn Job>> {
        match self {
            Self::Class(job) => Some(job),
            Self::Name(_) => None,
        }
    }
}

impl fmt::Debug for JobRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class(job) => f.debug_tuple("Class").field(&job.job_type()).finish(),
            Self::Name(name) => f.debug_tuple("Name").field(name).finish(),
        }
    }
}

impl fmt::Display for JobRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<&str> for JobRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for JobRef {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<&String> for JobRef {
    fn from(name: &String) -> Self {
        Self::Name(name.clone())
    }
}

impl From<&JobRef> for JobRef {
    fn from(job: &JobRef) -> Self {
        job.clone()
    }
}

impl From<Arc<dyn Job>> for JobRef {
    fn from(job: Arc<dyn Job>) -> Self {
        Self::Class(job)
    }
}

impl From<&Arc<dyn Job>> for JobRef {
    fn from(job: &Arc<dyn Job>) -> Self {
        Self::Class(job.clone())
    }
}

impl<J: Job> From<Arc<J>> for JobRef {
    fn from(job: Arc<J>) -> Self {
        Self::Class(job)
    }
}

impl<J: Job> From<&Arc<J>> for JobRef {
    fn from(job: &Arc<J>) -> Self {
        Self::Class(job.clone())
    }
}
