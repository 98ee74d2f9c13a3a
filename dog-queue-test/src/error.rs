use thiserror::Error;

/// Result type for queue operations
pub type QueueResult<T> = Result<T, QueueError>;

/// Errors surfaced to the caller of a queue operation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueueError {
    /// No destination queue could be resolved for the job
    #[error("Jobs must be placed onto a queue.")]
    NoQueue,

    /// The job class name was empty
    #[error("Jobs must be given a class.")]
    NoClass,

    #[error("Job type not registered: {0}")]
    JobTypeNotRegistered(String),

    #[error("Job type already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Queue backend unavailable: {0}")]
    BackendUnavailable(String),

    /// A queue matcher did not match
    #[error("{0}")]
    ExpectationFailed(String),

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidConfig { key: String, value: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Outcome of running a job body, routed to failure hooks by the engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JobError {
    /// The job raised an error while performing
    #[error("Job failed: {0}")]
    Failed(String),

    /// A before_perform hook asked to skip the job
    #[error("Job was not performed")]
    DontPerform,

    /// The record names a job type nobody registered
    #[error("Unknown job type: {0}")]
    UnknownJobType(String),
}

impl JobError {
    /// Create a failure with the given message
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }

    /// Check if this error only means the job was skipped
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::DontPerform)
    }

    /// Get the error message
    pub fn message(&self) -> String {
        match self {
            Self::Failed(msg) | Self::UnknownJobType(msg) => msg.clone(),
            Self::DontPerform => "not performed".to_string(),
        }
    }
}

impl From<serde_json::Error> for QueueError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}
