pub mod memory;

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use crate::{JobRef, PerformOutcome, QueueError, QueueName, QueueResult, ReservedJob};

/// What an enqueue call did
#[derive(Debug, Clone, PartialEq)]
pub enum EnqueueOutcome {
    /// A record was appended to the queue
    Stored,
    /// The job ran synchronously (inline mode). A failed or skipped job
    /// still counts as enqueued; the outcome says how the run went.
    Performed(PerformOutcome),
    /// A before_enqueue hook returned false
    Aborted,
}

impl EnqueueOutcome {
    /// False only when a hook aborted the enqueue
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Aborted)
    }
}

/// The queue library surface that tests intercept.
///
/// `TestQueue` implements it in memory; a real broker client implements it
/// too, and `QueueAdapter` chooses between them.
pub trait QueueBackend: Send + Sync {
    /// Enqueue onto the job's own queue
    fn enqueue(&self, job: &JobRef, args: Vec<Value>) -> QueueResult<EnqueueOutcome>;

    /// Enqueue onto an explicit queue, running enqueue hooks
    fn enqueue_to(&self, queue: &QueueName, job: &JobRef, args: Vec<Value>) -> QueueResult<EnqueueOutcome>;

    /// Store a job without enqueue hooks
    fn create(&self, queue: &QueueName, job: &JobRef, args: Vec<Value>) -> QueueResult<EnqueueOutcome>;

    /// Remove jobs of a class (and args, when given) from a queue
    fn destroy(&self, queue: &QueueName, job: &JobRef, args: Vec<Value>) -> QueueResult<usize>;

    /// Remove jobs from the job's own queue
    fn dequeue(&self, job: &JobRef, args: Vec<Value>) -> QueueResult<usize>;

    /// Take the next job off a queue
    fn reserve(&self, queue: &QueueName) -> QueueResult<Option<ReservedJob>>;

    /// String-keyed payloads of `count` jobs starting at `start`
    fn peek(&self, queue: &QueueName, start: usize, count: usize) -> QueueResult<Vec<Value>>;

    fn size(&self, queue: &QueueName) -> QueueResult<usize>;

    fn enqueue_at(&self, time: DateTime<Utc>, job: &JobRef, args: Vec<Value>) -> QueueResult<EnqueueOutcome>;

    fn enqueue_at_with_queue(
        &self,
        queue: &QueueName,
        time: DateTime<Utc>,
        job: &JobRef,
        args: Vec<Value>,
    ) -> QueueResult<EnqueueOutcome>;

    fn enqueue_in(&self, interval: Duration, job: &JobRef, args: Vec<Value>) -> QueueResult<EnqueueOutcome>;

    fn enqueue_in_with_queue(
        &self,
        queue: &QueueName,
        interval: Duration,
        job: &JobRef,
        args: Vec<Value>,
    ) -> QueueResult<EnqueueOutcome>;

    /// Remove delayed jobs matching class and args exactly
    fn remove_delayed(&self, job: &JobRef, args: Vec<Value>) -> QueueResult<usize>;
}

/// Real backend used when none is configured: every call fails, since this
/// crate never talks to a broker.
#[derive(Debug, Clone, Default)]
pub struct UnavailableBackend;

impl UnavailableBackend {
    fn unavailable<T>(operation: &str) -> QueueResult<T> {
        Err(QueueError::BackendUnavailable(format!(
            "no real queue backend configured for {}",
            operation
        )))
    }
}

impl QueueBackend for UnavailableBackend {
    fn enqueue(&self, _job: &JobRef, _args: Vec<Value>) -> QueueResult<EnqueueOutcome> {
        Self::unavailable("enqueue")
    }

    fn enqueue_to(&self, _queue: &QueueName, _job: &JobRef, _args: Vec<Value>) -> QueueResult<EnqueueOutcome> {
        Self::unavailable("enqueue_to")
    }

    fn create(&self, _queue: &QueueName, _job: &JobRef, _args: Vec<Value>) -> QueueResult<EnqueueOutcome> {
        Self::unavailable("create")
    }

    fn destroy(&self, _queue: &QueueName, _job: &JobRef, _args: Vec<Value>) -> QueueResult<usize> {
        Self::unavailable("destroy")
    }

    fn dequeue(&self, _job: &JobRef, _args: Vec<Value>) -> QueueResult<usize> {
        Self::unavailable("dequeue")
    }

    fn reserve(&self, _queue: &QueueName) -> QueueResult<Option<ReservedJob>> {
        Self::unavailable("reserve")
    }

    fn peek(&self, _queue: &QueueName, _start: usize, _count: usize) -> QueueResult<Vec<Value>> {
        Self::unavailable("peek")
    }

    fn size(&self, _queue: &QueueName) -> QueueResult<usize> {
        Self::unavailable("size")
    }

    fn enqueue_at(&self, _time: DateTime<Utc>, _job: &JobRef, _args: Vec<Value>) -> QueueResult<EnqueueOutcome> {
        Self::unavailable("enqueue_at")
    }

    fn enqueue_at_with_queue(
        &self,
        _queue: &QueueName,
        _time: DateTime<Utc>,
        _job: &JobRef,
        _args: Vec<Value>,
    ) -> QueueResult<EnqueueOutcome> {
        Self::unavailable("enqueue_at_with_queue")
    }

    fn enqueue_in(&self, _interval: Duration, _job: &JobRef, _args: Vec<Value>) -> QueueResult<EnqueueOutcome> {
        Self::unavailable("enqueue_in")
    }

    fn enqueue_in_with_queue(
        &self,
        _queue: &QueueName,
        _interval: Duration,
        _job: &JobRef,
        _args: Vec<Value>,
    ) -> QueueResult<EnqueueOutcome> {
        Self::unavailable("enqueue_in_with_queue")
    }

    fn remove_delayed(&self, _job: &JobRef, _args: Vec<Value>) -> QueueResult<usize> {
        Self::unavailable("remove_delayed")
    }
}
