use std::sync::Arc;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::{
    backend::memory::QueueStore,
    codec::RecordCodec,
    config::{InlineEnqueuePolicy, TestQueueConfig},
    execution::job::perform_contained,
    job::QueueResolver,
    types::{Clock, InterceptionToggle, SystemClock, ToggleScope},
    EnqueueOutcome, Job, JobRecord, JobRef, JobRegistry, PerformOutcome, QueueError, QueueName,
    QueueResult, ReservedJob,
};

static GLOBAL: Lazy<Arc<TestQueue>> = Lazy::new(|| Arc::new(TestQueue::new()));

/// In-memory stand-in for a job queue.
///
/// Records every enqueue per queue so tests can inspect them, or runs jobs
/// on the spot in inline mode. No lock is held while a job or hook runs, so
/// jobs may enqueue other jobs.
pub struct TestQueue {
    store: Mutex<QueueStore>,
    registry: RwLock<JobRegistry>,
    toggle: InterceptionToggle,
    config: TestQueueConfig,
    clock: Arc<dyn Clock>,
}

impl TestQueue {
    /// Create an empty queue double with default configuration
    pub fn new() -> Self {
        Self::with_config(TestQueueConfig::default())
    }

    /// Create an empty queue double with custom configuration
    pub fn with_config(config: TestQueueConfig) -> Self {
        Self {
            store: Mutex::new(QueueStore::new()),
            registry: RwLock::new(JobRegistry::new()),
            toggle: InterceptionToggle::new(),
            config,
            clock: Arc::new(SystemClock),
        }
    }

    /// Use another clock for scheduled records
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Process-wide instance
    pub fn global() -> Arc<TestQueue> {
        GLOBAL.clone()
    }

    pub fn config(&self) -> &TestQueueConfig {
        &self.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn toggle(&self) -> &InterceptionToggle {
        &self.toggle
    }

    pub fn inline(&self) -> bool {
        self.toggle.inline()
    }

    pub fn set_inline(&self, value: bool) {
        self.toggle.set_inline(value);
    }

    pub fn extension_disabled(&self) -> bool {
        self.toggle.extension_disabled()
    }

    pub fn set_extension_disabled(&self, value: bool) {
        self.toggle.set_extension_disabled(value);
    }

    /// Run `f` with jobs performed on enqueue
    pub fn with_inline<T>(&self, f: impl FnOnce() -> T) -> T {
        self.toggle.with_inline(f)
    }

    /// Run `f` with calls going to the real backend
    pub fn with_extension_disabled<T>(&self, f: impl FnOnce() -> T) -> T {
        self.toggle.with_extension_disabled(f)
    }

    pub fn inline_scope(&self, value: bool) -> ToggleScope<'_> {
        self.toggle.inline_scope(value)
    }

    pub fn extension_scope(&self, value: bool) -> ToggleScope<'_> {
        self.toggle.extension_scope(value)
    }

    /// Register a job type so it can be found by name
    pub fn register_job<J: Job>(&self, job: Arc<J>) -> QueueResult<()> {
        self.register(job)
    }

    pub fn register(&self, job: Arc<dyn Job>) -> QueueResult<()> {
        let job_type = job.job_type().to_string();
        self.registry.write().register(job)?;
        info!("Registered job type: {}", job_type);
        Ok(())
    }

    /// Registered implementation of a job type
    pub fn job(&self, job_type: &str) -> QueueResult<Arc<dyn Job>> {
        self.registry
            .read()
            .get(job_type)
            .ok_or_else(|| QueueError::JobTypeNotRegistered(job_type.to_string()))
    }

    pub fn registered_types(&self) -> Vec<String> {
        self.registry.read().registered_types()
    }

    /// Queue a job belongs to
    pub fn queue_name(&self, job: impl Into<JobRef>) -> QueueResult<QueueName> {
        let job = job.into();
        let registry = self.registry.read();
        QueueResolver::new(&registry).resolve(&job)
    }

    /// Snapshot of a queue; reading a queue creates it
    pub fn queue_by_name(&self, queue: impl Into<QueueName>) -> Vec<JobRecord> {
        self.store.lock().get(&queue.into())
    }

    /// Snapshot of the queue a job belongs to
    pub fn queue_for(&self, job: impl Into<JobRef>) -> QueueResult<Vec<JobRecord>> {
        let queue = self.queue_name(job)?;
        Ok(self.queue_by_name(queue))
    }

    pub fn queue_names(&self) -> Vec<QueueName> {
        self.store.lock().names()
    }

    /// Append a record directly, bypassing hooks and inline mode
    pub fn push_record(&self, queue: impl Into<QueueName>, record: JobRecord) {
        self.store.lock().push(&queue.into(), record);
    }

    /// True when no queue holds a record
    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }

    /// Enqueue onto the job's own queue
    pub fn enqueue(&self, job: impl Into<JobRef>, args: Vec<Value>) -> QueueResult<EnqueueOutcome> {
        let job = job.into();
        let queue = self.queue_name(&job)?;
        self.enqueue_to(queue, job, args)
    }

    /// Enqueue onto an explicit queue.
    ///
    /// before_enqueue hooks run first and any `false` aborts. Inline, the
    /// after_enqueue hooks run before the job is performed; otherwise they
    /// run once the record is stored.
    pub fn enqueue_to(
        &self,
        queue: impl Into<QueueName>,
        job: impl Into<JobRef>,
        args: Vec<Value>,
    ) -> QueueResult<EnqueueOutcome> {
        let (queue, job) = (queue.into(), job.into());
        let job_impl = self.lookup(&job);
        let hooks = job_impl.as_deref().and_then(|job| job.enqueue_hooks());

        if self.inline() {
            let consult = self.config.inline_before_enqueue == InlineEnqueuePolicy::RunBeforeHooks;
            if consult && !run_before_enqueue(hooks, &args) {
                warn!("before_enqueue hook aborted inline {} on {}", job, queue);
                return Ok(EnqueueOutcome::Aborted);
            }
            if let Some(hooks) = hooks {
                hooks.after_enqueue(&args);
            }
            self.create(queue, job, args)
        } else {
            if !run_before_enqueue(hooks, &args) {
                warn!("before_enqueue hook aborted {} on {}", job, queue);
                return Ok(EnqueueOutcome::Aborted);
            }
            let outcome = self.create(queue, job, args.clone())?;
            if let Some(hooks) = hooks {
                hooks.after_enqueue(&args);
            }
            Ok(outcome)
        }
    }

    /// Store a job, or perform it inline, without enqueue hooks
    pub fn create(
        &self,
        queue: impl Into<QueueName>,
        job: impl Into<JobRef>,
        args: Vec<Value>,
    ) -> QueueResult<EnqueueOutcome> {
        let (queue, job) = (queue.into(), job.into());
        if queue.is_empty() {
            return Err(QueueError::NoQueue);
        }
        let record = RecordCodec::encode(&job, args)?;
        Ok(self.store_record(&queue, &job, record))
    }

    /// Remove jobs from a queue after validating queue and class
    pub fn destroy(
        &self,
        queue: impl Into<QueueName>,
        job: impl Into<JobRef>,
        args: Vec<Value>,
    ) -> QueueResult<usize> {
        let (queue, job) = (queue.into(), job.into());
        if queue.is_empty() {
            return Err(QueueError::NoQueue);
        }
        RecordCodec::class_name(&job)?;
        Ok(self.dequeue_from(queue, job, args))
    }

    /// Remove jobs from the job's own queue
    pub fn dequeue(&self, job: impl Into<JobRef>, args: Vec<Value>) -> QueueResult<usize> {
        let job = job.into();
        let queue = self.queue_name(&job)?;
        self.destroy(queue, job, args)
    }

    /// Remove every record of the job's class, or only exact class+args
    /// matches when `args` is not empty. Returns how many were removed.
    pub fn dequeue_from(&self, queue: impl Into<QueueName>, job: impl Into<JobRef>, args: Vec<Value>) -> usize {
        let (queue, job) = (queue.into(), job.into());
        let class = job.name();

        let removed = if args.is_empty() {
            self.remove_where(&queue, |record| record.is_class(class))
        } else {
            self.remove_where(&queue, |record| record.is_invocation(class, &args))
        };

        debug!("dequeued {} {} job(s) from {}", removed, class, queue);
        removed
    }

    /// Copy of `count` records starting at `start`, without removing them
    pub fn peek(&self, queue: impl Into<QueueName>, start: usize, count: usize) -> Vec<JobRecord> {
        self.store.lock().slice(&queue.into(), start, count)
    }

    /// Take the oldest record off a queue as a runnable job
    pub fn pop(&self, queue: impl Into<QueueName>) -> Option<ReservedJob> {
        let queue = queue.into();
        let record = self.store.lock().shift(&queue)?;
        let job = self.registry.read().get(&record.class);
        Some(ReservedJob::new(queue, record, job))
    }

    /// Perform the oldest job of a queue. Failures are contained.
    pub fn perform_next(&self, queue: impl Into<QueueName>) -> Option<PerformOutcome> {
        let reserved = self.pop(queue)?;
        let job = reserved.job().map(|job| job.as_ref());
        Some(perform_contained(job, reserved.record()))
    }

    /// Perform jobs until the queue is empty, including jobs enqueued while
    /// performing. Returns how many jobs were taken off the queue.
    pub fn perform_all(&self, queue: impl Into<QueueName>) -> usize {
        let queue = queue.into();
        let _span = tracing::debug_span!("perform_all", queue = %queue).entered();

        let mut taken = 0;
        while self.perform_next(queue.clone()).is_some() {
            taken += 1;
        }
        taken
    }

    pub fn size(&self, queue: impl Into<QueueName>) -> usize {
        self.store.lock().len(&queue.into())
    }

    /// Empty every queue, forget jobs remembered from enqueues and switch
    /// interception back to its defaults. Explicit registrations stay.
    #[instrument(skip(self))]
    pub fn reset(&self) {
        self.store.lock().clear();
        self.registry.write().clear();
        self.toggle.reset();
        info!("queue double reset");
    }

    /// Inline: perform now; otherwise append to the queue
    pub(crate) fn store_record(&self, queue: &QueueName, job: &JobRef, record: JobRecord) -> EnqueueOutcome {
        if self.inline() {
            let job_impl = self.lookup(job);
            EnqueueOutcome::Performed(perform_contained(job_impl.as_deref(), &record))
        } else {
            debug!("stored {} on {}", record.class, queue);
            self.store.lock().push(queue, record);
            EnqueueOutcome::Stored
        }
    }

    pub(crate) fn remove_where<F>(&self, queue: &QueueName, predicate: F) -> usize
    where
        F: FnMut(&JobRecord) -> bool,
    {
        self.store.lock().remove_where(queue, predicate)
    }

    /// Job implementation for a reference. A job passed by value is
    /// remembered under its type name, replacing an earlier remembered
    /// instance, so its records can be performed later by name.
    pub(crate) fn lookup(&self, job: &JobRef) -> Option<Arc<dyn Job>> {
        match job {
            JobRef::Class(job) => {
                self.registry.write().ensure(job);
                Some(job.clone())
            }
            JobRef::Name(name) => self.registry.read().get(name),
        }
    }
}

impl Default for TestQueue {
    fn default() -> Self {
        Self::new()
    }
}

fn run_before_enqueue(hooks: Option<&dyn crate::EnqueueHooks>, args: &[Value]) -> bool {
    match hooks {
        Some(hooks) => hooks.before_enqueue(args),
        None => true,
    }
}
