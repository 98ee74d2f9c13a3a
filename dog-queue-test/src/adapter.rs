use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use tracing::trace;

use crate::{
    backend::{EnqueueOutcome, QueueBackend, UnavailableBackend},
    JobRef, QueueName, QueueResult, ReservedJob, TestQueue,
};

/// The queue surface handed to code under test.
///
/// Every call goes to the in-memory [`TestQueue`] unless its
/// `disable_ext` flag is set, in which case it reaches the real backend.
/// The flag is read per call, so `with_extension_disabled` scopes apply to
/// an adapter that is already shared.
#[derive(Clone)]
pub struct QueueAdapter {
    test_queue: Arc<TestQueue>,
    real: Arc<dyn QueueBackend>,
}

impl QueueAdapter {
    /// Adapter whose real backend refuses every call
    pub fn new(test_queue: Arc<TestQueue>) -> Self {
        Self::with_backend(test_queue, Arc::new(UnavailableBackend))
    }

    pub fn with_backend(test_queue: Arc<TestQueue>, real: Arc<dyn QueueBackend>) -> Self {
        Self { test_queue, real }
    }

    /// Adapter over the process-wide queue double
    pub fn global() -> Self {
        Self::new(TestQueue::global())
    }

    pub fn test_queue(&self) -> &Arc<TestQueue> {
        &self.test_queue
    }

    pub fn real_backend(&self) -> &Arc<dyn QueueBackend> {
        &self.real
    }

    /// Backend the next call will reach
    pub fn active(&self) -> &dyn QueueBackend {
        if self.test_queue.extension_disabled() {
            trace!("queue interception disabled, calling real backend");
            self.real.as_ref()
        } else {
            self.test_queue.as_ref()
        }
    }
}

impl QueueBackend for QueueAdapter {
    fn enqueue(&self, job: &JobRef, args: Vec<Value>) -> QueueResult<EnqueueOutcome> {
        self.active().enqueue(job, args)
    }

    fn enqueue_to(&self, queue: &QueueName, job: &JobRef, args: Vec<Value>) -> QueueResult<EnqueueOutcome> {
        self.active().enqueue_to(queue, job, args)
    }

    fn create(&self, queue: &QueueName, job: &JobRef, args: Vec<Value>) -> QueueResult<EnqueueOutcome> {
        self.active().create(queue, job, args)
    }

    fn destroy(&self, queue: &QueueName, job: &JobRef, args: Vec<Value>) -> QueueResult<usize> {
        self.active().destroy(queue, job, args)
    }

    fn dequeue(&self, job: &JobRef, args: Vec<Value>) -> QueueResult<usize> {
        self.active().dequeue(job, args)
    }

    fn reserve(&self, queue: &QueueName) -> QueueResult<Option<ReservedJob>> {
        self.active().reserve(queue)
    }

    fn peek(&self, queue: &QueueName, start: usize, count: usize) -> QueueResult<Vec<Value>> {
        self.active().peek(queue, start, count)
    }

    fn size(&self, queue: &QueueName) -> QueueResult<usize> {
        self.active().size(queue)
    }

    fn enqueue_at(&self, time: DateTime<Utc>, job: &JobRef, args: Vec<Value>) -> QueueResult<EnqueueOutcome> {
        self.active().enqueue_at(time, job, args)
    }

    fn enqueue_at_with_queue(
        &self,
        queue: &QueueName,
        time: DateTime<Utc>,
        job: &JobRef,
        args: Vec<Value>,
    ) -> QueueResult<EnqueueOutcome> {
        self.active().enqueue_at_with_queue(queue, time, job, args)
    }

    fn enqueue_in(&self, interval: Duration, job: &JobRef, args: Vec<Value>) -> QueueResult<EnqueueOutcome> {
        self.active().enqueue_in(interval, job, args)
    }

    fn enqueue_in_with_queue(
        &self,
        queue: &QueueName,
        interval: Duration,
        job: &JobRef,
        args: Vec<Value>,
    ) -> QueueResult<EnqueueOutcome> {
        self.active().enqueue_in_with_queue(queue, interval, job, args)
    }

    fn remove_delayed(&self, job: &JobRef, args: Vec<Value>) -> QueueResult<usize> {
        self.active().remove_delayed(job, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QueueError;
    use parking_lot::Mutex;
    use serde_json::json;

    /// Stands in for a broker client and remembers what reached it
    #[derive(Default)]
    struct RecordingBackend {
        calls: Mutex<Vec<String>>,
    }

    impl RecordingBackend {
        fn record(&self, call: impl Into<String>) {
            self.calls.lock().push(call.into());
        }
    }

    impl QueueBackend for RecordingBackend {
        fn enqueue(&self, job: &JobRef, _args: Vec<Value>) -> QueueResult<EnqueueOutcome> {
            self.record(format!("enqueue {}", job));
            Ok(EnqueueOutcome::Stored)
        }

        fn enqueue_to(&self, queue: &QueueName, job: &JobRef, _args: Vec<Value>) -> QueueResult<EnqueueOutcome> {
            self.record(format!("enqueue_to {} {}", queue, job));
            Ok(EnqueueOutcome::Stored)
        }

        fn create(&self, queue: &QueueName, job: &JobRef, _args: Vec<Value>) -> QueueResult<EnqueueOutcome> {
            self.record(format!("create {} {}", queue, job));
            Ok(EnqueueOutcome::Stored)
        }

        fn destroy(&self, queue: &QueueName, job: &JobRef, _args: Vec<Value>) -> QueueResult<usize> {
            self.record(format!("destroy {} {}", queue, job));
            Ok(0)
        }

        fn dequeue(&self, job: &JobRef, _args: Vec<Value>) -> QueueResult<usize> {
            self.record(format!("dequeue {}", job));
            Ok(0)
        }

        fn reserve(&self, queue: &QueueName) -> QueueResult<Option<ReservedJob>> {
            self.record(format!("reserve {}", queue));
            Ok(None)
        }

        fn peek(&self, queue: &QueueName, _start: usize, _count: usize) -> QueueResult<Vec<Value>> {
            self.record(format!("peek {}", queue));
            Ok(Vec::new())
        }

        fn size(&self, queue: &QueueName) -> QueueResult<usize> {
            self.record(format!("size {}", queue));
            Ok(42)
        }

        fn enqueue_at(&self, _time: DateTime<Utc>, job: &JobRef, _args: Vec<Value>) -> QueueResult<EnqueueOutcome> {
            self.record(format!("enqueue_at {}", job));
            Ok(EnqueueOutcome::Stored)
        }

        fn enqueue_at_with_queue(
            &self,
            queue: &QueueName,
            _time: DateTime<Utc>,
            job: &JobRef,
            _args: Vec<Value>,
        ) -> QueueResult<EnqueueOutcome> {
            self.record(format!("enqueue_at_with_queue {} {}", queue, job));
            Ok(EnqueueOutcome::Stored)
        }

        fn enqueue_in(&self, _interval: Duration, job: &JobRef, _args: Vec<Value>) -> QueueResult<EnqueueOutcome> {
            self.record(format!("enqueue_in {}", job));
            Ok(EnqueueOutcome::Stored)
        }

        fn enqueue_in_with_queue(
            &self,
            queue: &QueueName,
            _interval: Duration,
            job: &JobRef,
            _args: Vec<Value>,
        ) -> QueueResult<EnqueueOutcome> {
            self.record(format!("enqueue_in_with_queue {} {}", queue, job));
            Ok(EnqueueOutcome::Stored)
        }

        fn remove_delayed(&self, job: &JobRef, _args: Vec<Value>) -> QueueResult<usize> {
            self.record(format!("remove_delayed {}", job));
            Ok(0)
        }
    }

    fn adapter() -> (QueueAdapter, Arc<TestQueue>, Arc<RecordingBackend>) {
        let test_queue = Arc::new(TestQueue::new());
        let real = Arc::new(RecordingBackend::default());
        let adapter = QueueAdapter::with_backend(test_queue.clone(), real.clone());
        (adapter, test_queue, real)
    }

    #[test]
    fn test_calls_are_intercepted_by_default() {
        let (adapter, test_queue, real) = adapter();
        let people = QueueName::from("people");

        adapter.create(&people, &"Person".into(), vec![json!(1)]).unwrap();

        assert_eq!(test_queue.size("people"), 1);
        assert_eq!(adapter.size(&people).unwrap(), 1);
        assert!(real.calls.lock().is_empty());
    }

    #[test]
    fn test_disabled_extension_reaches_real_backend() {
        let (adapter, test_queue, real) = adapter();
        let people = QueueName::from("people");
        let person = JobRef::from("Person");

        let size = test_queue.with_extension_disabled(|| {
            adapter.create(&people, &person, vec![]).unwrap();
            adapter.enqueue_in(Duration::seconds(5), &person, vec![]).unwrap();
            adapter.size(&people).unwrap()
        });

        assert_eq!(size, 42);
        assert_eq!(test_queue.size("people"), 0);
        assert_eq!(
            *real.calls.lock(),
            vec!["create people Person", "enqueue_in Person", "size people"]
        );

        adapter.create(&people, &person, vec![]).unwrap();
        assert_eq!(test_queue.size("people"), 1);
    }

    #[test]
    fn test_default_real_backend_is_unavailable() {
        let test_queue = Arc::new(TestQueue::new());
        let adapter = QueueAdapter::new(test_queue.clone());

        let _scope = test_queue.extension_scope(true);
        assert!(matches!(
            adapter.size(&QueueName::from("people")),
            Err(QueueError::BackendUnavailable(_))
        ));
    }
}
