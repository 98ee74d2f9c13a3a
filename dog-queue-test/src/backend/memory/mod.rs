pub mod storage;

pub use storage::QueueStore;

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use crate::{
    backend::{EnqueueOutcome, QueueBackend},
    codec::JsonCodec,
    JobRef, QueueName, QueueResult, ReservedJob, TestQueue,
};

impl QueueBackend for TestQueue {
    fn enqueue(&self, job: &JobRef, args: Vec<Value>) -> QueueResult<EnqueueOutcome> {
        TestQueue::enqueue(self, job, args)
    }

    fn enqueue_to(&self, queue: &QueueName, job: &JobRef, args: Vec<Value>) -> QueueResult<EnqueueOutcome> {
        TestQueue::enqueue_to(self, queue, job, args)
    }

    fn create(&self, queue: &QueueName, job: &JobRef, args: Vec<Value>) -> QueueResult<EnqueueOutcome> {
        TestQueue::create(self, queue, job, args)
    }

    fn destroy(&self, queue: &QueueName, job: &JobRef, args: Vec<Value>) -> QueueResult<usize> {
        TestQueue::destroy(self, queue, job, args)
    }

    fn dequeue(&self, job: &JobRef, args: Vec<Value>) -> QueueResult<usize> {
        TestQueue::dequeue(self, job, args)
    }

    fn reserve(&self, queue: &QueueName) -> QueueResult<Option<ReservedJob>> {
        Ok(self.pop(queue))
    }

    fn peek(&self, queue: &QueueName, start: usize, count: usize) -> QueueResult<Vec<Value>> {
        TestQueue::peek(self, queue, start, count)
            .iter()
            .map(JsonCodec::to_payload)
            .collect()
    }

    fn size(&self, queue: &QueueName) -> QueueResult<usize> {
        Ok(TestQueue::size(self, queue))
    }

    fn enqueue_at(&self, time: DateTime<Utc>, job: &JobRef, args: Vec<Value>) -> QueueResult<EnqueueOutcome> {
        TestQueue::enqueue_at(self, time, job, args)
    }

    fn enqueue_at_with_queue(
        &self,
        queue: &QueueName,
        time: DateTime<Utc>,
        job: &JobRef,
        args: Vec<Value>,
    ) -> QueueResult<EnqueueOutcome> {
        TestQueue::enqueue_at_with_queue(self, queue, time, job, args)
    }

    fn enqueue_in(&self, interval: Duration, job: &JobRef, args: Vec<Value>) -> QueueResult<EnqueueOutcome> {
        TestQueue::enqueue_in(self, interval, job, args)
    }

    fn enqueue_in_with_queue(
        &self,
        queue: &QueueName,
        interval: Duration,
        job: &JobRef,
        args: Vec<Value>,
    ) -> QueueResult<EnqueueOutcome> {
        TestQueue::enqueue_in_with_queue(self, queue, interval, job, args)
    }

    fn remove_delayed(&self, job: &JobRef, args: Vec<Value>) -> QueueResult<usize> {
        TestQueue::remove_delayed(self, job, args)
    }
}
