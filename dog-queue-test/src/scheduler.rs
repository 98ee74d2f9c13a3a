//! Delayed jobs.
//!
//! Scheduled records live in a sibling queue named after the job's queue
//! plus the configured suffix (`people` → `people_scheduled`). Nothing ever
//! fires them; their `time` and `stored_at` only matter to assertions.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use tracing::debug;

use crate::{
    codec::RecordCodec, EnqueueOutcome, JobRecord, JobRef, QueueError, QueueName, QueueResult, TestQueue,
};

impl TestQueue {
    /// Name of the queue holding a job's scheduled records
    pub fn schedule_queue_name(&self, job: impl Into<JobRef>) -> QueueResult<QueueName> {
        let queue = self.queue_name(job)?;
        Ok(queue.with_suffix(&self.config().scheduled_suffix))
    }

    /// Snapshot of a job's scheduled records
    pub fn schedule_for(&self, job: impl Into<JobRef>) -> QueueResult<Vec<JobRecord>> {
        let queue = self.schedule_queue_name(job)?;
        Ok(self.queue_by_name(queue))
    }

    /// Schedule a job to run at `time`
    pub fn enqueue_at(
        &self,
        time: DateTime<Utc>,
        job: impl Into<JobRef>,
        args: Vec<Value>,
    ) -> QueueResult<EnqueueOutcome> {
        let job = job.into();
        let queue = self.schedule_queue_name(&job)?;
        self.schedule(queue, time, self.now(), job, args)
    }

    /// Schedule a job to run at `time`, stored in `queue` as given
    pub fn enqueue_at_with_queue(
        &self,
        queue: impl Into<QueueName>,
        time: DateTime<Utc>,
        job: impl Into<JobRef>,
        args: Vec<Value>,
    ) -> QueueResult<EnqueueOutcome> {
        self.schedule(queue.into(), time, self.now(), job.into(), args)
    }

    /// Schedule a job to run `interval` from now
    pub fn enqueue_in(
        &self,
        interval: Duration,
        job: impl Into<JobRef>,
        args: Vec<Value>,
    ) -> QueueResult<EnqueueOutcome> {
        let job = job.into();
        let queue = self.schedule_queue_name(&job)?;
        let now = self.now();
        self.schedule(queue, now + interval, now, job, args)
    }

    pub fn enqueue_in_with_queue(
        &self,
        queue: impl Into<QueueName>,
        interval: Duration,
        job: impl Into<JobRef>,
        args: Vec<Value>,
    ) -> QueueResult<EnqueueOutcome> {
        let now = self.now();
        self.schedule(queue.into(), now + interval, now, job.into(), args)
    }

    /// Remove scheduled records matching class and args exactly
    pub fn remove_delayed(&self, job: impl Into<JobRef>, args: Vec<Value>) -> QueueResult<usize> {
        let job = job.into();
        let queue = self.schedule_queue_name(&job)?;
        Ok(self.remove_delayed_with_queue(queue, job, args))
    }

    pub fn remove_delayed_with_queue(
        &self,
        queue: impl Into<QueueName>,
        job: impl Into<JobRef>,
        args: Vec<Value>,
    ) -> usize {
        let (queue, job) = (queue.into(), job.into());
        let class = job.name().to_string();
        let removed = self.remove_where(&queue, |record| record.is_invocation(&class, &args));
        debug!("removed {} delayed {} job(s) from {}", removed, class, queue);
        removed
    }

    fn schedule(
        &self,
        queue: QueueName,
        time: DateTime<Utc>,
        stored_at: DateTime<Utc>,
        job: JobRef,
        args: Vec<Value>,
    ) -> QueueResult<EnqueueOutcome> {
        if queue.is_empty() {
            return Err(QueueError::NoQueue);
        }
        let record = RecordCodec::encode_scheduled(&job, args, time, stored_at)?;
        Ok(self.store_record(&queue, &job, record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{args, Clock, Job, JobError, MockClock};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Reminder {
        sent: AtomicUsize,
    }

    impl Job for Reminder {
        fn job_type(&self) -> &str {
            "Reminder"
        }

        fn queue(&self) -> Option<QueueName> {
            Some("reminders".into())
        }

        fn perform(&self, _args: &[Value]) -> Result<(), JobError> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn setup() -> (TestQueue, MockClock, Arc<Reminder>) {
        let clock = MockClock::new();
        let queue = TestQueue::new().with_clock(clock.clone());
        (queue, clock, Arc::new(Reminder::default()))
    }

    #[test]
    fn test_enqueue_at_stores_in_sibling_queue() {
        let (queue, clock, job) = setup();
        let time = clock.now() + Duration::seconds(600);

        queue.enqueue_at(time, &job, args![1]).unwrap();

        assert_eq!(queue.schedule_queue_name(&job).unwrap(), "reminders_scheduled");
        assert_eq!(queue.size("reminders"), 0);
        assert_eq!(
            queue.schedule_for(&job).unwrap(),
            vec![JobRecord::new("Reminder", args![1])
                .with_time(time)
                .with_stored_at(clock.now())]
        );
    }

    #[test]
    fn test_enqueue_in_is_relative_to_the_clock() {
        let (queue, clock, job) = setup();
        queue.enqueue_in(Duration::seconds(600), &job, args![1]).unwrap();

        let record = &queue.schedule_for(&job).unwrap()[0];
        assert_eq!(record.time, Some(clock.now() + Duration::seconds(600)));
        assert_eq!(record.delay_seconds(), Some(600));
    }

    #[test]
    fn test_with_queue_variants_use_the_queue_as_given() {
        let (queue, _clock, job) = setup();
        queue
            .enqueue_in_with_queue("later", Duration::seconds(5), &job, args![])
            .unwrap();

        assert_eq!(queue.size("later"), 1);
        assert_eq!(queue.size("later_scheduled"), 0);
        assert_eq!(queue.remove_delayed_with_queue("later", &job, args![]), 1);
    }

    #[test]
    fn test_remove_delayed_matches_args_exactly() {
        let (queue, _clock, job) = setup();
        queue.enqueue_in(Duration::seconds(600), &job, args![1]).unwrap();
        queue.enqueue_in(Duration::seconds(600), &job, args![2]).unwrap();

        assert_eq!(queue.remove_delayed(&job, args![1]).unwrap(), 1);
        assert_eq!(queue.remove_delayed(&job, args![1]).unwrap(), 0);
        assert_eq!(queue.schedule_for(&job).unwrap().len(), 1);
    }

    #[test]
    fn test_inline_scheduling_performs_immediately() {
        let (queue, _clock, job) = setup();
        let outcome = queue
            .with_inline(|| queue.enqueue_in(Duration::seconds(600), &job, args![1]))
            .unwrap();

        assert_eq!(outcome, EnqueueOutcome::Performed(crate::PerformOutcome::Performed));
        assert_eq!(job.sent.load(Ordering::SeqCst), 1);
        assert!(queue.schedule_for(&job).unwrap().is_empty());
    }

    #[test]
    fn test_custom_suffix() {
        let clock = MockClock::new();
        let queue = TestQueue::with_config(crate::TestQueueConfig::new().with_scheduled_suffix("_delayed"))
            .with_clock(clock);
        let job = Arc::new(Reminder::default());

        queue.enqueue_in(Duration::seconds(1), &job, args![]).unwrap();
        assert_eq!(queue.size("reminders_delayed"), 1);
    }
}
