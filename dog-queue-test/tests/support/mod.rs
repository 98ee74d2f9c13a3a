#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde_json::Value;

use dog_queue_test::prelude::*;

/// Queue declared on the instance, with every hook counted
#[derive(Default)]
pub struct Person {
    pub before_enqueues: AtomicUsize,
    pub enqueues: AtomicUsize,
    pub performs: AtomicUsize,
    pub reject_enqueue: AtomicBool,
}

impl Person {
    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

impl Job for Person {
    fn job_type(&self) -> &str {
        "Person"
    }

    fn declared_queue(&self) -> Option<QueueName> {
        Some("people".into())
    }

    fn perform(&self, _args: &[Value]) -> Result<(), JobError> {
        self.performs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn enqueue_hooks(&self) -> Option<&dyn EnqueueHooks> {
        Some(self)
    }
}

impl EnqueueHooks for Person {
    fn before_enqueue(&self, _args: &[Value]) -> bool {
        self.before_enqueues.fetch_add(1, Ordering::SeqCst);
        !self.reject_enqueue.load(Ordering::SeqCst)
    }

    fn after_enqueue(&self, _args: &[Value]) {
        self.enqueues.fetch_add(1, Ordering::SeqCst);
    }
}

/// Queue exposed through the accessor only
pub struct Account;

impl Job for Account {
    fn job_type(&self) -> &str {
        "Account"
    }

    fn queue(&self) -> Option<QueueName> {
        Some("people".into())
    }

    fn perform(&self, _args: &[Value]) -> Result<(), JobError> {
        Ok(())
    }
}

/// Declares both ways; the declared queue wins
pub struct Profile;

impl Job for Profile {
    fn job_type(&self) -> &str {
        "Profile"
    }

    fn declared_queue(&self) -> Option<QueueName> {
        Some("profiles".into())
    }

    fn queue(&self) -> Option<QueueName> {
        Some("ignored".into())
    }

    fn perform(&self, _args: &[Value]) -> Result<(), JobError> {
        Ok(())
    }
}

/// No queue at all
pub struct Address;

impl Job for Address {
    fn job_type(&self) -> &str {
        "Address"
    }

    fn perform(&self, _args: &[Value]) -> Result<(), JobError> {
        Ok(())
    }
}

/// Always fails and remembers the failures it was told about
#[derive(Default)]
pub struct Place {
    pub attempts: AtomicUsize,
    pub failures: Mutex<Vec<(String, Vec<Value>)>>,
}

impl Job for Place {
    fn job_type(&self) -> &str {
        "Place"
    }

    fn queue(&self) -> Option<QueueName> {
        Some("places".into())
    }

    fn perform(&self, _args: &[Value]) -> Result<(), JobError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(JobError::failed("OMG!"))
    }

    fn failure_hooks(&self) -> Option<&dyn FailureHooks> {
        Some(self)
    }
}

impl FailureHooks for Place {
    fn on_failure(&self, error: &JobError, args: &[Value]) {
        self.failures.lock().push((error.message(), args.to_vec()));
    }
}

/// Logs every hook and the body in call order
#[derive(Default)]
pub struct HookOrder {
    pub calls: Mutex<Vec<&'static str>>,
}

impl Job for HookOrder {
    fn job_type(&self) -> &str {
        "HookOrder"
    }

    fn queue(&self) -> Option<QueueName> {
        Some("hook_order".into())
    }

    fn perform(&self, _args: &[Value]) -> Result<(), JobError> {
        let mut calls = self.calls.lock();
        if !calls.contains(&"after_enqueue") {
            return Err(JobError::failed("performed before after_enqueue"));
        }
        calls.push("perform");
        Ok(())
    }

    fn enqueue_hooks(&self) -> Option<&dyn EnqueueHooks> {
        Some(self)
    }

    fn perform_hooks(&self) -> Option<&dyn PerformHooks> {
        Some(self)
    }
}

impl EnqueueHooks for HookOrder {
    fn before_enqueue(&self, _args: &[Value]) -> bool {
        self.calls.lock().push("before_enqueue");
        true
    }

    fn after_enqueue(&self, _args: &[Value]) {
        self.calls.lock().push("after_enqueue");
    }
}

impl PerformHooks for HookOrder {
    fn before_perform(&self, _args: &[Value]) -> Result<(), JobError> {
        self.calls.lock().push("before_perform");
        Ok(())
    }

    fn around_perform(
        &self,
        _args: &[Value],
        perform: &mut dyn FnMut() -> Result<(), JobError>,
    ) -> Result<(), JobError> {
        self.calls.lock().push("around_perform");
        perform()
    }

    fn after_perform(&self, _args: &[Value]) -> Result<(), JobError> {
        self.calls.lock().push("after_perform");
        Ok(())
    }
}

/// Counts performs; the `Job` of the inline scenario
#[derive(Default)]
pub struct Counter {
    pub invocations: AtomicUsize,
}

impl Job for Counter {
    fn job_type(&self) -> &str {
        "Job"
    }

    fn queue(&self) -> Option<QueueName> {
        Some("job".into())
    }

    fn perform(&self, _args: &[Value]) -> Result<(), JobError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Enqueues a `Counter` from inside its own perform
pub struct FanOut {
    pub queue: Weak<TestQueue>,
    pub counter: Arc<Counter>,
}

impl Job for FanOut {
    fn job_type(&self) -> &str {
        "FanOut"
    }

    fn queue(&self) -> Option<QueueName> {
        Some("job".into())
    }

    fn perform(&self, args: &[Value]) -> Result<(), JobError> {
        let queue = self
            .queue
            .upgrade()
            .ok_or_else(|| JobError::failed("queue dropped"))?;
        queue
            .enqueue(&self.counter, args.to_vec())
            .map_err(|err| JobError::failed(err.to_string()))?;
        Ok(())
    }
}
