//! # Queue assertions
//!
//! Matchers inspect a [`TestQueue`] and answer whether the expected jobs
//! were queued or scheduled. Each one also builds the messages a test
//! framework shows on failure.
//!
//! ```rust
//! use dog_queue_test::{args, pattern, TestQueue};
//! use dog_queue_test::matchers::{any_args, anything, have_queued, have_queue_size_of};
//!
//! let queue = TestQueue::new();
//! queue.create("people", "Person", args!["Les", "Hill"]).unwrap();
//!
//! queue.verify(&have_queued("Person", pattern!["Les", "Hill"]).in_queue("people")).unwrap();
//! queue.verify(&have_queued("Person", pattern!["Les", anything()]).in_queue("people")).unwrap();
//! queue.verify(&have_queued("Person", any_args()).in_queue("people").once()).unwrap();
//! queue.verify(&have_queue_size_of("Person", 1).in_queue("people")).unwrap();
//! ```

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use crate::{JobRecord, JobRef, QueueError, QueueName, QueueResult, TestQueue};

/// One expected positional argument
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Value(Value),
    /// Matches any single value
    Anything,
}

impl Arg {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::Value(expected) => expected == value,
            Self::Anything => true,
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => write!(f, "{}", value),
            Self::Anything => f.write_str("anything"),
        }
    }
}

/// Expected argument list
#[derive(Debug, Clone, PartialEq)]
pub enum ArgsPattern {
    /// Same arity, each position matching
    Exact(Vec<Arg>),
    /// Any list, including an empty one
    Any,
}

impl ArgsPattern {
    pub fn matches(&self, args: &[Value]) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(expected) => {
                expected.len() == args.len()
                    && expected.iter().zip(args).all(|(arg, value)| arg.matches(value))
            }
        }
    }
}

impl fmt::Display for ArgsPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any args"),
            Self::Exact(args) => {
                let parts: Vec<String> = args.iter().map(ToString::to_string).collect();
                f.write_str(&parts.join(", "))
            }
        }
    }
}

impl From<Vec<Arg>> for ArgsPattern {
    fn from(args: Vec<Arg>) -> Self {
        Self::Exact(args)
    }
}

impl From<Vec<Value>> for ArgsPattern {
    fn from(args: Vec<Value>) -> Self {
        Self::Exact(args.into_iter().map(Arg::Value).collect())
    }
}

/// Conversion used by the `pattern!` macro
pub trait IntoArg {
    fn into_arg(self) -> Arg;
}

impl IntoArg for Arg {
    fn into_arg(self) -> Arg {
        self
    }
}

impl IntoArg for Value {
    fn into_arg(self) -> Arg {
        Arg::Value(self)
    }
}

macro_rules! into_arg_via_value {
    ($($ty:ty),*) => {
        $(
            impl IntoArg for $ty {
                fn into_arg(self) -> Arg {
                    Arg::Value(Value::from(self))
                }
            }
        )*
    };
}

into_arg_via_value!(&str, String, i32, i64, u32, u64, f64, bool);

/// Wildcard for one argument
pub fn anything() -> Arg {
    Arg::Anything
}

/// Wildcard for the whole argument list
pub fn any_args() -> ArgsPattern {
    ArgsPattern::Any
}

/// An assertion over the queue double
pub trait QueueMatcher {
    fn matches(&self, queue: &TestQueue) -> QueueResult<bool>;

    fn failure_message(&self, queue: &TestQueue) -> String;

    fn negated_failure_message(&self, queue: &TestQueue) -> String;

    fn description(&self) -> String;
}

impl TestQueue {
    /// `Err(ExpectationFailed)` unless the matcher matches
    pub fn verify(&self, matcher: &dyn QueueMatcher) -> QueueResult<()> {
        if matcher.matches(self)? {
            Ok(())
        } else {
            Err(QueueError::ExpectationFailed(matcher.failure_message(self)))
        }
    }

    /// `Err(ExpectationFailed)` if the matcher matches
    pub fn verify_not(&self, matcher: &dyn QueueMatcher) -> QueueResult<()> {
        if matcher.matches(self)? {
            Err(QueueError::ExpectationFailed(matcher.negated_failure_message(self)))
        } else {
            Ok(())
        }
    }
}

fn times_suffix(times: Option<usize>) -> String {
    match times {
        Some(1) => " once".to_string(),
        Some(n) => format!(" {} times", n),
        None => String::new(),
    }
}

fn count_or_unknown(count: QueueResult<usize>) -> String {
    count.map_or_else(|err| format!("an error ({})", err), |n| n.to_string())
}

/// Matches records of a job whose args fit a pattern
#[derive(Debug, Clone)]
pub struct HaveQueued {
    job: JobRef,
    pattern: ArgsPattern,
    queue: Option<QueueName>,
    times: Option<usize>,
}

pub fn have_queued(job: impl Into<JobRef>, pattern: impl Into<ArgsPattern>) -> HaveQueued {
    HaveQueued {
        job: job.into(),
        pattern: pattern.into(),
        queue: None,
        times: None,
    }
}

/// Alias of [`have_queued`]
pub fn be_queued(job: impl Into<JobRef>, pattern: impl Into<ArgsPattern>) -> HaveQueued {
    have_queued(job, pattern)
}

impl HaveQueued {
    /// Look in `queue` instead of the job's own queue
    pub fn in_queue(mut self, queue: impl Into<QueueName>) -> Self {
        self.queue = Some(queue.into());
        self
    }

    /// Require exactly `n` matching records
    pub fn times(mut self, n: usize) -> Self {
        self.times = Some(n);
        self
    }

    pub fn once(self) -> Self {
        self.times(1)
    }

    fn count(&self, queue: &TestQueue) -> QueueResult<usize> {
        let records = match &self.queue {
            Some(name) => queue.queue_by_name(name),
            None => queue.queue_for(&self.job)?,
        };
        Ok(records
            .iter()
            .filter(|record| record.is_class(self.job.name()) && self.pattern.matches(&record.args))
            .count())
    }
}

impl QueueMatcher for HaveQueued {
    fn matches(&self, queue: &TestQueue) -> QueueResult<bool> {
        let count = self.count(queue)?;
        Ok(match self.times {
            Some(n) => count == n,
            None => count > 0,
        })
    }

    fn failure_message(&self, queue: &TestQueue) -> String {
        format!(
            "expected that {} would have [{}] queued{}, but found {} matching",
            self.job,
            self.pattern,
            times_suffix(self.times),
            count_or_unknown(self.count(queue))
        )
    }

    fn negated_failure_message(&self, _queue: &TestQueue) -> String {
        format!(
            "expected that {} would not have [{}] queued{}",
            self.job,
            self.pattern,
            times_suffix(self.times)
        )
    }

    fn description(&self) -> String {
        format!("have queued arguments of [{}]{}", self.pattern, times_suffix(self.times))
    }
}

/// Matches on the length of a queue
#[derive(Debug, Clone)]
pub struct HaveQueueSize {
    job: JobRef,
    expected: usize,
    at_least: bool,
    queue: Option<QueueName>,
}

pub fn have_queue_size_of(job: impl Into<JobRef>, size: usize) -> HaveQueueSize {
    HaveQueueSize {
        job: job.into(),
        expected: size,
        at_least: false,
        queue: None,
    }
}

pub fn have_queue_size_of_at_least(job: impl Into<JobRef>, size: usize) -> HaveQueueSize {
    HaveQueueSize {
        at_least: true,
        ..have_queue_size_of(job, size)
    }
}

impl HaveQueueSize {
    pub fn in_queue(mut self, queue: impl Into<QueueName>) -> Self {
        self.queue = Some(queue.into());
        self
    }

    fn actual(&self, queue: &TestQueue) -> QueueResult<usize> {
        match &self.queue {
            Some(name) => Ok(queue.size(name)),
            None => Ok(queue.queue_for(&self.job)?.len()),
        }
    }
}

impl QueueMatcher for HaveQueueSize {
    fn matches(&self, queue: &TestQueue) -> QueueResult<bool> {
        let actual = self.actual(queue)?;
        Ok(size_matches(actual, self.expected, self.at_least))
    }

    fn failure_message(&self, queue: &TestQueue) -> String {
        format!(
            "expected that {} would have {}{} entries queued, but got {} instead",
            self.job,
            at_least_prefix(self.at_least),
            self.expected,
            count_or_unknown(self.actual(queue))
        )
    }

    fn negated_failure_message(&self, queue: &TestQueue) -> String {
        format!(
            "expected that {} would not have {}{} entries queued, but got {} instead",
            self.job,
            at_least_prefix(self.at_least),
            self.expected,
            count_or_unknown(self.actual(queue))
        )
    }

    fn description(&self) -> String {
        format!("have a queue size of {}{}", at_least_prefix(self.at_least), self.expected)
    }
}

fn size_matches(actual: usize, expected: usize, at_least: bool) -> bool {
    if at_least {
        actual >= expected
    } else {
        actual == expected
    }
}

fn at_least_prefix(at_least: bool) -> &'static str {
    if at_least {
        "at least "
    } else {
        ""
    }
}

/// Matches scheduled records, optionally by due time
#[derive(Debug, Clone)]
pub struct HaveScheduled {
    job: JobRef,
    pattern: ArgsPattern,
    at: Option<DateTime<Utc>>,
    within: Option<Duration>,
    queue: Option<QueueName>,
    times: Option<usize>,
}

pub fn have_scheduled(job: impl Into<JobRef>, pattern: impl Into<ArgsPattern>) -> HaveScheduled {
    HaveScheduled {
        job: job.into(),
        pattern: pattern.into(),
        at: None,
        within: None,
        queue: None,
        times: None,
    }
}

pub fn have_scheduled_at(
    job: impl Into<JobRef>,
    time: DateTime<Utc>,
    pattern: impl Into<ArgsPattern>,
) -> HaveScheduled {
    have_scheduled(job, pattern).at(time)
}

impl HaveScheduled {
    /// Due at `time`, to the second
    pub fn at(mut self, time: DateTime<Utc>) -> Self {
        self.at = Some(time);
        self
    }

    /// Due `interval` after the record was stored, to the second
    pub fn within(mut self, interval: Duration) -> Self {
        self.within = Some(interval);
        self
    }

    /// Look in `queue` as given instead of the job's scheduled queue
    pub fn queue(mut self, queue: impl Into<QueueName>) -> Self {
        self.queue = Some(queue.into());
        self
    }

    pub fn times(mut self, n: usize) -> Self {
        self.times = Some(n);
        self
    }

    pub fn once(self) -> Self {
        self.times(1)
    }

    fn is_due(&self, record: &JobRecord) -> bool {
        if self.at.is_none() && self.within.is_none() {
            return true;
        }
        let Some(time) = record.time else {
            return false;
        };

        let at = self
            .at
            .is_some_and(|expected| time.timestamp() == expected.timestamp());
        let within = match (self.within, record.stored_at) {
            (Some(interval), Some(stored_at)) => {
                time.timestamp() == stored_at.timestamp() + interval.num_seconds()
            }
            _ => false,
        };
        at || within
    }

    fn count(&self, queue: &TestQueue) -> QueueResult<usize> {
        let records = match &self.queue {
            Some(name) => queue.queue_by_name(name),
            None => queue.schedule_for(&self.job)?,
        };
        Ok(records
            .iter()
            .filter(|record| {
                record.is_class(self.job.name())
                    && self.pattern.matches(&record.args)
                    && self.is_due(record)
            })
            .count())
    }

    fn timing(&self) -> String {
        let mut timing = String::new();
        if let Some(at) = self.at {
            timing.push_str(&format!(" at {}", at.to_rfc3339()));
        }
        if let Some(within) = self.within {
            if self.at.is_some() {
                timing.push_str(" or");
            }
            timing.push_str(&format!(" in {} seconds", within.num_seconds()));
        }
        timing
    }
}

impl QueueMatcher for HaveScheduled {
    fn matches(&self, queue: &TestQueue) -> QueueResult<bool> {
        let count = self.count(queue)?;
        Ok(match self.times {
            Some(n) => count == n,
            None => count > 0,
        })
    }

    fn failure_message(&self, queue: &TestQueue) -> String {
        format!(
            "expected that {} would have [{}] scheduled{}{}, but found {} matching",
            self.job,
            self.pattern,
            self.timing(),
            times_suffix(self.times),
            count_or_unknown(self.count(queue))
        )
    }

    fn negated_failure_message(&self, _queue: &TestQueue) -> String {
        format!(
            "expected that {} would not have [{}] scheduled{}{}",
            self.job,
            self.pattern,
            self.timing(),
            times_suffix(self.times)
        )
    }

    fn description(&self) -> String {
        format!("have scheduled arguments of [{}]{}", self.pattern, self.timing())
    }
}

/// Matches on the length of a scheduled queue
#[derive(Debug, Clone)]
pub struct HaveScheduleSize {
    job: JobRef,
    expected: usize,
    at_least: bool,
    queue: Option<QueueName>,
}

pub fn have_schedule_size_of(job: impl Into<JobRef>, size: usize) -> HaveScheduleSize {
    HaveScheduleSize {
        job: job.into(),
        expected: size,
        at_least: false,
        queue: None,
    }
}

pub fn have_schedule_size_of_at_least(job: impl Into<JobRef>, size: usize) -> HaveScheduleSize {
    HaveScheduleSize {
        at_least: true,
        ..have_schedule_size_of(job, size)
    }
}

impl HaveScheduleSize {
    pub fn queue(mut self, queue: impl Into<QueueName>) -> Self {
        self.queue = Some(queue.into());
        self
    }

    fn actual(&self, queue: &TestQueue) -> QueueResult<usize> {
        match &self.queue {
            Some(name) => Ok(queue.size(name)),
            None => Ok(queue.schedule_for(&self.job)?.len()),
        }
    }
}

impl QueueMatcher for HaveScheduleSize {
    fn matches(&self, queue: &TestQueue) -> QueueResult<bool> {
        let actual = self.actual(queue)?;
        Ok(size_matches(actual, self.expected, self.at_least))
    }

    fn failure_message(&self, queue: &TestQueue) -> String {
        format!(
            "expected that {} would have {}{} scheduled entries, but got {} instead",
            self.job,
            at_least_prefix(self.at_least),
            self.expected,
            count_or_unknown(self.actual(queue))
        )
    }

    fn negated_failure_message(&self, queue: &TestQueue) -> String {
        format!(
            "expected that {} would not have {}{} scheduled entries, but got {} instead",
            self.job,
            at_least_prefix(self.at_least),
            self.expected,
            count_or_unknown(self.actual(queue))
        )
    }

    fn description(&self) -> String {
        format!("have a schedule size of {}{}", at_least_prefix(self.at_least), self.expected)
    }
}
