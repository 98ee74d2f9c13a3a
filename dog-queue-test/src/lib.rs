//! # dog-queue-test: an in-memory queue double
//!
//! Stands in for a job queue broker in tests. Code under test enqueues
//! through a [`QueueAdapter`]; the test then asserts on what was recorded,
//! or flips the queue to inline mode and lets jobs run on the spot.
//!
//! - **Inspectable store**: one FIFO list of records per queue name
//! - **Inline mode**: perform jobs synchronously instead of storing them
//! - **Scheduling**: `enqueue_at` / `enqueue_in` land in `<queue>_scheduled`
//! - **Matchers**: `have_queued`, `have_scheduled` and size assertions with
//!   `anything()` / `any_args()` wildcards
//! - **Escape hatch**: `with_extension_disabled` routes calls to a real backend
//!
//! ## Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use dog_queue_test::prelude::*;
//! use serde_json::Value;
//!
//! struct Person;
//!
//! impl Job for Person {
//!     fn job_type(&self) -> &str {
//!         "Person"
//!     }
//!
//!     fn queue(&self) -> Option<QueueName> {
//!         Some("people".into())
//!     }
//!
//!     fn perform(&self, _args: &[Value]) -> Result<(), JobError> {
//!         Ok(())
//!     }
//! }
//!
//! let queue = TestQueue::new();
//! let person = Arc::new(Person);
//!
//! queue.enqueue(&person, args!["Les", "Hill"]).unwrap();
//!
//! queue.verify(&have_queued(&person, pattern!["Les", "Hill"])).unwrap();
//! queue.verify(&have_queue_size_of(&person, 1)).unwrap();
//!
//! queue.with_inline(|| queue.enqueue(&person, args!["Les"])).unwrap();
//! queue.verify(&have_queue_size_of(&person, 1)).unwrap();
//! ```

pub mod adapter;
pub mod backend;
pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod execution;
pub mod job;
pub mod matchers;
pub mod scheduler;
pub mod types;

pub use adapter::QueueAdapter;
pub use backend::{EnqueueOutcome, QueueBackend, UnavailableBackend};
pub use codec::{JsonCodec, RecordCodec};
pub use config::{InlineEnqueuePolicy, TestQueueConfig};
pub use engine::TestQueue;
pub use error::{JobError, QueueError, QueueResult};
pub use execution::{perform, PerformOutcome, ReservedJob};
pub use job::{EnqueueHooks, FailureHooks, Job, JobRef, JobRegistry, PerformHooks, QueueResolver};
pub use matchers::{
    any_args, anything, be_queued, have_queue_size_of, have_queue_size_of_at_least, have_queued,
    have_schedule_size_of, have_schedule_size_of_at_least, have_scheduled, have_scheduled_at, Arg,
    ArgsPattern, QueueMatcher,
};
pub use types::{Clock, InterceptionToggle, JobRecord, MockClock, QueueName, SystemClock, ToggleScope};

#[doc(hidden)]
pub use serde_json;

/// Build a job argument list from JSON-like values.
///
/// ```rust
/// use dog_queue_test::args;
/// use serde_json::json;
///
/// assert_eq!(args!["Les", 1, null], vec![json!("Les"), json!(1), json!(null)]);
/// assert!(args![].is_empty());
/// ```
#[macro_export]
macro_rules! args {
    ($($tt:tt)*) => {
        match $crate::serde_json::json!([$($tt)*]) {
            $crate::serde_json::Value::Array(args) => args,
            _ => ::std::vec::Vec::new(),
        }
    };
}

/// Build an exact argument pattern; positions may hold `anything()`.
///
/// ```rust
/// use dog_queue_test::{anything, pattern, args};
///
/// assert!(pattern!["Les", anything()].matches(&args!["Les", "Hill"]));
/// assert!(!pattern![].matches(&args![null]));
/// ```
#[macro_export]
macro_rules! pattern {
    ($($arg:expr),* $(,)?) => {
        $crate::matchers::ArgsPattern::Exact(::std::vec![
            $($crate::matchers::IntoArg::into_arg($arg)),*
        ])
    };
}

/// Everything a test usually needs
pub mod prelude {
    pub use crate::{
        any_args, anything, args, be_queued, have_queue_size_of, have_queue_size_of_at_least, have_queued,
        have_schedule_size_of, have_schedule_size_of_at_least, have_scheduled, have_scheduled_at,
        pattern,
    };

    pub use crate::{
        EnqueueHooks, EnqueueOutcome, FailureHooks, Job, JobError, JobRef, PerformHooks, PerformOutcome, QueueAdapter,
        QueueBackend, QueueError, QueueMatcher, QueueName, QueueResult, TestQueue,
    };

    pub use crate::{Clock, MockClock};
}
