//! # Configuration
//!
//! `TestQueueConfig` holds the few knobs of the queue double. It can be
//! built in code or layered from `DOG_QUEUE_TEST__*` environment variables:
//!
//! ```bash
//! export DOG_QUEUE_TEST__INLINE_BEFORE_ENQUEUE=skip
//! export DOG_QUEUE_TEST__SCHEDULED_SUFFIX=_delayed
//! ```
//!
//! Keys are the variable name without the prefix, lowercased, with `__`
//! turned into `.`.

use crate::types::queue_name::DEFAULT_SCHEDULED_SUFFIX;
use crate::{QueueError, QueueResult};

/// Environment prefix read by [`TestQueueConfig::from_env`]
pub const ENV_PREFIX: &str = "DOG_QUEUE_TEST__";

/// Whether inline enqueues consult before_enqueue hooks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InlineEnqueuePolicy {
    /// Run before_enqueue hooks inline too; `false` aborts the job
    #[default]
    RunBeforeHooks,
    /// Inline enqueues never call before_enqueue hooks
    SkipBeforeHooks,
}

impl InlineEnqueuePolicy {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "run" | "run_before_hooks" => Some(Self::RunBeforeHooks),
            "skip" | "skip_before_hooks" => Some(Self::SkipBeforeHooks),
            _ => None,
        }
    }
}

/// Configuration for the queue double
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestQueueConfig {
    pub inline_before_enqueue: InlineEnqueuePolicy,
    /// Suffix naming a job's scheduled sibling queue
    pub scheduled_suffix: String,
}

impl Default for TestQueueConfig {
    fn default() -> Self {
        Self {
            inline_before_enqueue: InlineEnqueuePolicy::default(),
            scheduled_suffix: DEFAULT_SCHEDULED_SUFFIX.to_string(),
        }
    }
}

impl TestQueueConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inline_before_enqueue(mut self, policy: InlineEnqueuePolicy) -> Self {
        self.inline_before_enqueue = policy;
        self
    }

    pub fn with_scheduled_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.scheduled_suffix = suffix.into();
        self
    }

    /// Layer `key = value` pairs over the defaults.
    ///
    /// Known keys: `inline_before_enqueue` (`run` / `skip`) and
    /// `scheduled_suffix`. Unknown keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> QueueResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();

        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                "inline_before_enqueue" => {
                    config.inline_before_enqueue =
                        InlineEnqueuePolicy::parse(value).ok_or_else(|| invalid(key, value))?;
                }
                "scheduled_suffix" => {
                    if value.is_empty() {
                        return Err(invalid(key, value));
                    }
                    config.scheduled_suffix = value.to_string();
                }
                _ => tracing::trace!("ignoring unknown config key {}", key),
            }
        }

        Ok(config)
    }

    /// Defaults overridden by `DOG_QUEUE_TEST__*` environment variables
    pub fn from_env() -> QueueResult<Self> {
        Self::from_pairs(std::env::vars().filter_map(|(key, value)| {
            key.strip_prefix(ENV_PREFIX)
                .map(|stripped| (stripped.to_lowercase().replace("__", "."), value))
        }))
    }
}

fn invalid(key: &str, value: &str) -> QueueError {
    QueueError::InvalidConfig {
        key: key.to_string(),
        value: value.to_string(),
    }
}
