use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stored representation of one enqueued or scheduled job invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Job type name, never a live job reference
    pub class: String,

    /// Positional arguments in call order
    pub args: Vec<Value>,

    /// Due time (scheduled records only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,

    /// When the scheduled record was created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stored_at: Option<DateTime<Utc>>,
}

impl JobRecord {
    /// Create an immediate record
    pub fn new(class: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            class: class.into(),
            args,
            time: None,
            stored_at: None,
        }
    }

    /// Set the due time
    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.time = Some(time);
        self
    }

    /// Set the creation time of a scheduled record
    pub fn with_stored_at(mut self, stored_at: DateTime<Utc>) -> Self {
        self.stored_at = Some(stored_at);
        self
    }

    /// Check if the record carries a due time
    pub fn is_scheduled(&self) -> bool {
        self.time.is_some()
    }

    /// Check if the record belongs to the given job type
    pub fn is_class(&self, class: &str) -> bool {
        self.class == class
    }

    /// Exact class and argument equality, as used by removals
    pub fn is_invocation(&self, class: &str, args: &[Value]) -> bool {
        self.is_class(class) && self.args == args
    }

    /// Due time relative to creation, in whole seconds
    pub fn delay_seconds(&self) -> Option<i64> {
        match (self.time, self.stored_at) {
            (Some(time), Some(stored_at)) => Some(time.timestamp() - stored_at.timestamp()),
            _ => None,
        }
    }
}
