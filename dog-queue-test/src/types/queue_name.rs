use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Suffix appended to a queue name to derive its scheduled sibling
pub const DEFAULT_SCHEDULED_SUFFIX: &str = "_scheduled";

/// Name of a destination queue
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueueName(String);

impl QueueName {
    /// Create a queue name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty name stands for "no queue"
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sibling queue holding delayed records, e.g. `people` -> `people_scheduled`
    pub fn scheduled(&self) -> Self {
        self.with_suffix(DEFAULT_SCHEDULED_SUFFIX)
    }

    /// Sibling queue using a custom suffix
    pub fn with_suffix(&self, suffix: &str) -> Self {
        Self(format!("{}{}", self.0, suffix))
    }
}

impl fmt::Display for QueueName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for QueueName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<&str> for QueueName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<&String> for QueueName {
    fn from(name: &String) -> Self {
        Self(name.clone())
    }
}

impl From<&QueueName> for QueueName {
    fn from(name: &QueueName) -> Self {
        name.clone()
    }
}

impl Borrow<str> for QueueName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for QueueName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for QueueName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
