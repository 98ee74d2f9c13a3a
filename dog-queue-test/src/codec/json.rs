use serde_json::Value;

use crate::{JobRecord, QueueResult};

/// String-keyed payload form of a record: `{"class": .., "args": [..]}`,
/// plus `time` and `stored_at` on scheduled records.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
    pub fn to_payload(record: &JobRecord) -> QueueResult<Value> {
        Ok(serde_json::to_value(record)?)
    }

    pub fn from_payload(payload: &Value) -> QueueResult<JobRecord> {
        Ok(serde_json::from_value(payload.clone())?)
    }
}
