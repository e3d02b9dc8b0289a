//! Homework Notifier Contracts
//!
//! Data passed between the status fetcher, the response validator, the
//! status interpreter and the poll loop.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Records collection field of a status API response
pub const RECORDS_FIELD: &str = "homeworks";

/// Cursor-refresh field of a status API response
pub const CURSOR_FIELD: &str = "current_date";

/// Identifier field of a status record
pub const NAME_FIELD: &str = "homework_name";

/// Verdict code field of a status record
pub const STATUS_FIELD: &str = "status";

/// Time cursor into the remote change feed, in unix seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(i64);

impl Cursor {
    /// Cursor at an explicit unix timestamp
    pub fn from_secs(secs: i64) -> Self {
        Self(secs)
    }

    /// Cursor at the current wall-clock time
    pub fn now() -> Self {
        Self(chrono::Utc::now().timestamp())
    }

    pub fn as_secs(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Untyped payload returned by the status API for one fetch.
///
/// Always a JSON object; anything else is rejected by the fetcher.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    body: Map<String, Value>,
}

impl RawResponse {
    /// Accept a parsed JSON value, returning it back when it is not an object
    pub fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::Object(body) => Ok(Self { body }),
            other => Err(other),
        }
    }

    /// Look up a top-level field
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.body.get(field)
    }
}

/// Latest known state of one tracked homework, exactly as reported
#[derive(Debug, Clone, PartialEq)]
pub struct StatusRecord {
    fields: Map<String, Value>,
}

impl StatusRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Field value, treating an explicit `null` the same as absence
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).filter(|v| !v.is_null())
    }
}

/// Output of the response validator
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedResponse {
    /// Server time to poll from on the next cycle; `None` when the reported
    /// value is unusable and the previous cursor should be kept
    pub cursor: Option<Cursor>,

    /// First reported record; `None` when nothing changed
    pub record: Option<StatusRecord>,
}

/// What happened to a notification candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// Handed to the sink and accepted
    Dispatched,

    /// Handed to the sink, which failed; still counts as the last notification
    DeliveryFailed,

    /// Same text as the last notification, sink not called
    Suppressed,
}

impl DispatchOutcome {
    /// Whether the sink was called
    pub fn attempted(&self) -> bool {
        !matches!(self, DispatchOutcome::Suppressed)
    }
}

/// Summary of one poll cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CycleReport {
    /// Structurally valid response with no status record
    NoChange { cursor: Cursor },

    /// A status record was interpreted into a message
    StatusChanged {
        message: String,
        dispatch: DispatchOutcome,
        cursor: Cursor,
    },

    /// The cycle failed; the error text went through deduplication
    Failed {
        message: String,
        dispatch: DispatchOutcome,
        cursor: Cursor,
    },
}

impl CycleReport {
    /// Cursor in effect after the cycle
    pub fn cursor(&self) -> Cursor {
        match self {
            CycleReport::NoChange { cursor }
            | CycleReport::StatusChanged { cursor, .. }
            | CycleReport::Failed { cursor, .. } => *cursor,
        }
    }

    /// Candidate message of the cycle, if any
    pub fn message(&self) -> Option<&str> {
        match self {
            CycleReport::NoChange { .. } => None,
            CycleReport::StatusChanged { message, .. } | CycleReport::Failed { message, .. } => {
                Some(message)
            }
        }
    }

    pub fn dispatch(&self) -> Option<DispatchOutcome> {
        match self {
            CycleReport::NoChange { .. } => None,
            CycleReport::StatusChanged { dispatch, .. } | CycleReport::Failed { dispatch, .. } => {
                Some(*dispatch)
            }
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, CycleReport::Failed { .. })
    }
}

/// Short name of a JSON value's type, for error messages
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_response_rejects_non_objects() {
        let err = RawResponse::from_value(json!([1, 2])).unwrap_err();
        assert_eq!(json_kind(&err), "array");

        let ok = RawResponse::from_value(json!({"homeworks": []})).unwrap();
        assert!(ok.get(RECORDS_FIELD).is_some());
    }

    #[test]
    fn test_record_field_treats_null_as_missing() {
        let record = match json!({"homework_name": null, "status": "approved"}) {
            Value::Object(map) => StatusRecord::new(map),
            _ => unreachable!(),
        };
        assert!(record.field(NAME_FIELD).is_none());
        assert_eq!(record.field(STATUS_FIELD), Some(&json!("approved")));
    }

    #[test]
    fn test_only_suppressed_skips_the_sink() {
        assert!(DispatchOutcome::Dispatched.attempted());
        assert!(DispatchOutcome::DeliveryFailed.attempted());
        assert!(!DispatchOutcome::Suppressed.attempted());
    }

    #[test]
    fn test_cycle_report_serialization() {
        let report = CycleReport::StatusChanged {
            message: "hello".to_string(),
            dispatch: DispatchOutcome::Dispatched,
            cursor: Cursor::from_secs(42),
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["outcome"], "status_changed");
        assert_eq!(value["dispatch"], "dispatched");
        assert_eq!(value["cursor"], 42);
    }
}
