//! Verdict catalog and status interpretation

use crate::contracts::{json_kind, StatusRecord, NAME_FIELD, STATUS_FIELD};
use crate::error::{NotifierError, Result};
use serde_json::Value;
use std::collections::BTreeMap;

/// Mapping from verdict code to the message sent for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerdictCatalog {
    verdicts: BTreeMap<String, String>,
}

impl Default for VerdictCatalog {
    fn default() -> Self {
        Self::from_entries([
            (
                "approved",
                "The work has been reviewed: the reviewer liked everything. Hooray!",
            ),
            ("reviewing", "The work has been taken for review by the reviewer."),
            (
                "rejected",
                "The work has been reviewed: the reviewer has comments.",
            ),
        ])
    }
}

impl VerdictCatalog {
    /// Build a catalog from `(code, message)` pairs
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            verdicts: entries
                .into_iter()
                .map(|(code, message)| (code.into(), message.into()))
                .collect(),
        }
    }

    /// Message for a verdict code
    pub fn message(&self, code: &str) -> Option<&str> {
        self.verdicts.get(code).map(String::as_str)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.verdicts.contains_key(code)
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.verdicts.keys().map(String::as_str)
    }

    /// Turn a status record into a notification message
    pub fn interpret(&self, record: &StatusRecord) -> Result<String> {
        let name = required_str(record, NAME_FIELD)?;
        let code = required_str(record, STATUS_FIELD)?;

        if name.is_empty() {
            return Err(NotifierError::missing_field(NAME_FIELD));
        }

        let verdict = self
            .message(code)
            .ok_or_else(|| NotifierError::UnknownVerdict {
                code: code.to_string(),
            })?;

        Ok(format!("Status changed for \"{}\". {}", name, verdict))
    }
}

fn required_str<'a>(record: &'a StatusRecord, field: &str) -> Result<&'a str> {
    match record.field(field) {
        None => Err(NotifierError::missing_field(field)),
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(other) => Err(NotifierError::shape(format!(
            "'{}' must be a string, got {}",
            field,
            json_kind(other)
        ))),
    }
}
