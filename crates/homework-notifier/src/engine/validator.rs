//! Response validation
//!
//! Checks the structure of a status API response and picks the first status
//! record. An empty records list, or a leading `null`, means nothing changed
//! and is not an error. A `current_date` that is present but unusable is
//! logged and reported as `None` so the record is still interpreted.

use crate::contracts::*;
use crate::error::{NotifierError, Result};
use serde_json::Value;

/// Validate a raw response and extract the cursor and the first record
pub fn check_response(response: &RawResponse) -> Result<ValidatedResponse> {
    let records = response
        .get(RECORDS_FIELD)
        .ok_or_else(|| NotifierError::shape(format!("missing '{}' field", RECORDS_FIELD)))?;

    let cursor = response
        .get(CURSOR_FIELD)
        .ok_or_else(|| NotifierError::shape(format!("missing '{}' field", CURSOR_FIELD)))?;

    let records = records.as_array().ok_or_else(|| {
        NotifierError::shape(format!(
            "'{}' must be an array, got {}",
            RECORDS_FIELD,
            json_kind(records)
        ))
    })?;

    let cursor = parse_cursor(cursor);

    let record = match records.first() {
        None | Some(Value::Null) => None,
        Some(Value::Object(fields)) => Some(StatusRecord::new(fields.clone())),
        Some(other) => {
            return Err(NotifierError::shape(format!(
                "status record must be an object, got {}",
                json_kind(other)
            )))
        }
    };

    if records.len() > 1 {
        tracing::debug!(
            count = records.len(),
            "Status API reported several records, using the first"
        );
    }

    Ok(ValidatedResponse { cursor, record })
}

/// Positive whole number of seconds, given as an integer or an integral float
fn parse_cursor(value: &Value) -> Option<Cursor> {
    let secs = value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f <= i64::MAX as f64)
            .map(|f| f as i64)
    });

    match secs {
        Some(secs) if secs > 0 => Some(Cursor::from_secs(secs)),
        _ => {
            tracing::error!(
                reported = %value,
                "Status API reported an unusable '{}', keeping previous cursor",
                CURSOR_FIELD
            );
            None
        }
    }
}
