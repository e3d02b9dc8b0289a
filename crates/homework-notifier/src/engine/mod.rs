//! Poll loop
//!
//! Fetches the latest homework status on a fixed interval, turns changes
//! and failures into messages and sends each distinct message once.
//!
//! # Failure containment
//! - Every per-cycle error becomes a notification candidate
//! - Status and error messages share one deduplication slot
//! - The cursor only moves when a response passed validation and reported
//!   a usable `current_date`

mod dedup;
mod interpreter;
mod validator;

pub use dedup::Deduplicator;
pub use interpreter::VerdictCatalog;
pub use validator::check_response;

use crate::client::{Notifier, StatusSource};
use crate::contracts::*;
use crate::error::{NotifierError, Result};
use std::time::Duration;

/// Prefix of messages sent for failed cycles
pub const FAILURE_PREFIX: &str = "Program failure";

/// Message sent for a failed cycle
pub fn failure_message(error: &NotifierError) -> String {
    format!("{}: {}", FAILURE_PREFIX, error)
}

/// Single-item poll loop
pub struct PollLoop<S, N> {
    source: S,
    sink: N,
    catalog: VerdictCatalog,
    interval: Duration,
    cursor: Cursor,
    dedup: Deduplicator,
}

impl<S, N> PollLoop<S, N>
where
    S: StatusSource,
    N: Notifier,
{
    /// Create a loop starting from the current time
    pub fn new(source: S, sink: N, catalog: VerdictCatalog, interval: Duration) -> Self {
        Self {
            source,
            sink,
            catalog,
            interval,
            cursor: Cursor::now(),
            dedup: Deduplicator::new(),
        }
    }

    /// Start from an explicit cursor instead of now
    pub fn with_cursor(mut self, cursor: Cursor) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Last message handed to the sink
    pub fn last_notification(&self) -> &str {
        self.dedup.last()
    }

    /// Poll forever, sleeping `interval` after every cycle
    pub async fn run(&mut self) {
        tracing::info!(
            cursor = %self.cursor,
            interval_secs = self.interval.as_secs(),
            "Starting homework status polling"
        );

        loop {
            self.run_cycle().await;
            tokio::time::sleep(self.interval).await;
        }
    }

    /// Run one fetch-evaluate-notify cycle without sleeping
    pub async fn run_cycle(&mut self) -> CycleReport {
        match self.evaluate().await {
            Ok(Some(message)) => {
                let dispatch = self.dedup.maybe_notify(&self.sink, &message).await;
                CycleReport::StatusChanged {
                    message,
                    dispatch,
                    cursor: self.cursor,
                }
            }
            Ok(None) => {
                tracing::debug!(cursor = %self.cursor, "No homework status changes");
                CycleReport::NoChange {
                    cursor: self.cursor,
                }
            }
            Err(e) => {
                tracing::error!(error = %e, cursor = %self.cursor, "Poll cycle failed");
                let message = failure_message(&e);
                let dispatch = self.dedup.maybe_notify(&self.sink, &message).await;
                CycleReport::Failed {
                    message,
                    dispatch,
                    cursor: self.cursor,
                }
            }
        }
    }

    async fn evaluate(&mut self) -> Result<Option<String>> {
        let response = self.source.fetch(self.cursor).await?;
        let validated = check_response(&response)?;
        self.advance(validated.cursor);

        match validated.record {
            Some(record) => self.catalog.interpret(&record).map(Some),
            None => Ok(None),
        }
    }

    /// Take the server time reported by a validated response.
    ///
    /// The cursor is overwritten on every validated cycle except when the
    /// reported value was unusable (null, fractional, zero or negative); the
    /// validator has already logged that case and the previous cursor stays.
    fn advance(&mut self, next: Option<Cursor>) {
        if let Some(next) = next {
            self.cursor = next;
        }
    }
}
