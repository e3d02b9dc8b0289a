//! Notification deduplication
//!
//! A single slot holds the last message handed to the sink, whether it was a
//! status change or an error. A candidate equal to the slot is dropped.

use crate::client::Notifier;
use crate::contracts::DispatchOutcome;

/// Remembers the last attempted notification
#[derive(Debug, Default)]
pub struct Deduplicator {
    last: String,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text of the last attempted notification, empty before the first one
    pub fn last(&self) -> &str {
        &self.last
    }

    /// Send `candidate` unless it repeats the last notification.
    ///
    /// The slot is updated before the send result is known, so a message the
    /// sink failed to take is not retried on the next cycle.
    pub async fn maybe_notify<N>(&mut self, sink: &N, candidate: &str) -> DispatchOutcome
    where
        N: Notifier + ?Sized,
    {
        if candidate == self.last {
            tracing::debug!(text = candidate, "Notification unchanged, not sending");
            return DispatchOutcome::Suppressed;
        }

        self.last = candidate.to_string();

        match sink.send(candidate).await {
            Ok(()) => {
                tracing::debug!(text = candidate, "Notification sent");
                DispatchOutcome::Dispatched
            }
            Err(e) => {
                tracing::error!(error = %e, text = candidate, "Failed to send notification");
                DispatchOutcome::DeliveryFailed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SinkError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        sent: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for RecordingSink {
        async fn send(&self, text: &str) -> Result<(), SinkError> {
            self.sent.lock().unwrap().push(text.to_string());
            if self.fail {
                Err(SinkError::Delivery("connection reset".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn test_repeated_candidate_is_suppressed() {
        let sink = RecordingSink::default();
        let mut dedup = Deduplicator::new();

        assert_eq!(dedup.maybe_notify(&sink, "a").await, DispatchOutcome::Dispatched);
        assert_eq!(dedup.maybe_notify(&sink, "a").await, DispatchOutcome::Suppressed);
        assert_eq!(sink.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_changed_candidate_is_sent() {
        let sink = RecordingSink::default();
        let mut dedup = Deduplicator::new();

        dedup.maybe_notify(&sink, "a").await;
        dedup.maybe_notify(&sink, "b").await;
        dedup.maybe_notify(&sink, "a").await;

        assert_eq!(*sink.sent.lock().unwrap(), vec!["a", "b", "a"]);
        assert_eq!(dedup.last(), "a");
    }

    #[tokio::test]
    async fn test_failed_delivery_still_updates_slot() {
        let sink = RecordingSink {
            fail: true,
            ..Default::default()
        };
        let mut dedup = Deduplicator::new();

        assert_eq!(dedup.maybe_notify(&sink, "a").await, DispatchOutcome::DeliveryFailed);
        assert_eq!(dedup.last(), "a");
        assert_eq!(dedup.maybe_notify(&sink, "a").await, DispatchOutcome::Suppressed);
        assert_eq!(sink.sent.lock().unwrap().len(), 1);
    }
}
