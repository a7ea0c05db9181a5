use feedback_pipeline_core::clock::{millis_item_id, Clock};
use feedback_pipeline_core::contract::{
    has_required_field, parse_delivered_message, SnsEvent, SnsEventRecord, StoredFeedbackItem,
    REQUIRED_MESSAGE_FIELD,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::adapters::item_store::FeedbackItemStore;
use crate::config::{BatchFailurePolicy, ConsumerConfig};
use crate::telemetry::CONSUMER_COMPONENT;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConsumerResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Stored { id: String },
    Skipped { reason: String },
    Failed { error: String },
}

impl RecordOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Per-record outcomes of one invocation, in delivery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub records: Vec<RecordOutcome>,
    /// Records never attempted because an earlier record failed under `FailFast`.
    pub unprocessed: usize,
}

impl BatchOutcome {
    pub fn total(&self) -> usize {
        self.records.len() + self.unprocessed
    }

    pub fn stored_ids(&self) -> Vec<&str> {
        self.records
            .iter()
            .filter_map(|outcome| match outcome {
                RecordOutcome::Stored { id } => Some(id.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn skipped_count(&self) -> usize {
        self.records
            .iter()
            .filter(|outcome| matches!(outcome, RecordOutcome::Skipped { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.records.iter().filter(|outcome| outcome.is_failed()).count()
    }

    pub fn first_failure(&self) -> Option<(usize, &str)> {
        self.records
            .iter()
            .enumerate()
            .find_map(|(index, outcome)| match outcome {
                RecordOutcome::Failed { error } => Some((index, error.as_str())),
                _ => None,
            })
    }
}

#[derive(Debug, Error)]
pub enum ConsumerError {
    #[error("malformed SNS event: {0}")]
    MalformedEvent(#[source] serde_json::Error),
    #[error("{failed} of {total} records failed; first failure at record {index}: {error}")]
    BatchFailed {
        failed: usize,
        total: usize,
        index: usize,
        error: String,
        outcome: BatchOutcome,
    },
}

pub struct ConsumerHandler<S, C> {
    config: ConsumerConfig,
    store: S,
    clock: C,
}

impl<S: FeedbackItemStore, C: Clock> ConsumerHandler<S, C> {
    pub fn new(config: ConsumerConfig, store: S, clock: C) -> Self {
        Self {
            config,
            store,
            clock,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Stores every delivered message that carries an `email` field.
    ///
    /// Messages without `email` are skipped. Any failed record fails the
    /// whole invocation so the channel can redeliver the batch.
    pub fn handle(&self, event: &Value) -> Result<ConsumerResponse, ConsumerError> {
        let event = SnsEvent::deserialize(event).map_err(ConsumerError::MalformedEvent)?;
        let outcome = self.process_batch(&event);

        tracing::info!(
            component = CONSUMER_COMPONENT,
            event = "batch_completed",
            policy = self.config.failure_policy.as_str(),
            total = outcome.total(),
            stored = outcome.stored_ids().len(),
            skipped = outcome.skipped_count(),
            failed = outcome.failed_count(),
            unprocessed = outcome.unprocessed
        );

        if let Some((index, error)) = outcome.first_failure() {
            return Err(ConsumerError::BatchFailed {
                failed: outcome.failed_count(),
                total: outcome.total(),
                index,
                error: error.to_string(),
                outcome,
            });
        }

        Ok(ConsumerResponse { status_code: 200 })
    }

    pub fn process_batch(&self, event: &SnsEvent) -> BatchOutcome {
        let mut outcome = BatchOutcome {
            records: Vec::with_capacity(event.records.len()),
            unprocessed: 0,
        };

        for (index, record) in event.records.iter().enumerate() {
            let record_outcome = self.process_record(index, record);
            let failed = record_outcome.is_failed();
            outcome.records.push(record_outcome);

            if failed && self.config.failure_policy == BatchFailurePolicy::FailFast {
                outcome.unprocessed = event.records.len() - index - 1;
                break;
            }
        }

        outcome
    }

    fn process_record(&self, index: usize, record: &SnsEventRecord) -> RecordOutcome {
        let message_id = record.sns.message_id.as_deref().unwrap_or_default();

        let parsed = parse_delivered_message(&record.sns.message).and_then(|message| {
            has_required_field(&message).map(|has_email| (message, has_email))
        });
        let message = match parsed {
            Ok((message, true)) => message,
            Ok((_, false)) => {
                tracing::warn!(
                    component = CONSUMER_COMPONENT,
                    event = "record_skipped",
                    index,
                    message_id,
                    body = %record.sns.message
                );
                return RecordOutcome::Skipped {
                    reason: format!("missing '{REQUIRED_MESSAGE_FIELD}' attribute"),
                };
            }
            Err(error) => {
                let error = format!("invalid feedback message: {error}");
                return self.record_failed(index, message_id, error);
            }
        };

        let item = match StoredFeedbackItem::new(millis_item_id(&self.clock), message) {
            Ok(item) => item,
            Err(error) => {
                let error = format!("invalid feedback message: {error}");
                return self.record_failed(index, message_id, error);
            }
        };
        let id = item.id().unwrap_or_default().to_string();

        match self.store.put_item(&self.config.table_name, &item) {
            Ok(()) => {
                tracing::info!(
                    component = CONSUMER_COMPONENT,
                    event = "record_stored",
                    index,
                    message_id,
                    id = %id,
                    table_name = %self.config.table_name
                );
                RecordOutcome::Stored { id }
            }
            Err(error) => {
                let error = format!("failed to store item {id}: {error}");
                self.record_failed(index, message_id, error)
            }
        }
    }

    fn record_failed(&self, index: usize, message_id: &str, error: String) -> RecordOutcome {
        tracing::error!(
            component = CONSUMER_COMPONENT,
            event = "record_failed",
            index,
            message_id,
            error = %error
        );
        RecordOutcome::Failed { error }
    }
}
