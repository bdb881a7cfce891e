//! Submission dispatch: validate, then create or update

use serde::Serialize;
use std::sync::Arc;

use super::session::SubmissionPayload;
use super::validate::{FieldIssue, NoValidation, RequiredFields, Validator};
use crate::domain::{Notifier, Record, RecordStore, SubmissionEvent, SubmissionKind};

/// Why a submission did not succeed
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    /// Rejected before reaching the store
    Validation(Vec<FieldIssue>),
    /// The store call failed
    Dispatch(String),
}

/// Result of exactly one submission attempt
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum SubmitOutcome {
    Success(Record),
    Failure(FailureReason),
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmitOutcome::Success(_))
    }
}

#[derive(Clone)]
pub struct SubmissionDispatcher {
    store: Arc<dyn RecordStore>,
    validator: Arc<dyn Validator>,
    notifier: Arc<dyn Notifier>,
}

impl SubmissionDispatcher {
    pub fn new(store: Arc<dyn RecordStore>, validator: Arc<dyn Validator>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            validator,
            notifier,
        }
    }

    /// Dispatcher that only enforces required fields
    pub fn with_store(store: Arc<dyn RecordStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self::new(store, Arc::new(NoValidation), notifier)
    }

    /// Required fields first, then the supplied rules. Every issue is kept.
    fn validate(&self, payload: &SubmissionPayload) -> Result<(), Vec<FieldIssue>> {
        let mut issues = RequiredFields::new(payload.required.clone())
            .validate(&payload.fields)
            .err()
            .unwrap_or_default();
        if let Err(more) = self.validator.validate(&payload.fields) {
            issues.extend(more);
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }

    /// Run one submission attempt. Never retries; the caller decides.
    pub async fn dispatch(&self, payload: SubmissionPayload) -> SubmitOutcome {
        if let Err(issues) = self.validate(&payload) {
            tracing::info!("Submission rejected with {} issue(s)", issues.len());
            let event = SubmissionEvent::Rejected {
                issues: issues.iter().map(|i| i.message.clone()).collect(),
            };
            self.notifier.notify(&event).await;
            return SubmitOutcome::Failure(FailureReason::Validation(issues));
        }

        let (kind, result) = match payload.record_id.as_deref() {
            Some(id) => {
                tracing::info!("Dispatching update for record '{}'", id);
                (SubmissionKind::Update, self.store.update(id, payload.document).await)
            }
            None => {
                tracing::info!("Dispatching create");
                (SubmissionKind::Create, self.store.create(payload.document).await)
            }
        };

        match result {
            Ok(record) => {
                self.notifier
                    .notify(&SubmissionEvent::Succeeded {
                        kind,
                        record_id: record.id.clone(),
                    })
                    .await;
                SubmitOutcome::Success(record)
            }
            Err(e) => {
                tracing::warn!("Submission failed: {}", e);
                let reason = e.to_string();
                self.notifier
                    .notify(&SubmissionEvent::Failed {
                        kind,
                        reason: reason.clone(),
                    })
                    .await;
                SubmitOutcome::Failure(FailureReason::Dispatch(reason))
            }
        }
    }
}
