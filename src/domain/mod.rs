use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::form::cascade::ConfigurationMap;

/// A stored form document
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Record {
    pub fn new(id: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            data,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Which store operation a submission routed to
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionKind {
    Create,
    Update,
}

/// One notification per submission attempt
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmissionEvent {
    Succeeded {
        kind: SubmissionKind,
        record_id: String,
    },
    Rejected {
        issues: Vec<String>,
    },
    Failed {
        kind: SubmissionKind,
        reason: String,
    },
}

impl SubmissionEvent {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionEvent::Succeeded { .. })
    }
}

#[async_trait]
pub trait ConfigSource: Send + Sync {
    async fn fetch(&self) -> anyhow::Result<ConfigurationMap>;
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn create(&self, document: Value) -> anyhow::Result<Record>;
    async fn update(&self, id: &str, document: Value) -> anyhow::Result<Record>;
    async fn get(&self, id: &str) -> anyhow::Result<Option<Record>>;
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: &SubmissionEvent);
}
