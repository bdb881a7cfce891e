//! Shared, async-friendly handle over a form session

use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::dispatch::{SubmissionDispatcher, SubmitOutcome};
use super::error::FormError;
use super::session::FormSession;
use crate::domain::ConfigSource;

/// Clonable handle to one form session.
///
/// The lock is only taken for the synchronous `begin_*` / `finish_*` steps,
/// never while a load or dispatch is awaited, so the form stays editable.
#[derive(Clone)]
pub struct SharedForm {
    inner: Arc<RwLock<FormSession>>,
}

impl SharedForm {
    pub fn new(session: FormSession) -> Self {
        Self {
            inner: Arc::new(RwLock::new(session)),
        }
    }

    pub async fn read<R>(&self, f: impl FnOnce(&FormSession) -> R) -> R {
        let session = self.inner.read().await;
        f(&session)
    }

    pub async fn write<R>(&self, f: impl FnOnce(&mut FormSession) -> R) -> R {
        let mut session = self.inner.write().await;
        f(&mut session)
    }

    pub async fn load_configuration(&self, source: &dyn ConfigSource) -> Result<(), FormError> {
        let ticket = self.write(|s| s.begin_config_load()).await?;

        match source.fetch().await {
            Ok(map) => self.write(|s| s.finish_config_load(ticket, map)).await,
            Err(e) => {
                let reason = e.to_string();
                self.write(|s| s.fail_config_load(ticket, reason.clone())).await?;
                Err(FormError::ConfigurationUnavailable(reason))
            }
        }
    }

    pub async fn submit(&self, dispatcher: &SubmissionDispatcher) -> Result<SubmitOutcome, FormError> {
        self.submit_with(dispatcher, Map::new()).await
    }

    /// Submit with extra top-level document values (e.g. a publish status).
    pub async fn submit_with(
        &self,
        dispatcher: &SubmissionDispatcher,
        extras: Map<String, Value>,
    ) -> Result<SubmitOutcome, FormError> {
        let (ticket, payload) = self.write(|s| s.begin_submit(extras)).await?;
        let outcome = dispatcher.dispatch(payload).await;
        self.write(|s| s.finish_submit(ticket, &outcome)).await?;
        Ok(outcome)
    }

    pub async fn close(&self) {
        self.write(|s| s.close()).await
    }
}
