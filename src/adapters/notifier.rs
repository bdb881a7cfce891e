use async_trait::async_trait;

use crate::domain::{Notifier, SubmissionEvent};

/// Reports submission outcomes through the log
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, event: &SubmissionEvent) {
        match event {
            SubmissionEvent::Succeeded { kind, record_id } => {
                tracing::info!("Submission {:?} succeeded for record '{}'", kind, record_id);
            }
            SubmissionEvent::Rejected { issues } => {
                tracing::warn!("Submission rejected: {}", issues.join("; "));
            }
            SubmissionEvent::Failed { kind, reason } => {
                tracing::error!("Submission {:?} failed: {}", kind, reason);
            }
        }
    }
}
