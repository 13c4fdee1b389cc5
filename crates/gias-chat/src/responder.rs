//! Backend seam for accepted sends.
//!
//! The dispatcher hands every accepted send to a [`Responder`] once the
//! acknowledgment delay has elapsed and turns the returned
//! [`PendingOutcome`] into a bot message. A summarization client plugs in
//! here by implementing the trait; the dispatcher does not change.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::{AttachmentMeta, PendingOutcome};

/// What the responder is told about an accepted send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AckRequest {
    /// Id of the user message that triggered the acknowledgment.
    pub message_id: u64,
    pub text: String,
    pub attachment: Option<AttachmentMeta>,
}

/// Produces the outcome of an accepted send.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, request: &AckRequest) -> PendingOutcome;
}

/// Acknowledges every request without contacting anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderResponder;

#[async_trait]
impl Responder for PlaceholderResponder {
    async fn respond(&self, request: &AckRequest) -> PendingOutcome {
        tracing::debug!(message_id = request.message_id, "Placeholder acknowledgment");
        PendingOutcome::Acknowledged
    }
}
