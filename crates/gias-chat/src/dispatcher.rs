//! Send protocol: validate, commit, clear, and schedule the acknowledgment.
//!
//! The dispatcher keeps no state between calls. Each accepted send produces
//! one independent acknowledgment task; the caller decides whether to track
//! or cancel it.

use std::sync::Arc;
use std::time::Duration;

use gias_core::ChatConfig;

use crate::attachment::AttachmentSlot;
use crate::clock::{Clock, Commit, ScheduledTask};
use crate::error::ChatError;
use crate::responder::{AckRequest, Responder};
use crate::state::SendPhase;
use crate::store::SessionStore;
use crate::types::{Message, MessageKind, PendingOutcome, Sender};

/// An accepted send: the committed user message and its pending acknowledgment.
#[derive(Debug)]
pub struct Accepted {
    pub message: Message,
    pub acknowledgment: ScheduledTask,
}

/// Bot texts for each outcome.
#[derive(Debug, Clone)]
struct Replies {
    acknowledged: String,
    in_progress: String,
}

impl Replies {
    fn render(&self, outcome: &PendingOutcome) -> (MessageKind, String) {
        match outcome {
            PendingOutcome::Acknowledged => (MessageKind::Reply, self.acknowledged.clone()),
            PendingOutcome::InProgress => (MessageKind::Progress, self.in_progress.clone()),
            PendingOutcome::Failed(reason) => (
                MessageKind::Error,
                format!("Sorry, your request could not be processed: {}", reason),
            ),
        }
    }
}

/// Validates send requests and commits them to the session.
pub struct Dispatcher {
    store: Arc<SessionStore>,
    slot: Arc<AttachmentSlot>,
    clock: Arc<dyn Clock>,
    responder: Arc<dyn Responder>,
    replies: Replies,
    ack_delay: Duration,
}

impl Dispatcher {
    pub fn new(
        store: Arc<SessionStore>,
        slot: Arc<AttachmentSlot>,
        clock: Arc<dyn Clock>,
        responder: Arc<dyn Responder>,
        config: &ChatConfig,
    ) -> Self {
        let replies = Replies {
            acknowledged: config.acknowledgment_text.clone(),
            in_progress: config.progress_text.clone(),
        };
        Self {
            store,
            slot,
            clock,
            responder,
            replies,
            ack_delay: config.ack_delay(),
        }
    }

    /// Send `text` together with whatever attachment is pending.
    ///
    /// Fails with `ChatError::EmptySend`, touching nothing, when `text` is
    /// blank and no attachment is pending. Otherwise appends the user
    /// message, clears the attachment slot, and schedules the acknowledgment.
    pub fn send(&self, text: &str) -> Result<Accepted, ChatError> {
        let phase = SendPhase::Idle.transition(SendPhase::Validating)?;
        let attachment = self.slot.peek();

        if text.trim().is_empty() && attachment.is_none() {
            phase
                .transition(SendPhase::Rejected)?
                .transition(SendPhase::Idle)?;
            tracing::debug!("Empty send rejected");
            return Err(ChatError::EmptySend);
        }
        let phase = phase.transition(SendPhase::Accepted)?;

        let message = self.store.append(Sender::User, text, attachment.clone());
        self.slot.clear();

        let request = AckRequest {
            message_id: message.id,
            text: message.text.clone(),
            attachment,
        };
        let acknowledgment = self.clock.schedule(
            self.ack_delay,
            Box::pin(acknowledge(
                Arc::clone(&self.store),
                Arc::clone(&self.responder),
                self.replies.clone(),
                request,
            )),
        );

        tracing::info!(
            message_id = message.id,
            has_attachment = message.attachment.is_some(),
            task_id = acknowledgment.id(),
            "Send accepted"
        );
        phase.transition(SendPhase::Idle)?;

        Ok(Accepted {
            message,
            acknowledgment,
        })
    }
}

/// Body of the deferred acknowledgment: ask the responder, then commit one
/// bot message.
async fn acknowledge(
    store: Arc<SessionStore>,
    responder: Arc<dyn Responder>,
    replies: Replies,
    request: AckRequest,
) -> Commit {
    let outcome = responder.respond(&request).await;
    if let PendingOutcome::Failed(ref reason) = outcome {
        tracing::warn!(message_id = request.message_id, reason = %reason, "Request failed");
    }

    let (kind, text) = replies.render(&outcome);
    let message_id = request.message_id;
    Box::new(move || {
        let reply = store.append_with_kind(Sender::Bot, kind, text, None);
        tracing::debug!(message_id, reply_id = reply.id, "Acknowledgment appended");
    })
}

// =============================================================================
// Tests
// =============================================================================
