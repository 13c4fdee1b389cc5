//! Chat session: the explicit owner of a conversation's state.
//!
//! A session owns the timeline, the attachment slot, and every acknowledgment
//! still in flight. Closing or dropping the session cancels those
//! acknowledgments so none of them appends to a discarded timeline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use gias_core::ChatConfig;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::attachment::AttachmentSlot;
use crate::clock::{Clock, ScheduledTask, SystemClock};
use crate::dispatcher::Dispatcher;
use crate::error::ChatError;
use crate::responder::{PlaceholderResponder, Responder};
use crate::store::SessionStore;
use crate::types::{AttachmentMeta, Message, Sender};

/// One conversation with the summarization assistant.
pub struct ChatSession {
    id: Uuid,
    store: Arc<SessionStore>,
    slot: Arc<AttachmentSlot>,
    dispatcher: Dispatcher,
    outstanding: Mutex<Vec<ScheduledTask>>,
    closed: AtomicBool,
}

impl ChatSession {
    /// Create a session on the system clock with the placeholder responder.
    pub fn new(config: ChatConfig) -> Self {
        Self::with_parts(config, Arc::new(SystemClock), Arc::new(PlaceholderResponder))
    }

    /// Create a session with explicit collaborators.
    pub fn with_parts(
        config: ChatConfig,
        clock: Arc<dyn Clock>,
        responder: Arc<dyn Responder>,
    ) -> Self {
        let id = Uuid::new_v4();
        let store = Arc::new(SessionStore::new(Arc::clone(&clock)));
        let slot = Arc::new(AttachmentSlot::new());

        if let Some(greeting) = config.greeting() {
            store.append(Sender::Bot, greeting, None);
        }

        let dispatcher = Dispatcher::new(
            Arc::clone(&store),
            Arc::clone(&slot),
            clock,
            responder,
            &config,
        );

        tracing::info!(session_id = %id, "Chat session opened");
        Self {
            id,
            store,
            slot,
            dispatcher,
            outstanding: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Stage a file for the next send, returning the one it replaced.
    pub fn attach(&self, meta: AttachmentMeta) -> Option<AttachmentMeta> {
        self.slot.set(meta)
    }

    /// Drop the staged file, if any.
    pub fn detach(&self) {
        self.slot.clear();
    }

    pub fn pending_attachment(&self) -> Option<AttachmentMeta> {
        self.slot.peek()
    }

    /// Send `text` with the staged attachment, returning the user message.
    ///
    /// The bot acknowledgment arrives later on the timeline.
    pub fn send(&self, text: &str) -> Result<Message, ChatError> {
        // Held across the send so a concurrent close() sees this task.
        let mut outstanding = self.lock_outstanding();
        if self.is_closed() {
            return Err(ChatError::SessionClosed);
        }

        let accepted = self.dispatcher.send(text)?;
        outstanding.retain(|task| !task.is_finished());
        outstanding.push(accepted.acknowledgment);
        Ok(accepted.message)
    }

    /// Snapshot of the timeline.
    pub fn messages(&self) -> Vec<Message> {
        self.store.list()
    }

    /// Shared handle to the timeline.
    pub fn store(&self) -> Arc<SessionStore> {
        Arc::clone(&self.store)
    }

    /// Receive every message appended from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Message> {
        self.store.subscribe()
    }

    /// Number of acknowledgments that have not fired yet.
    pub fn outstanding(&self) -> usize {
        self.lock_outstanding()
            .iter()
            .filter(|task| !task.is_finished())
            .count()
    }

    /// Wait until every outstanding acknowledgment has fired or been cancelled.
    ///
    /// Tasks stay registered while they are awaited, so `close()` can still
    /// cancel them.
    pub async fn settle(&self) {
        loop {
            let pending: Vec<_> = {
                let mut outstanding = self.lock_outstanding();
                outstanding.retain(|task| !task.is_finished());
                outstanding.iter().map(ScheduledTask::finished).collect()
            };
            if pending.is_empty() {
                return;
            }
            for finished in pending {
                finished.await;
            }
        }
    }

    /// Cancel every outstanding acknowledgment and refuse further sends.
    pub fn close(&self) {
        let mut outstanding = self.lock_outstanding();
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        let mut cancelled = 0usize;
        for task in outstanding.drain(..) {
            if !task.is_finished() {
                task.cancel();
                cancelled += 1;
            }
        }
        tracing::info!(session_id = %self.id, cancelled, "Chat session closed");
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn lock_outstanding(&self) -> MutexGuard<'_, Vec<ScheduledTask>> {
        self.outstanding.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("id", &self.id)
            .field("store", &self.store)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use gias_core::config::DEFAULT_GREETING;
    use std::time::Duration;

    fn quiet_config() -> ChatConfig {
        ChatConfig {
            greeting: String::new(),
            ..ChatConfig::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_greeting_opens_the_timeline() {
        let session = ChatSession::new(ChatConfig::default());
        let messages = session.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].id, 1);
        assert_eq!(messages[0].sender, Sender::Bot);
        assert_eq!(messages[0].text, DEFAULT_GREETING);

        let sent = session.send("hello").unwrap();
        assert_eq!(sent.id, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_greeting_starts_empty() {
        let session = ChatSession::new(quiet_config());
        assert!(session.messages().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_attach_detach() {
        let session = ChatSession::new(quiet_config());
        let paper = AttachmentMeta::new("paper.pdf", 1024, "pdf");
        assert_eq!(session.attach(paper.clone()), None);
        assert_eq!(session.pending_attachment(), Some(paper.clone()));

        let sheet = AttachmentMeta::new("sheet.xlsx", 2048, "xlsx");
        assert_eq!(session.attach(sheet), Some(paper));

        session.detach();
        assert_eq!(session.pending_attachment(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_outstanding_tracks_pending_acknowledgments() {
        let session = ChatSession::new(quiet_config());
        session.send("one").unwrap();
        session.send("two").unwrap();
        assert_eq!(session.outstanding(), 2);

        session.settle().await;
        assert_eq!(session.outstanding(), 0);
        assert_eq!(session.messages().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_cancels_outstanding_and_refuses_sends() {
        let session = ChatSession::new(quiet_config());
        session.send("one").unwrap();
        session.close();
        assert!(session.is_closed());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(session.messages().len(), 1);
        assert!(matches!(
            session.send("two"),
            Err(ChatError::SessionClosed)
        ));

        // Closing again is harmless.
        session.close();
    }

    #[tokio::test(start_paused = true)]
    async fn test_finished_tasks_are_pruned_on_send() {
        let session = ChatSession::new(quiet_config());
        session.send("one").unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
        session.send("two").unwrap();
        assert_eq!(session.lock_outstanding().len(), 1);
        session.settle().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_ids_are_unique() {
        let a = ChatSession::new(quiet_config());
        let b = ChatSession::new(quiet_config());
        assert_ne!(a.id(), b.id());
    }
}
