//! Append-only message timeline.
//!
//! The store is the single owner of message identity: ids start at 1 and grow
//! by exactly one per append regardless of sender, and timestamps never go
//! backwards along the sequence.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;

use crate::clock::Clock;
use crate::types::{AttachmentMeta, Message, MessageKind, Sender};

/// Capacity of the append notification channel.
const EVENT_CAPACITY: usize = 64;

#[derive(Debug)]
struct Timeline {
    messages: Vec<Message>,
    next_id: u64,
}

/// Ordered, append-only sequence of messages for one conversation.
pub struct SessionStore {
    timeline: Mutex<Timeline>,
    clock: Arc<dyn Clock>,
    events: broadcast::Sender<Message>,
}

impl SessionStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            timeline: Mutex::new(Timeline {
                messages: Vec::new(),
                next_id: 1,
            }),
            clock,
            events,
        }
    }

    /// Append an ordinary reply and return it.
    pub fn append(
        &self,
        sender: Sender,
        text: impl Into<String>,
        attachment: Option<AttachmentMeta>,
    ) -> Message {
        self.append_with_kind(sender, MessageKind::Reply, text, attachment)
    }

    /// Append a message tagged with `kind` and return it.
    pub fn append_with_kind(
        &self,
        sender: Sender,
        kind: MessageKind,
        text: impl Into<String>,
        attachment: Option<AttachmentMeta>,
    ) -> Message {
        let message = {
            let mut timeline = self.lock();
            let now = self.clock.now();
            let timestamp = match timeline.messages.last() {
                Some(last) if last.timestamp > now => last.timestamp,
                _ => now,
            };

            let message = Message {
                id: timeline.next_id,
                text: text.into(),
                attachment,
                sender,
                kind,
                timestamp,
            };
            timeline.next_id += 1;
            timeline.messages.push(message.clone());
            message
        };

        tracing::debug!(
            message_id = message.id,
            sender = %message.sender,
            kind = ?message.kind,
            "Message appended"
        );
        // No subscribers is fine; the timeline is the source of truth.
        let _ = self.events.send(message.clone());
        message
    }

    /// Snapshot of the timeline. Later appends are not reflected.
    pub fn list(&self) -> Vec<Message> {
        self.lock().messages.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().messages.is_empty()
    }

    pub fn last(&self) -> Option<Message> {
        self.lock().messages.last().cloned()
    }

    /// Receive every message appended from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Message> {
        self.events.subscribe()
    }

    fn lock(&self) -> MutexGuard<'_, Timeline> {
        self.timeline.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{DeferredTask, ScheduledTask, SystemClock};
    use chrono::{TimeZone, Utc};
    use gias_core::Timestamp;
    use std::collections::VecDeque;
    use std::time::Duration;

    /// Clock that replays a fixed list of readings.
    struct ScriptedClock {
        readings: Mutex<VecDeque<Timestamp>>,
    }

    impl ScriptedClock {
        fn new(seconds: &[i64]) -> Self {
            let readings = seconds
                .iter()
                .map(|s| Timestamp(Utc.timestamp_opt(*s, 0).unwrap()))
                .collect();
            Self {
                readings: Mutex::new(readings),
            }
        }
    }

    impl Clock for ScriptedClock {
        fn now(&self) -> Timestamp {
            self.readings
                .lock()
                .unwrap()
                .pop_front()
                .expect("scripted clock exhausted")
        }

        fn schedule(&self, delay: Duration, task: DeferredTask) -> ScheduledTask {
            ScheduledTask::spawn(delay, task)
        }
    }

    fn store() -> SessionStore {
        SessionStore::new(Arc::new(SystemClock))
    }

    #[test]
    fn test_ids_start_at_one_and_increase_by_one() {
        let store = store();
        let first = store.append(Sender::User, "hello", None);
        let second = store.append(Sender::Bot, "hi", None);
        let third = store.append(Sender::User, "again", None);
        assert_eq!((first.id, second.id, third.id), (1, 2, 3));
    }

    #[test]
    fn test_append_returns_stored_message() {
        let store = store();
        let meta = AttachmentMeta::new("paper.pdf", 1024, "pdf");
        let msg = store.append(Sender::User, "Summarize", Some(meta.clone()));
        assert_eq!(msg.text, "Summarize");
        assert_eq!(msg.attachment, Some(meta));
        assert_eq!(msg.sender, Sender::User);
        assert_eq!(msg.kind, MessageKind::Reply);
        assert_eq!(store.last(), Some(msg));
    }

    #[test]
    fn test_append_with_kind() {
        let store = store();
        let msg = store.append_with_kind(Sender::Bot, MessageKind::Error, "boom", None);
        assert!(msg.is_error());
        assert!(msg.is_from_bot());
    }

    #[test]
    fn test_list_is_a_snapshot() {
        let store = store();
        store.append(Sender::User, "one", None);
        let snapshot = store.list();
        store.append(Sender::Bot, "two", None);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.len(), 2);
        assert!(!store.is_empty());
    }

    #[test]
    fn test_timestamps_never_go_backwards() {
        let store = SessionStore::new(Arc::new(ScriptedClock::new(&[100, 50, 200])));
        let a = store.append(Sender::User, "a", None);
        let b = store.append(Sender::Bot, "b", None);
        let c = store.append(Sender::User, "c", None);
        assert_eq!(b.timestamp, a.timestamp);
        assert!(c.timestamp > b.timestamp);
        assert_eq!(c.timestamp.0.timestamp(), 200);
    }

    #[test]
    fn test_empty_store() {
        let store = store();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert_eq!(store.last(), None);
        assert!(store.list().is_empty());
    }

    #[tokio::test]
    async fn test_subscribers_see_appends() {
        let store = store();
        let mut rx = store.subscribe();
        store.append(Sender::User, "hello", None);
        let received = rx.recv().await.unwrap();
        assert_eq!(received.id, 1);
        assert_eq!(received.text, "hello");
    }

    #[test]
    fn test_append_without_subscribers_succeeds() {
        let store = store();
        let rx = store.subscribe();
        drop(rx);
        let msg = store.append(Sender::User, "still fine", None);
        assert_eq!(msg.id, 1);
    }
}
