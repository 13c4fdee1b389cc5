//! Chat session core for Give-It-A-Summary.
//!
//! Owns the message timeline, the single-slot pending attachment, and the
//! send/acknowledge protocol that will eventually front the summarization
//! backend.

pub mod attachment;
pub mod clock;
pub mod dispatcher;
pub mod error;
pub mod responder;
pub mod session;
pub mod state;
pub mod store;
pub mod types;

pub use attachment::AttachmentSlot;
pub use clock::{Clock, Commit, DeferredTask, ScheduledTask, SystemClock};
pub use dispatcher::{Accepted, Dispatcher};
pub use error::ChatError;
pub use responder::{AckRequest, PlaceholderResponder, Responder};
pub use session::ChatSession;
pub use state::{AckPhase, SendPhase};
pub use store::SessionStore;
pub use types::{AttachmentMeta, Message, MessageKind, PendingOutcome, Sender};
