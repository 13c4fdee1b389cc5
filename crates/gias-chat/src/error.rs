//! Error types for the chat session core.

use crate::state::SendPhase;

/// Errors from the chat session.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// Nothing to send: blank text and no pending attachment.
    #[error("nothing to send: message is empty and no file is attached")]
    EmptySend,
    #[error("session is closed")]
    SessionClosed,
    #[error("invalid send transition: {0} -> {1}")]
    InvalidTransition(SendPhase, SendPhase),
    #[error("attachment error: {0}")]
    Attachment(String),
}

impl ChatError {
    /// Whether this is the validation rejection of an empty send.
    pub fn is_validation(&self) -> bool {
        matches!(self, ChatError::EmptySend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_error_display() {
        let err = ChatError::EmptySend;
        assert_eq!(
            err.to_string(),
            "nothing to send: message is empty and no file is attached"
        );

        let err = ChatError::SessionClosed;
        assert_eq!(err.to_string(), "session is closed");

        let err = ChatError::InvalidTransition(SendPhase::Idle, SendPhase::Accepted);
        assert_eq!(err.to_string(), "invalid send transition: Idle -> Accepted");

        let err = ChatError::Attachment("paper.pdf: not found".to_string());
        assert_eq!(err.to_string(), "attachment error: paper.pdf: not found");
    }

    #[test]
    fn test_is_validation() {
        assert!(ChatError::EmptySend.is_validation());
        assert!(!ChatError::SessionClosed.is_validation());
    }
}
