//! Send and acknowledgment lifecycles with validated transitions.
//!
//! A send request moves through:
//! - Idle -> Validating (request received)
//! - Validating -> Rejected (nothing to send)
//! - Validating -> Accepted (user message committed)
//! - Rejected / Accepted -> Idle (dispatcher ready for the next request)
//!
//! Each accepted send spawns an acknowledgment that moves through:
//! - Waiting -> Fulfilled (bot message appended)
//! - Waiting -> Cancelled (session torn down first)

use std::fmt;

use crate::error::ChatError;

/// Phase of a single send request inside the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SendPhase {
    Idle,
    Validating,
    Rejected,
    Accepted,
}

impl fmt::Display for SendPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendPhase::Idle => write!(f, "Idle"),
            SendPhase::Validating => write!(f, "Validating"),
            SendPhase::Rejected => write!(f, "Rejected"),
            SendPhase::Accepted => write!(f, "Accepted"),
        }
    }
}

impl SendPhase {
    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &SendPhase) -> bool {
        matches!(
            (self, target),
            (SendPhase::Idle, SendPhase::Validating)
                | (SendPhase::Validating, SendPhase::Rejected)
                | (SendPhase::Validating, SendPhase::Accepted)
                | (SendPhase::Rejected, SendPhase::Idle)
                | (SendPhase::Accepted, SendPhase::Idle)
        )
    }

    /// Move to `target`, or fail with `ChatError::InvalidTransition`.
    pub fn transition(self, target: SendPhase) -> Result<SendPhase, ChatError> {
        if self.can_transition_to(&target) {
            tracing::debug!("Send phase: {} -> {}", self, target);
            Ok(target)
        } else {
            Err(ChatError::InvalidTransition(self, target))
        }
    }
}

/// Phase of a deferred acknowledgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AckPhase {
    Waiting,
    Fulfilled,
    Cancelled,
}

impl fmt::Display for AckPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AckPhase::Waiting => write!(f, "Waiting"),
            AckPhase::Fulfilled => write!(f, "Fulfilled"),
            AckPhase::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl AckPhase {
    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &AckPhase) -> bool {
        matches!(
            (self, target),
            (AckPhase::Waiting, AckPhase::Fulfilled) | (AckPhase::Waiting, AckPhase::Cancelled)
        )
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, AckPhase::Waiting)
    }
}

// =============================================================================
// Tests
// =============================================================================
