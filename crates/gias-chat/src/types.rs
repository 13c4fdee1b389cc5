//! Message timeline and attachment types.

use std::fmt;
use std::path::Path;

use gias_core::Timestamp;
use serde::{Deserialize, Serialize};

use crate::error::ChatError;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Bot => write!(f, "bot"),
        }
    }
}

/// Tag distinguishing ordinary replies from status and error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Reply,
    Progress,
    Error,
}

/// Metadata describing a selected file. Never carries the file's content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttachmentMeta {
    pub name: String,
    pub size: u64,
    /// Lowercased extension without the leading dot, or a MIME type.
    pub mime_or_extension: String,
}

impl AttachmentMeta {
    pub fn new(name: impl Into<String>, size: u64, mime_or_extension: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            mime_or_extension: mime_or_extension.into(),
        }
    }

    /// Build metadata for a file on disk. Only the file's metadata is read.
    pub fn from_path(path: &Path) -> Result<Self, ChatError> {
        let metadata = std::fs::metadata(path)
            .map_err(|e| ChatError::Attachment(format!("{}: {}", path.display(), e)))?;
        if !metadata.is_file() {
            return Err(ChatError::Attachment(format!(
                "{} is not a regular file",
                path.display()
            )));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| ChatError::Attachment(format!("{} has no file name", path.display())))?;
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        Ok(Self::new(name, metadata.len(), extension))
    }
}

impl fmt::Display for AttachmentMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bytes)", self.name, self.size)
    }
}

/// One entry in the session timeline. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub text: String,
    pub attachment: Option<AttachmentMeta>,
    pub sender: Sender,
    pub kind: MessageKind,
    pub timestamp: Timestamp,
}

impl Message {
    pub fn is_from_bot(&self) -> bool {
        self.sender == Sender::Bot
    }

    pub fn is_error(&self) -> bool {
        self.kind == MessageKind::Error
    }
}

/// Result of asking the backend about an accepted send.
///
/// Each variant maps to exactly one bot message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingOutcome {
    Acknowledged,
    InProgress,
    Failed(String),
}
