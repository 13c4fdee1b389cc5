//! Single-slot staging area for the file chosen but not yet sent.

use std::sync::Mutex;

use crate::types::AttachmentMeta;

/// Holds at most one pending attachment. Selecting a new file replaces the
/// previous one without complaint.
#[derive(Debug, Default)]
pub struct AttachmentSlot {
    pending: Mutex<Option<AttachmentMeta>>,
}

impl AttachmentSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage `meta`, returning whatever it displaced.
    pub fn set(&self, meta: AttachmentMeta) -> Option<AttachmentMeta> {
        tracing::debug!(name = %meta.name, size = meta.size, "Attachment staged");
        self.lock().replace(meta)
    }

    /// Empty the slot. Clearing an empty slot is a no-op.
    pub fn clear(&self) {
        self.lock().take();
    }

    pub fn peek(&self) -> Option<AttachmentMeta> {
        self.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_none()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<AttachmentMeta>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }
}
