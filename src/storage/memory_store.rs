use std::sync::{Mutex, MutexGuard};

use super::NoteStore;
use crate::entity::Document;
use crate::error::Result;

/// Keeps the document in memory. Used by tests and throwaway servers.
#[derive(Debug, Default)]
pub struct MemoryStore {
    doc: Mutex<Document>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(doc: Document) -> Self {
        Self {
            doc: Mutex::new(doc),
        }
    }

    /// Copy of the current document, for assertions.
    pub fn snapshot(&self) -> Document {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Document> {
        // A panic while holding the lock cannot leave a half-written document.
        self.doc.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl NoteStore for MemoryStore {
    fn load(&self) -> Result<Document> {
        Ok(self.lock().clone())
    }

    fn save(&self, doc: &Document) -> Result<()> {
        *self.lock() = doc.clone();
        Ok(())
    }
}
