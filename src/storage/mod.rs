//! Persistence for the note document.
//!
//! The whole collection lives in one [`Document`] that is loaded and saved
//! in full. Nothing serializes a load against a later save, so two writers
//! racing on the same store resolve as last-write-wins.

mod json_store;
mod memory_store;

pub use json_store::{JsonFileStore, DEFAULT_DB_PATH};
pub use memory_store::MemoryStore;

use crate::entity::Document;
use crate::error::Result;

pub trait NoteStore: Send + Sync {
    /// Read the document, creating and persisting an empty one if none exists.
    fn load(&self) -> Result<Document>;

    /// Overwrite the stored document.
    fn save(&self, doc: &Document) -> Result<()>;
}
