use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::NoteStore;
use crate::entity::Document;
use crate::error::{NotesError, Result};

/// Default location of the database file, relative to the working directory.
pub const DEFAULT_DB_PATH: &str = "db/notes.json";

/// Stores the document as pretty-printed JSON in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a fresh, empty database file.
    ///
    /// Fails if a file already exists at the path.
    pub fn init(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::new(path);
        if store.path.exists() {
            return Err(NotesError::AlreadyInitialized(
                store.path.display().to_string(),
            ));
        }
        store.save(&Document::default())?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure(&self) -> Result<()> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "creating empty notes database");
            self.save(&Document::default())?;
        }
        Ok(())
    }
}

impl NoteStore for JsonFileStore {
    fn load(&self) -> Result<Document> {
        self.ensure()?;
        let raw = fs::read_to_string(&self.path)?;
        let doc: Document = serde_json::from_str(&raw)?;
        debug!(notes = doc.notes.len(), last_id = doc.last_id, "loaded notes database");
        Ok(doc)
    }

    fn save(&self, doc: &Document) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(doc)?;
        fs::write(&self.path, json)?;
        debug!(notes = doc.notes.len(), "saved notes database");
        Ok(())
    }
}
