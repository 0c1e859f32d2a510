//! Note operations: validation, title uniqueness, filtering, id assignment.
//!
//! Every operation loads the document from the store, works on it, and saves
//! it back if it changed. Nothing is cached between calls.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{IdErrorPolicy, ServiceConfig};
use crate::entity::Note;
use crate::error::{NotesError, Result};
use crate::search::NoteFilter;
use crate::storage::NoteStore;

pub mod messages {
    pub const NO_NOTES: &str = "no notes";
    pub const NO_MATCHES: &str = "no notes match filters";
    pub const NOTE_NOT_FOUND: &str = "note not found";
    pub const INVALID_ID: &str = "invalid id";
    pub const FIELDS_REQUIRED: &str = "title and content required";
    pub const BODY_NOT_OBJECT: &str = "request body must be a JSON object";
    pub const TITLE_TAKEN: &str = "note with this title already exists";
    pub const OTHER_TITLE_TAKEN: &str = "another note with this title exists";
}

/// Create payload. Both fields are required; they are optional here so a
/// missing field is reported as a validation error rather than a parse error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewNote {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Update payload for a note
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoteUpdate {
    /// Ignored when empty or equal to the current title.
    pub title: Option<String>,
    /// Replaces the content when present, even if empty.
    pub content: Option<String>,
}

pub struct NoteService<S> {
    store: S,
    config: ServiceConfig,
}

impl<S: NoteStore> NoteService<S> {
    pub fn new(store: S, config: ServiceConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// All notes matching `filter`, in insertion order.
    pub fn list(&self, filter: &NoteFilter) -> Result<Vec<Note>> {
        let doc = self.store.load()?;
        if doc.notes.is_empty() {
            return Err(NotesError::NotFound(messages::NO_NOTES.to_string()));
        }

        let total = doc.notes.len();
        let notes = filter.apply(doc.notes);
        debug!(total, matched = notes.len(), filtered = !filter.is_empty(), "listed notes");

        if notes.is_empty() {
            return Err(NotesError::NotFound(messages::NO_MATCHES.to_string()));
        }
        Ok(notes)
    }

    pub fn read_by_title(&self, title: &str) -> Result<Note> {
        let doc = self.store.load()?;
        doc.find_by_title(title)
            .cloned()
            .ok_or_else(|| NotesError::NotFound(messages::NOTE_NOT_FOUND.to_string()))
    }

    pub fn read_by_id(&self, raw_id: &str) -> Result<Note> {
        let id = parse_id(raw_id)
            .ok_or_else(|| NotesError::InvalidId(messages::INVALID_ID.to_string()))?;
        let doc = self.store.load()?;
        doc.find_by_id(id)
            .cloned()
            .ok_or_else(|| NotesError::NotFound(messages::NOTE_NOT_FOUND.to_string()))
    }

    pub fn create(&self, input: NewNote) -> Result<Note> {
        let (title, content) = match (input.title, input.content) {
            (Some(t), Some(c)) if !t.is_empty() && !c.is_empty() => (t, c),
            _ => return Err(NotesError::InvalidInput(messages::FIELDS_REQUIRED.to_string())),
        };

        let mut doc = self.store.load()?;
        if doc.find_by_title(&title).is_some() {
            return Err(NotesError::Conflict(messages::TITLE_TAKEN.to_string()));
        }

        let id = doc.next_id();
        let note = Note::new(id, title, content);
        doc.notes.push(note.clone());
        doc.last_id = id;
        self.store.save(&doc)?;

        info!(id, title = %note.title, "created note");
        Ok(note)
    }

    pub fn update(&self, raw_id: &str, changes: NoteUpdate) -> Result<()> {
        let id = parse_id(raw_id).ok_or_else(|| self.invalid_id_on_mutate())?;
        let mut doc = self.store.load()?;

        if doc.find_by_id(id).is_none() {
            return Err(self.missing_on_mutate());
        }

        let new_title = changes.title.filter(|t| !t.is_empty());
        if let Some(ref title) = new_title {
            if doc.notes.iter().any(|n| n.title == *title && n.id != id) {
                return Err(NotesError::Conflict(messages::OTHER_TITLE_TAKEN.to_string()));
            }
        }

        let note = doc
            .find_by_id_mut(id)
            .ok_or_else(|| self.missing_on_mutate())?;

        let mut dirty = false;
        if let Some(title) = new_title {
            if title != note.title {
                note.title = title;
                dirty = true;
            }
        }
        if let Some(content) = changes.content {
            if content != note.content {
                note.content = content;
                dirty = true;
            }
        }

        if !dirty && !self.config.touch_on_noop {
            debug!(id, "update changed nothing, leaving note untouched");
            return Ok(());
        }

        note.touch();
        self.store.save(&doc)?;
        info!(id, dirty, "updated note");
        Ok(())
    }

    pub fn delete(&self, raw_id: &str) -> Result<()> {
        let id = parse_id(raw_id).ok_or_else(|| self.invalid_id_on_mutate())?;
        let mut doc = self.store.load()?;

        let idx = doc
            .notes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| self.missing_on_mutate())?;
        doc.notes.remove(idx);
        self.store.save(&doc)?;

        info!(id, "deleted note");
        Ok(())
    }

    fn invalid_id_on_mutate(&self) -> NotesError {
        let msg = messages::INVALID_ID.to_string();
        match self.config.id_errors {
            IdErrorPolicy::Legacy => NotesError::Conflict(msg),
            IdErrorPolicy::Unified => NotesError::InvalidId(msg),
        }
    }

    fn missing_on_mutate(&self) -> NotesError {
        let msg = messages::NOTE_NOT_FOUND.to_string();
        match self.config.id_errors {
            IdErrorPolicy::Legacy => NotesError::Conflict(msg),
            IdErrorPolicy::Unified => NotesError::NotFound(msg),
        }
    }
}

/// Parse a path id. Surrounding whitespace is tolerated, as is any decimal
/// spelling of a whole number (`1.0`, `1e0`).
pub fn parse_id(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if let Ok(id) = raw.parse::<u64>() {
        return Some(id);
    }
    // Largest integer an f64 holds exactly.
    const MAX_EXACT: f64 = 9_007_199_254_740_991.0;
    raw.parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && n.fract() == 0.0 && (0.0..=MAX_EXACT).contains(n))
        .map(|n| n as u64)
}
