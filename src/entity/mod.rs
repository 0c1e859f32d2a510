mod note;
pub mod timestamp;

pub use note::Note;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// The whole persisted state: every note plus the id counter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub last_id: u64,
    pub notes: Vec<Note>,
}

impl Document {
    pub fn find_by_id(&self, id: u64) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn find_by_id_mut(&mut self, id: u64) -> Option<&mut Note> {
        self.notes.iter_mut().find(|n| n.id == id)
    }

    pub fn find_by_title(&self, title: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.title == title)
    }

    /// Id the next created note will receive.
    ///
    /// Also stays clear of any note id above a stale `last_id`.
    pub fn next_id(&self) -> u64 {
        let highest = self.notes.iter().map(|n| n.id).max().unwrap_or(0);
        self.last_id.max(highest) + 1
    }
}

/// How `created`/`changed` are rendered in responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Presentation {
    /// `YYYY-MM-DD HH:MM:SS` at the configured display offset.
    #[default]
    Display,
    /// The stored RFC 3339 value.
    Raw,
}

impl std::fmt::Display for Presentation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Presentation::Display => write!(f, "display"),
            Presentation::Raw => write!(f, "raw"),
        }
    }
}

impl std::str::FromStr for Presentation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "display" => Ok(Presentation::Display),
            "raw" => Ok(Presentation::Raw),
            _ => Err(format!("Invalid timestamp presentation: {}", s)),
        }
    }
}

/// A note as it is sent over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteView {
    pub id: u64,
    pub title: String,
    pub content: String,
    pub created: String,
    pub changed: String,
}

impl NoteView {
    pub fn render(note: &Note, presentation: Presentation, offset: &FixedOffset) -> Self {
        let stamp = |ts: &DateTime<Utc>| match presentation {
            Presentation::Display => timestamp::to_display(ts, offset),
            Presentation::Raw => timestamp::to_rfc3339(ts),
        };
        Self {
            id: note.id,
            title: note.title.clone(),
            content: note.content.clone(),
            created: stamp(&note.created),
            changed: stamp(&note.changed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_note() -> Note {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        Note {
            id: 7,
            title: "Groceries".to_string(),
            content: "milk".to_string(),
            created: ts,
            changed: ts,
        }
    }

    #[test]
    fn test_document_wire_shape() {
        let doc = Document {
            last_id: 7,
            notes: vec![sample_note()],
        };
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["lastId"], 7);
        assert_eq!(json["notes"][0]["title"], "Groceries");
        assert_eq!(json["notes"][0]["created"], "2024-01-02T03:04:05.000Z");
    }

    #[test]
    fn test_document_reads_legacy_timestamps() {
        let raw = r#"{
            "lastId": 1,
            "notes": [{
                "id": 1,
                "title": "old",
                "content": "text",
                "created": "2024-01-02 06:04:05",
                "changed": "2024-01-02T03:10:00.000Z"
            }]
        }"#;
        let doc: Document = serde_json::from_str(raw).unwrap();
        let note = doc.find_by_id(1).unwrap();
        assert_eq!(note.created, Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap());
    }

    #[test]
    fn test_find_by_title_is_exact() {
        let doc = Document {
            last_id: 7,
            notes: vec![sample_note()],
        };
        assert!(doc.find_by_title("Groceries").is_some());
        assert!(doc.find_by_title("groceries").is_none());
        assert!(doc.find_by_id(8).is_none());
        assert_eq!(doc.next_id(), 8);
    }

    #[test]
    fn test_render_display_and_raw() {
        let note = sample_note();
        let offset = FixedOffset::east_opt(3 * 3600).unwrap();

        let display = NoteView::render(&note, Presentation::Display, &offset);
        assert_eq!(display.created, "2024-01-02 06:04:05");
        assert_eq!(display.changed, display.created);

        let raw = NoteView::render(&note, Presentation::Raw, &offset);
        assert_eq!(raw.created, "2024-01-02T03:04:05.000Z");
    }

    #[test]
    fn test_presentation_from_str() {
        assert_eq!("RAW".parse::<Presentation>().unwrap(), Presentation::Raw);
        assert!("fancy".parse::<Presentation>().is_err());
    }
}
