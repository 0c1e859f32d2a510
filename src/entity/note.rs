// src/entity/note.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: u64,
    pub title: String,
    pub content: String,
    #[serde(with = "timestamp")]
    pub created: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub changed: DateTime<Utc>,
}

impl Note {
    pub fn new(id: u64, title: String, content: String) -> Self {
        let now = timestamp::now();
        Self {
            id,
            title,
            content,
            created: now,
            changed: now,
        }
    }

    /// Bump `changed`, never letting it fall behind `created`.
    pub fn touch(&mut self) {
        self.changed = timestamp::now().max(self.created);
    }
}
