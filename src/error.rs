use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotesError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    InvalidId(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Database already exists at {0}")]
    AlreadyInitialized(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NotesError {
    /// True for failures of the storage layer rather than of the request.
    pub fn is_internal(&self) -> bool {
        matches!(self, NotesError::Io(_) | NotesError::Json(_))
    }
}

pub type Result<T> = std::result::Result<T, NotesError>;
