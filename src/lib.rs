pub mod cli;
pub mod config;
pub mod entity;
pub mod error;
pub mod http;
pub mod search;
pub mod service;
pub mod storage;

pub use config::{IdErrorPolicy, ServerConfig, ServiceConfig};
pub use entity::{Document, Note, NoteView, Presentation};
pub use error::{NotesError, Result};
pub use service::NoteService;
pub use storage::{JsonFileStore, MemoryStore, NoteStore};
