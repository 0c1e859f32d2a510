use std::path::PathBuf;

use crate::config::{display_offset, ServerConfig, ServiceConfig};
use crate::entity::{NoteView, Presentation};
use crate::error::{NotesError, Result};
use crate::http;
use crate::search::NoteFilter;
use crate::service::NoteService;
use crate::storage::JsonFileStore;

use super::commands::ListArgs;

pub fn handle_serve(config: ServerConfig) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(http::serve(config))
}

pub fn handle_init(db: PathBuf) -> Result<()> {
    let store = JsonFileStore::init(db)?;
    println!("Initialized notes database at {}", store.path().display());
    Ok(())
}

pub fn handle_list(args: ListArgs) -> Result<()> {
    let offset = display_offset(args.display_offset)?;
    let filter = NoteFilter::from_query(&args.query(), &offset);
    let service = NoteService::new(JsonFileStore::new(args.db.clone()), ServiceConfig::default());

    let notes = match service.list(&filter) {
        Ok(notes) => notes,
        Err(NotesError::NotFound(msg)) => {
            if args.json {
                println!("[]");
            } else {
                println!("{}", msg);
            }
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let views: Vec<NoteView> = notes
        .iter()
        .map(|n| NoteView::render(n, Presentation::Display, &offset))
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&views)?);
    } else {
        println!("Notes:\n");
        for v in views {
            println!("  {:03} [{}] {}", v.id, v.changed, v.title);
        }
    }

    Ok(())
}
