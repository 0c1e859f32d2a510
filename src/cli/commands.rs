use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{IdErrorPolicy, ServerConfig, ServiceConfig};
use crate::entity::Presentation;
use crate::search::ListQuery;
use crate::storage::DEFAULT_DB_PATH;

#[derive(Parser, Debug)]
#[command(name = "notes-server")]
#[command(version, about = "A small JSON-file backed notes service")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server
    Serve(ServeArgs),

    /// Create an empty notes database
    Init {
        /// Path of the database file
        #[arg(long, env = "NOTES_DB", default_value = DEFAULT_DB_PATH)]
        db: PathBuf,
    },

    /// Print the notes in a database
    List(ListArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "NOTES_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, short = 'p', env = "NOTES_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Path of the database file
    #[arg(long, env = "NOTES_DB", default_value = DEFAULT_DB_PATH)]
    pub db: PathBuf,

    /// Hours east of UTC used for display timestamps
    #[arg(
        long,
        env = "NOTES_DISPLAY_OFFSET",
        default_value_t = 3,
        allow_negative_numbers = true,
        value_parser = clap::value_parser!(i32).range(-23..=23)
    )]
    pub display_offset: i32,

    /// How timestamps are rendered (display, raw)
    #[arg(long, env = "NOTES_TIMESTAMPS", default_value = "display")]
    pub timestamps: Presentation,

    /// How update/delete report bad or unknown ids (legacy, unified)
    #[arg(long, env = "NOTES_ID_ERRORS", default_value = "legacy")]
    pub id_errors: IdErrorPolicy,

    /// Bump `changed` on updates that change nothing
    #[arg(
        long,
        env = "NOTES_TOUCH_ON_NOOP",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub touch_on_noop: bool,
}

impl ServeArgs {
    pub fn into_config(self) -> ServerConfig {
        ServerConfig {
            host: self.host,
            port: self.port,
            db_path: self.db,
            display_offset_hours: self.display_offset,
            timestamps: self.timestamps,
            service: ServiceConfig {
                id_errors: self.id_errors,
                touch_on_noop: self.touch_on_noop,
            },
        }
    }
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Path of the database file
    #[arg(long, env = "NOTES_DB", default_value = DEFAULT_DB_PATH)]
    pub db: PathBuf,

    /// Case-insensitive title substring
    #[arg(long)]
    pub title: Option<String>,

    /// Case-insensitive content substring
    #[arg(long)]
    pub content: Option<String>,

    /// Only notes created before this date
    #[arg(long)]
    pub created_before: Option<String>,

    /// Only notes created after this date
    #[arg(long)]
    pub created_after: Option<String>,

    /// Skip this many notes
    #[arg(long)]
    pub offset: Option<String>,

    /// Show at most this many notes
    #[arg(long)]
    pub limit: Option<String>,

    /// Hours east of UTC used for display timestamps
    #[arg(
        long,
        env = "NOTES_DISPLAY_OFFSET",
        default_value_t = 3,
        allow_negative_numbers = true,
        value_parser = clap::value_parser!(i32).range(-23..=23)
    )]
    pub display_offset: i32,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ListArgs {
    pub fn query(&self) -> ListQuery {
        ListQuery {
            title: self.title.clone(),
            content: self.content.clone(),
            created_before: self.created_before.clone(),
            created_after: self.created_after.clone(),
            offset: self.offset.clone(),
            limit: self.limit.clone(),
        }
    }
}
