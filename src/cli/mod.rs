mod commands;
mod handlers;

pub use commands::{Cli, Commands, ListArgs, ServeArgs};
pub use handlers::{handle_init, handle_list, handle_serve};
