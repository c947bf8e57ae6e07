pub mod adapter;
pub mod commands;
pub mod error;
pub mod handler;
pub mod respond;
pub mod send;

pub use adapter::DiscordAdapter;
pub use commands::{parse, Command};
pub use error::DiscordError;
pub use respond::{execute, Reply};
