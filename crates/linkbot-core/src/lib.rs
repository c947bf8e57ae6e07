//! Shared configuration and error types for the linkbot workspace.

pub mod config;
pub mod error;

pub use config::LinkbotConfig;
pub use error::{LinkbotError, Result};
