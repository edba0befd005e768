//! # Core Module
//!
//! Configuration, the domain error taxonomy and the time-string notation
//! shared by every layer of the bot.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

pub mod config;
pub mod error;
pub mod timespan;

// Re-export commonly used items
pub use config::Config;
pub use error::{DomainError, DomainResult};
