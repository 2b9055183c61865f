pub mod config;
pub mod error;

// Search core
pub mod search;

// GitHub integration
pub mod github;

pub mod export;

// HTTP surface
pub mod api;

pub mod cli;

// Re-exports
pub use config::Settings;
pub use error::{Error, Result};
