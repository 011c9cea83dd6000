//! Core application plumbing: configuration, errors, logging and state

/// Application configuration
pub mod config;

/// Error types
pub mod error;

/// Tracing setup
pub mod logging;

/// Application state
pub mod app_state;

// Re-export commonly used items
pub use app_state::{create_app_state, AppState};
pub use config::Config;
pub use error::{Error, Result};
