//! Todo service - a REST backend for todo entries
//!
//! Todos are identified by arbitrary-precision integers. On the wire those
//! travel as `<digits>n` strings ([`codec`]); in the document store they
//! become fixed-width 96-bit object ids ([`storage::bridge`]).
#![warn(missing_docs)]

// Core foundational modules
pub mod core;
pub mod codec;
pub mod types;

// Main functional modules
pub mod storage;
pub mod todo;
pub mod api;

// Re-export commonly used items for convenience
pub use core::{Config, Error, Result};
pub use types::{Todo, TodoDraft, TodoId};

/// Crate version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
