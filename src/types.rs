//! Type definitions for the todo service

/// Identifier types
pub mod ids;
/// Todo entity types
pub mod todo;

// Re-export commonly used types for convenience
pub use ids::TodoId;
pub use todo::{Todo, TodoDraft};
