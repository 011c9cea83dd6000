//! Todo domain: input normalization, id generation and the CRUD service

/// Request body normalization
pub mod normalize;

/// Identifier generation
pub mod id_gen;

/// CRUD service
pub mod service;

pub use id_gen::{generate_unused_id, IdGenerator, ID_CEILING};
pub use normalize::normalize;
pub use service::{demo_todos, TodoService};
