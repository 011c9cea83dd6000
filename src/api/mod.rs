//! # API Module
//!
//! HTTP interface of the todo service.
//!
//! ## Endpoints
//! - `GET /todos` - All todos in id order
//! - `POST /todos` - Create a todo; the server assigns its id
//! - `GET /todos/:id` - Todo by id
//! - `PUT /todos/:id` - Replace a todo; the body repeats the id
//! - `DELETE /todos/:id` - Delete a todo
//! - `GET /health` - Liveness and storage readiness
//!
//! Ids appear in paths and bodies in their wire form, `<digits>n`.

pub mod handlers;
pub mod server;

pub use handlers::{ApiError, ErrorResponse, JsonRequest};
pub use server::{create_app, start_server};
