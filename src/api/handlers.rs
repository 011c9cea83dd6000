//! HTTP request handlers for the todo API

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Json as JsonExtractor,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::codec::revive;
use crate::core::error::{Error, StorageError};
use crate::core::AppState;
use crate::types::{Todo, TodoId};

/// Error body returned by every failing endpoint
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Whether the operation was successful (always false)
    pub success: bool,
    /// Error message
    pub error: String,
    /// Optional details about what was invalid
    pub details: Option<Value>,
}

impl ErrorResponse {
    /// Error response without details
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            details: None,
        }
    }

    /// Error response with details
    pub fn with_details(error: impl Into<String>, details: Value) -> Self {
        Self {
            success: false,
            error: error.into(),
            details: Some(details),
        }
    }
}

/// Service error on its way out as an HTTP response
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self(error)
    }
}

impl ApiError {
    /// Status code for the wrapped error
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::Validation(_) | Error::Codec(_) | Error::Bridge(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Storage(StorageError::NotOpen | StorageError::Connection(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self.0 {
            Error::Validation(problems) => {
                ErrorResponse::with_details("Validation failed", json!(problems))
            }
            error if status.is_server_error() => {
                tracing::error!("Request failed: {}", error);
                ErrorResponse::new(error.to_string())
            }
            error => ErrorResponse::new(error.to_string()),
        };
        (status, Json(body)).into_response()
    }
}

/// JSON extractor that answers malformed bodies with an [`ErrorResponse`]
pub struct JsonRequest<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for JsonRequest<T>
where
    T: serde::de::DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request(req: axum::extract::Request, state: &S) -> Result<Self, Self::Rejection> {
        match JsonExtractor::<T>::from_request(req, state).await {
            Ok(JsonExtractor(value)) => Ok(JsonRequest(value)),
            Err(rejection) => {
                let error_message = match rejection {
                    JsonRejection::JsonDataError(_) => "Invalid JSON data",
                    JsonRejection::JsonSyntaxError(_) => "Malformed JSON",
                    JsonRejection::MissingJsonContentType(_) => {
                        "Missing or invalid Content-Type header. Expected 'application/json'"
                    }
                    JsonRejection::BytesRejection(_) => "Failed to read request body",
                    _ => "Invalid JSON request",
                };

                tracing::warn!("JSON parsing error: {}", error_message);
                Err((
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse::new(error_message)),
                ))
            }
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `healthy` once storage is connected, `starting` before
    pub status: String,
    /// Storage backend type in use
    pub storage: String,
    /// Service version
    pub version: String,
}

fn parse_path_id(raw: &str) -> Result<TodoId, ApiError> {
    raw.parse::<TodoId>().map_err(|e| {
        tracing::warn!("Rejected path id '{}'", raw);
        ApiError(e.into())
    })
}

/// `GET /todos`
pub async fn list_todos(State(state): State<AppState>) -> Result<Json<Vec<Todo>>, ApiError> {
    Ok(Json(state.todos.list().await?))
}

/// `POST /todos`
pub async fn create_todo(
    State(state): State<AppState>,
    JsonRequest(body): JsonRequest<Value>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let todo = state.todos.create(&revive(body)).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

/// `GET /todos/:id`
pub async fn get_todo(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Todo>, ApiError> {
    let id = parse_path_id(&raw_id)?;
    match state.todos.get(&id).await? {
        Some(todo) => Ok(Json(todo)),
        None => Err(Error::not_found(format!("todo {}", raw_id)).into()),
    }
}

/// `PUT /todos/:id`
pub async fn update_todo(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    JsonRequest(body): JsonRequest<Value>,
) -> Result<Json<Todo>, ApiError> {
    let id = parse_path_id(&raw_id)?;
    match state.todos.update(&id, &revive(body)).await? {
        Some(todo) => Ok(Json(todo)),
        None => Err(Error::not_found(format!("todo {}", raw_id)).into()),
    }
}

/// `DELETE /todos/:id`
pub async fn delete_todo(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_path_id(&raw_id)?;
    if state.todos.delete(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::not_found(format!("todo {}", raw_id)).into())
    }
}

/// `GET /health`
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let ready = state.store.is_open();
    let response = HealthResponse {
        status: if ready { "healthy" } else { "starting" }.to_string(),
        storage: format!("{:?}", state.config.storage.storage_type).to_lowercase(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{BridgeError, CodecError};

    #[test]
    fn test_status_mapping() {
        let cases = [
            (Error::validation("title is required"), StatusCode::BAD_REQUEST),
            (Error::Codec(CodecError::Malformed("7".into())), StatusCode::BAD_REQUEST),
            (
                Error::Bridge(BridgeError::OutOfRange {
                    id: "0".into(),
                    hex_digits: 25,
                    max: 24,
                }),
                StatusCode::BAD_REQUEST,
            ),
            (Error::not_found("todo 1n"), StatusCode::NOT_FOUND),
            (Error::conflict("ids"), StatusCode::CONFLICT),
            (Error::Storage(StorageError::NotOpen), StatusCode::SERVICE_UNAVAILABLE),
            (Error::MissingIdentifier("{}".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (
                Error::Storage(StorageError::Corruption("bad".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, expected) in cases {
            assert_eq!(ApiError(error).status(), expected);
        }
    }

    #[test]
    fn test_path_id_must_be_tagged() {
        assert_eq!(parse_path_id("42n").unwrap(), TodoId::from(42));
        assert_eq!(parse_path_id("42").unwrap_err().status(), StatusCode::BAD_REQUEST);
    }
}
