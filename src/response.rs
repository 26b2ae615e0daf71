use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde_json::json;

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

pub fn internal_server_error_response() -> Response {
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR, 
        "An error has occurred. Please try again later."
    )
}
