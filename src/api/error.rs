//! HTTP translation of [`CustomerError`].

use std::collections::BTreeMap;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use crate::errors::{CustomerError, ValidationFailure};

/// Groups failure messages by property, keeping their order.
pub fn failures_by_property(failures: &[ValidationFailure]) -> BTreeMap<&str, Vec<&str>> {
    let mut errors: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for failure in failures {
        errors
            .entry(failure.property.as_str())
            .or_default()
            .push(failure.message.as_str());
    }
    errors
}

impl IntoResponse for CustomerError {
    fn into_response(self) -> Response {
        match self {
            CustomerError::Validation { failures, .. } => {
                let status = StatusCode::BAD_REQUEST;
                let body = json!({
                    "title": "One or more validation errors occurred.",
                    "status": status.as_u16(),
                    "errors": failures_by_property(&failures),
                });
                (status, Json(body)).into_response()
            }
            CustomerError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
            }
            CustomerError::Conflict(message) => {
                (StatusCode::CONFLICT, Json(json!({ "error": message }))).into_response()
            }
            other => {
                error!("Request failed: {}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": other.to_string() })),
                )
                    .into_response()
            }
        }
    }
}
