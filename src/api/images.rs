use axum::extract::{Multipart, Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use super::AppState;
use crate::errors::CustomerError;
use crate::storage::CustomerImage;

/// Multipart field carrying the image bytes.
pub const IMAGE_FIELD: &str = "Data";

fn bad_upload(message: impl Into<String>) -> CustomerError {
    CustomerError::validation(IMAGE_FIELD, message)
}

pub async fn upload_image(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<StatusCode, CustomerError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_upload(e.body_text()))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let original_name = field.file_name().map(str::to_string);
        let content_type = field
            .content_type()
            .map(str::to_string)
            .or_else(|| {
                original_name
                    .as_deref()
                    .map(|name| mime_guess::from_path(name).first_or_octet_stream().to_string())
            })
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| bad_upload(e.body_text()))?
            .to_vec();
        if data.is_empty() {
            return Err(bad_upload("The uploaded file is empty"));
        }

        state
            .images
            .upload(
                id,
                CustomerImage {
                    content_type,
                    data,
                    original_name,
                },
            )
            .await?;
        return Ok(StatusCode::OK);
    }
    Err(bad_upload(format!("A file must be sent in the '{IMAGE_FIELD}' field")))
}

pub async fn get_image(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, CustomerError> {
    let image = state.images.get(id).await?;
    Ok(([(header::CONTENT_TYPE, image.content_type)], image.data).into_response())
}

pub async fn delete_image(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, CustomerError> {
    state.images.delete(id).await?;
    Ok(StatusCode::OK)
}
