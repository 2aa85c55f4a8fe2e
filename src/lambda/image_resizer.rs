//! Resizes images uploaded to S3 in place, marking them so the resulting
//! upload event is ignored.

use std::io::Cursor;

use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::primitives::ByteStream;
use image::ImageFormat;
use image::imageops::FilterType;
use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;
use tracing::{error, info};

use crate::errors::CustomerError;
use crate::storage::{EXTENSION_METADATA, ORIGINAL_NAME_METADATA, RESIZED_METADATA};

pub const TARGET_WIDTH: u32 = 500;
pub const TARGET_HEIGHT: u32 = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    pub bucket: String,
    pub key: String,
}

/// Extracts bucket and key of every S3 record; records without them are skipped.
pub fn object_refs(event: &Value) -> Vec<ObjectRef> {
    event
        .get("Records")
        .and_then(|records| records.as_array())
        .map(|records| {
            records
                .iter()
                .filter_map(|record| {
                    let s3 = record.get("s3")?;
                    let bucket = s3.get("bucket")?.get("name")?.as_str()?;
                    let key = s3.get("object")?.get("key")?.as_str()?;
                    Some(ObjectRef {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Lower-cased file name and extension of the last key segment. Only the part
/// after the first dot counts as the extension.
pub fn split_object_key(key: &str) -> (String, String) {
    let file = key.rsplit('/').next().unwrap_or(key);
    let mut parts = file.split('.');
    let name = parts.next().unwrap_or_default().to_lowercase();
    let extension = parts.next().unwrap_or_default().to_lowercase();
    (name, extension)
}

/// Stretches the image to the target size with a Lanczos3 filter, keeping its
/// encoding. `extension` is used when the format cannot be sniffed.
pub fn resize_image(data: &[u8], extension: &str) -> Result<Vec<u8>, CustomerError> {
    let format = image::guess_format(data)
        .ok()
        .or_else(|| ImageFormat::from_extension(extension))
        .ok_or_else(|| CustomerError::HandlerError("unrecognised image format".to_string()))?;
    let image = image::load_from_memory_with_format(data, format)
        .map_err(|e| CustomerError::HandlerError(format!("Failed to decode image: {e}")))?;

    let resized = image.resize_exact(TARGET_WIDTH, TARGET_HEIGHT, FilterType::Lanczos3);
    let mut out = Cursor::new(Vec::new());
    resized
        .write_to(&mut out, format)
        .map_err(|e| CustomerError::HandlerError(format!("Failed to encode image: {e}")))?;
    Ok(out.into_inner())
}

fn is_resized(value: Option<&String>) -> bool {
    value.is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

pub struct ImageResizer {
    client: S3Client,
}

impl ImageResizer {
    pub fn new(client: S3Client) -> Self {
        Self { client }
    }

    pub async fn handle(&self, event: LambdaEvent<Value>) -> Result<(), Error> {
        for object in object_refs(&event.payload) {
            if let Err(e) = self.resize(&object).await {
                error!(
                    bucket = %object.bucket,
                    key = %object.key,
                    "Error resizing object. Make sure it exists and the bucket is in the same region as this function: {}",
                    e
                );
                return Err(e.into());
            }
        }
        Ok(())
    }

    async fn resize(&self, object: &ObjectRef) -> Result<(), CustomerError> {
        let head = self
            .client
            .head_object()
            .bucket(&object.bucket)
            .key(&object.key)
            .send()
            .await?;
        let metadata = head.metadata().cloned().unwrap_or_default();
        if is_resized(metadata.get(RESIZED_METADATA)) {
            info!(key = %object.key, "Item is already resized");
            return Ok(());
        }

        let (name, extension) = split_object_key(&object.key);
        let original_name = metadata
            .get(ORIGINAL_NAME_METADATA)
            .cloned()
            .unwrap_or(name);
        let extension = metadata
            .get(EXTENSION_METADATA)
            .cloned()
            .unwrap_or(extension);

        let data = self
            .client
            .get_object()
            .bucket(&object.bucket)
            .key(&object.key)
            .send()
            .await?
            .body
            .collect()
            .await
            .map_err(|e| CustomerError::AwsError(format!("Failed to read S3 object body: {e}")))?
            .into_bytes();

        let resized = resize_image(&data, &extension)?;

        let mut request = self
            .client
            .put_object()
            .bucket(&object.bucket)
            .key(&object.key)
            .metadata(ORIGINAL_NAME_METADATA, original_name)
            .metadata(EXTENSION_METADATA, extension)
            .metadata(RESIZED_METADATA, "true")
            .body(ByteStream::from(resized));
        if let Some(content_type) = head.content_type() {
            request = request.content_type(content_type);
        }
        request.send().await?;

        info!(key = %object.key, "Resized image");
        Ok(())
    }
}
