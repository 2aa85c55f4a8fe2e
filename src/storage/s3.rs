use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::primitives::ByteStream;
use tracing::info;
use uuid::Uuid;

use super::{
    CustomerImage, CustomerImageStore, EXTENSION_METADATA, ORIGINAL_NAME_METADATA,
    file_extension, image_key,
};
use crate::errors::CustomerError;

#[derive(Debug, Clone)]
pub struct S3ImageStore {
    client: S3Client,
    bucket: String,
}

impl S3ImageStore {
    pub fn new(client: S3Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl CustomerImageStore for S3ImageStore {
    async fn upload(&self, id: Uuid, image: CustomerImage) -> Result<(), CustomerError> {
        let key = image_key(id);
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(&image.content_type)
            .body(ByteStream::from(image.data));
        if let Some(name) = &image.original_name {
            request = request
                .metadata(ORIGINAL_NAME_METADATA, name)
                .metadata(EXTENSION_METADATA, file_extension(name));
        }
        request.send().await?;
        info!(bucket = %self.bucket, key = %key, "Uploaded customer image");
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<CustomerImage, CustomerError> {
        let key = image_key(id);
        let response = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.as_service_error().is_some_and(|se| se.is_no_such_key()) => {
                return Err(CustomerError::NotFound(format!("no image for customer {id}")));
            }
            Err(e) => return Err(e.into()),
        };

        let content_type = response
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let original_name = response
            .metadata()
            .and_then(|m| m.get(ORIGINAL_NAME_METADATA))
            .cloned();
        let data = response
            .body
            .collect()
            .await
            .map_err(|e| CustomerError::AwsError(format!("Failed to read S3 object body: {e}")))?
            .into_bytes()
            .to_vec();

        Ok(CustomerImage {
            content_type,
            data,
            original_name,
        })
    }

    async fn delete(&self, id: Uuid) -> Result<(), CustomerError> {
        let key = image_key(id);
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await?;
        info!(bucket = %self.bucket, key = %key, "Deleted customer image");
        Ok(())
    }
}
