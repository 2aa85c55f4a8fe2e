//! Customer profile images.

pub mod memory;
pub mod s3;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::CustomerError;

pub use memory::InMemoryImageStore;
pub use s3::S3ImageStore;

pub const ORIGINAL_NAME_METADATA: &str = "originalname";
pub const EXTENSION_METADATA: &str = "extension";
pub const RESIZED_METADATA: &str = "resized";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerImage {
    pub content_type: String,
    pub data: Vec<u8>,
    /// File name the image was uploaded with, if known.
    pub original_name: Option<String>,
}

/// Object key of a customer's image.
pub fn image_key(id: Uuid) -> String {
    format!("images/{id}")
}

/// Extension of `file_name` without the dot, or an empty string.
pub fn file_extension(file_name: &str) -> &str {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .unwrap_or_default()
}

#[async_trait]
pub trait CustomerImageStore: Send + Sync {
    async fn upload(&self, id: Uuid, image: CustomerImage) -> Result<(), CustomerError>;

    /// `NotFound` when the customer has no image.
    async fn get(&self, id: Uuid) -> Result<CustomerImage, CustomerError>;

    async fn delete(&self, id: Uuid) -> Result<(), CustomerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_key() {
        let id = Uuid::nil();
        assert_eq!(image_key(id), "images/00000000-0000-0000-0000-000000000000");
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("me.png"), "png");
        assert_eq!(file_extension("archive.tar.gz"), "gz");
        assert_eq!(file_extension("README"), "");
    }
}
