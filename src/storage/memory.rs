use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CustomerImage, CustomerImageStore};
use crate::errors::CustomerError;

#[derive(Debug, Default)]
pub struct InMemoryImageStore {
    images: RwLock<HashMap<Uuid, CustomerImage>>,
}

impl InMemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, id: Uuid) -> bool {
        self.images.read().await.contains_key(&id)
    }
}

#[async_trait]
impl CustomerImageStore for InMemoryImageStore {
    async fn upload(&self, id: Uuid, image: CustomerImage) -> Result<(), CustomerError> {
        self.images.write().await.insert(id, image);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<CustomerImage, CustomerError> {
        self.images
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| CustomerError::NotFound(format!("no image for customer {id}")))
    }

    // Deleting a missing object succeeds, as it does on S3.
    async fn delete(&self, id: Uuid) -> Result<(), CustomerError> {
        self.images.write().await.remove(&id);
        Ok(())
    }
}
