use async_trait::async_trait;

use crate::service::storage::chain;

use super::{InternalError, MapStorage};

#[async_trait]
impl chain::Storage for MapStorage {
    type InternalError = InternalError;

    async fn get_height(&self) -> Result<Option<u64>, Self::InternalError> {
        Ok(*self.height.lock().await)
    }

    async fn update_height(&self, height: u64) -> Result<(), Self::InternalError> {
        *self.height.lock().await = Some(height);

        Ok(())
    }
}
