use async_trait::async_trait;

use crate::service::storage::addresses;

use super::{InternalError, MapStorage};

#[async_trait]
impl addresses::Storage for MapStorage {
    type InternalError = InternalError;

    async fn insert_address(
        &self,
        address: &str,
    ) -> Result<(), addresses::InsertError<Self::InternalError>> {
        let mut addresses_storage = self.addresses.lock().await;

        if !addresses_storage.insert(address.to_string()) {
            return Err(addresses::InsertError::AlreadyExists(address.to_string()));
        }

        Ok(())
    }

    async fn get_addresses(&self) -> Result<Vec<String>, Self::InternalError> {
        let addresses_storage = self.addresses.lock().await;

        Ok(addresses_storage.iter().cloned().collect())
    }
}
