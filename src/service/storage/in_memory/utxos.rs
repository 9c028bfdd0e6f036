use std::collections::btree_map::Entry;

use async_trait::async_trait;

use crate::service::storage::utxos::{self, next_spent};
use crate::types::Utxo;

use super::{InternalError, MapStorage};

fn check_owner(address: &str, utxo: &Utxo) -> Result<(), utxos::UpdateError<InternalError>> {
    if utxo.address != address {
        return Err(utxos::UpdateError::AddressMismatch {
            expected: address.to_string(),
            found: utxo.address.clone(),
        });
    }

    Ok(())
}

#[async_trait]
impl utxos::Storage for MapStorage {
    type InternalError = InternalError;

    async fn insert_utxo(&self, utxo: &Utxo) -> Result<(), utxos::InsertError<Self::InternalError>> {
        let mut utxos_storage = self.utxos.lock().await;

        match utxos_storage.entry((utxo.tx_id.clone(), utxo.vout)) {
            Entry::Occupied(_) => Err(utxos::InsertError::Conflict {
                tx_id: utxo.tx_id.clone(),
                vout: utxo.vout,
            }),
            Entry::Vacant(v) => {
                v.insert(utxo.clone());
                Ok(())
            }
        }
    }

    async fn get_utxo(&self, tx_id: &str, vout: u64) -> Result<Option<Utxo>, Self::InternalError> {
        let utxos_storage = self.utxos.lock().await;

        Ok(utxos_storage.get(&(tx_id.to_string(), vout)).cloned())
    }

    async fn get_address_utxo(
        &self,
        address: &str,
        tx_id: &str,
        vout: u64,
    ) -> Result<Option<Utxo>, Self::InternalError> {
        let utxos_storage = self.utxos.lock().await;

        Ok(utxos_storage
            .get(&(tx_id.to_string(), vout))
            .filter(|utxo| utxo.address == address)
            .cloned())
    }

    async fn get_address_coin_utxos(
        &self,
        address: &str,
        coin: &str,
    ) -> Result<Vec<Utxo>, Self::InternalError> {
        let utxos_storage = self.utxos.lock().await;

        Ok(utxos_storage
            .values()
            .filter(|utxo| utxo.address == address && utxo.coin == coin)
            .cloned()
            .collect())
    }

    async fn get_utxos_spent_by(
        &self,
        spent_tx_id: &str,
    ) -> Result<Vec<Utxo>, Self::InternalError> {
        let utxos_storage = self.utxos.lock().await;

        Ok(utxos_storage
            .values()
            .filter(|utxo| utxo.is_spent() && utxo.spent == spent_tx_id)
            .cloned()
            .collect())
    }

    async fn get_spending_tx_ids(&self) -> Result<Vec<String>, Self::InternalError> {
        let utxos_storage = self.utxos.lock().await;

        let mut ids: Vec<String> = utxos_storage
            .values()
            .filter(|utxo| utxo.is_spent())
            .map(|utxo| utxo.spent.clone())
            .collect();
        ids.sort();
        ids.dedup();

        Ok(ids)
    }

    async fn update_address_utxo(
        &self,
        address: &str,
        utxo: &Utxo,
    ) -> Result<Utxo, utxos::UpdateError<Self::InternalError>> {
        check_owner(address, utxo)?;

        let mut utxos_storage = self.utxos.lock().await;

        match utxos_storage.entry((utxo.tx_id.clone(), utxo.vout)) {
            Entry::Occupied(o) => {
                let stored = o.into_mut();
                check_owner(address, stored)?;

                stored.spent = next_spent::<InternalError>(stored, &utxo.spent)?;

                Ok(stored.clone())
            }
            Entry::Vacant(v) => Ok(v.insert(utxo.clone()).clone()),
        }
    }

    async fn update_address_utxo_mandatory(
        &self,
        address: &str,
        utxo: &Utxo,
    ) -> Result<Utxo, utxos::UpdateError<Self::InternalError>> {
        check_owner(address, utxo)?;

        let mut utxos_storage = self.utxos.lock().await;

        let stored = utxos_storage
            .get_mut(&(utxo.tx_id.clone(), utxo.vout))
            .ok_or_else(|| utxos::UpdateError::NotFound {
                tx_id: utxo.tx_id.clone(),
                vout: utxo.vout,
            })?;

        let spent = next_spent::<InternalError>(stored, &utxo.spent)?;

        *stored = Utxo {
            spent,
            ..utxo.clone()
        };

        Ok(stored.clone())
    }
}
