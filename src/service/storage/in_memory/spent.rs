use std::collections::hash_map::Entry;

use async_trait::async_trait;

use crate::{
    service::storage::spent::{self, Merge},
    types::SpentUtxo,
};

use super::{InternalError, MapStorage};

#[async_trait]
impl spent::Storage for MapStorage {
    type InternalError = InternalError;

    async fn merge_spent_utxo(&self, record: &SpentUtxo) -> Result<Merge, Self::InternalError> {
        let mut spent_storage = self.spent.lock().await;

        let stored = match spent_storage.entry(record.spent_tx_id.clone()) {
            Entry::Occupied(o) => o.into_mut(),
            Entry::Vacant(v) => {
                let mut created = SpentUtxo::new(record.spent_tx_id.clone(), Vec::new());
                let added = append_missing(&mut created, record);
                v.insert(created);

                return Ok(Merge {
                    created: true,
                    added,
                });
            }
        };

        Ok(Merge {
            created: false,
            added: append_missing(stored, record),
        })
    }

    async fn get_spent_utxo(
        &self,
        spent_tx_id: &str,
    ) -> Result<Option<SpentUtxo>, Self::InternalError> {
        let spent_storage = self.spent.lock().await;

        Ok(spent_storage.get(spent_tx_id).cloned())
    }
}

fn append_missing(stored: &mut SpentUtxo, record: &SpentUtxo) -> usize {
    let mut added = 0;

    for utxo in &record.utxo_list {
        let known = stored
            .utxo_list
            .iter()
            .any(|entry| entry.tx_id == utxo.tx_id && entry.vout == utxo.vout);
        if !known {
            stored.utxo_list.push(utxo.clone());
            added += 1;
        }
    }

    added
}
