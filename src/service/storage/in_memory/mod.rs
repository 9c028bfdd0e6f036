pub mod addresses;
pub mod chain;
pub mod spent;
pub mod utxos;

use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    sync::Arc,
};

use tokio::sync::Mutex;

use crate::types::{SpentUtxo, Utxo};

/// `(tx_id, vout)`
pub type UtxoKey = (String, u64);

/// Storage that keeps everything in process memory. Clones share the same
/// maps, so a clone handed to the service and one kept by a test observe the
/// same state.
#[derive(Clone, Default)]
pub struct MapStorage {
    utxos: Arc<Mutex<BTreeMap<UtxoKey, Utxo>>>,
    addresses: Arc<Mutex<BTreeSet<String>>>,
    spent: Arc<Mutex<HashMap<String, SpentUtxo>>>,
    height: Arc<Mutex<Option<u64>>>,
}

impl MapStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every stored output, ordered by key.
    pub async fn snapshot(&self) -> Vec<Utxo> {
        self.utxos.lock().await.values().cloned().collect()
    }

    pub async fn spent_records(&self) -> usize {
        self.spent.lock().await.len()
    }
}

#[derive(thiserror::Error, Debug)]
pub enum InternalError {}

impl super::Storage for MapStorage {
    type InternalError = InternalError;
}
