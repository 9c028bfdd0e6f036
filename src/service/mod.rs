pub mod balance;
pub mod config;
pub mod error;
pub mod gateway;
pub mod keys;
pub mod request;
pub mod storage;

use std::collections::HashSet;

use crate::tx::{self, DecodeError, TxIn};
use crate::types::{SpentUtxo, Utxo};

use self::{
    balance::{Balances, Partition},
    config::Config,
    error::ErrorCategory,
    gateway::BroadcastError,
    keys::{GeneratedAddress, KeyError, KeyGenerator, SignError, TransactionSigner},
    request::{
        AddAddressRequest, AddressUtxoQuery, SendRawTransactionRequest, SendTransactionRequest,
        SignTransactionRequest, UpdateUtxoRequest, UtxoQuery,
    },
    storage::{addresses, utxos},
};

type StorageError<S> = <S as storage::Storage>::InternalError;
type GatewayError<G> = <G as gateway::Gateway>::InternalError;

/// Ledger of outputs for tracked addresses, reconciled against the
/// transactions submitted through the gateway.
pub struct Service<S, G>
where
    S: storage::Storage,
    G: gateway::Gateway,
{
    storage: S,
    gateway: G,
    config: Config,
}

/// What a successful submission did to the ledger.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Id the gateway assigned to the transaction.
    pub tx_id: String,
    /// Outputs now marked spent by `tx_id`, as stored.
    pub spent: Vec<Utxo>,
    /// Inputs that reference outputs the ledger does not hold.
    pub skipped: Vec<(String, u64)>,
    /// Whether this call wrote to the spent audit record. `false` when an
    /// earlier call or a recovery pass already recorded every output.
    pub recorded: bool,
}

enum InputOutcome {
    Marked(Utxo),
    Skipped { tx_id: String, vout: u64 },
}

impl<S, G> Service<S, G>
where
    S: storage::Storage,
    G: gateway::Gateway,
{
    pub fn new(storage: S, gateway: G) -> Self {
        Self::with_config(storage, gateway, Config::default())
    }

    pub fn with_config(storage: S, gateway: G, config: Config) -> Self {
        Self {
            storage,
            gateway,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Broadcast `request.raw` and mark every listed output spent by the
    /// resulting transaction.
    pub async fn send_transaction(
        &self,
        request: &SendTransactionRequest,
    ) -> Result<Reconciliation, SendTransactionError<GatewayError<G>, StorageError<S>>> {
        let tx_id = self.broadcast(&request.raw).await?;

        let mut seen = HashSet::new();
        let mut spent = Vec::with_capacity(request.spent.len());
        for utxo in &request.spent {
            if !seen.insert((utxo.tx_id.as_str(), utxo.vout)) {
                continue;
            }

            let stored = self
                .mark_spent(utxo, &tx_id)
                .await
                .map_err(|source| reconcile_failed(&tx_id, source))?;

            spent.push(stored);
        }

        let recorded = self
            .record_spent(&tx_id, &spent)
            .await
            .map_err(|source| reconcile_failed(&tx_id, source))?;

        Ok(Reconciliation {
            tx_id,
            spent,
            skipped: Vec::new(),
            recorded,
        })
    }

    /// Decode `request.raw`, broadcast it, then mark spent every stored output
    /// its inputs consume. Inputs the ledger does not know are skipped.
    pub async fn send_transaction_v2(
        &self,
        request: &SendRawTransactionRequest,
    ) -> Result<Reconciliation, SendTransactionError<GatewayError<G>, StorageError<S>>> {
        let tx = tx::decode(&request.raw)?;

        let tx_id = self.broadcast(&request.raw).await?;

        let mut seen = HashSet::new();
        let mut spent = Vec::with_capacity(tx.inputs.len());
        let mut skipped = Vec::new();
        for input in &tx.inputs {
            if !seen.insert(&input.previous_out) {
                log::debug!(
                    "outpoint {}:{} listed twice in {}",
                    input.previous_out.hash,
                    input.previous_out.index,
                    tx_id
                );
                continue;
            }

            match self
                .resolve_input(input, &tx_id)
                .await
                .map_err(|source| reconcile_failed(&tx_id, source))?
            {
                InputOutcome::Marked(utxo) => spent.push(utxo),
                InputOutcome::Skipped { tx_id: previous, vout } => skipped.push((previous, vout)),
            }
        }

        let recorded = self
            .record_spent(&tx_id, &spent)
            .await
            .map_err(|source| reconcile_failed(&tx_id, source))?;

        Ok(Reconciliation {
            tx_id,
            spent,
            skipped,
            recorded,
        })
    }

    async fn broadcast(&self, raw: &str) -> Result<String, BroadcastError<GatewayError<G>>> {
        let timeout = self.config.broadcast_timeout;

        match tokio::time::timeout(timeout, self.gateway.submit(raw)).await {
            Ok(Ok(tx_id)) => {
                log::info!("transaction {} accepted", tx_id);
                Ok(tx_id)
            }
            Ok(Err(err)) => {
                log::error!("transaction rejected: {}", err);
                Err(BroadcastError::Rejected(err))
            }
            Err(_) => {
                log::error!("transaction broadcast timed out after {:?}", timeout);
                Err(BroadcastError::Timeout(timeout))
            }
        }
    }

    async fn resolve_input(
        &self,
        input: &TxIn,
        spent_tx_id: &str,
    ) -> Result<InputOutcome, ReconcileError<StorageError<S>>> {
        let tx_id = input.previous_out.hash.to_string();
        let vout = u64::from(input.previous_out.index);

        let utxo = utxos::Storage::get_utxo(&self.storage, &tx_id, vout)
            .await
            .map_err(ReconcileError::Lookup)?;

        let Some(utxo) = utxo else {
            log::warn!("can not find txid={} vout={}, skipping", tx_id, vout);
            return Ok(InputOutcome::Skipped { tx_id, vout });
        };

        Ok(InputOutcome::Marked(self.mark_spent(&utxo, spent_tx_id).await?))
    }

    async fn mark_spent(
        &self,
        utxo: &Utxo,
        spent_tx_id: &str,
    ) -> Result<Utxo, ReconcileError<StorageError<S>>> {
        let mut marked = utxo.clone();
        marked.spent = spent_tx_id.to_string();

        let stored = self
            .storage
            .update_address_utxo(&utxo.address, &marked)
            .await?;

        log::debug!(
            "update txid={} vout={} spent by {}",
            stored.tx_id,
            stored.vout,
            spent_tx_id
        );

        Ok(stored)
    }

    async fn record_spent(
        &self,
        spent_tx_id: &str,
        spent: &[Utxo],
    ) -> Result<bool, ReconcileError<StorageError<S>>> {
        let merge = self
            .storage
            .merge_spent_utxo(&SpentUtxo::new(spent_tx_id, spent.to_vec()))
            .await
            .map_err(ReconcileError::SpentRecord)?;

        Ok(merge.changed())
    }

    /// Bring the audit record for `spent_tx_id` in line with the outputs marked
    /// spent by it, as needed after an interrupted reconciliation. Returns the
    /// outputs marked by `spent_tx_id` when the record had to change.
    pub async fn recover_spent_record(
        &self,
        spent_tx_id: &str,
    ) -> Result<Option<SpentUtxo>, RecoverError<StorageError<S>>> {
        let spent = self
            .storage
            .get_utxos_spent_by(spent_tx_id)
            .await
            .map_err(RecoverError::Storage)?;
        if spent.is_empty() {
            return Ok(None);
        }

        let record = SpentUtxo::new(spent_tx_id, spent);
        let merge = self
            .storage
            .merge_spent_utxo(&record)
            .await
            .map_err(RecoverError::Storage)?;
        if !merge.changed() {
            return Ok(None);
        }

        log::info!(
            "recovered spent record for {}, {} outputs added",
            spent_tx_id,
            merge.added
        );

        Ok(Some(record))
    }

    /// [`recover_spent_record`](Self::recover_spent_record) for every
    /// transaction that has spent a stored output.
    pub async fn recover_all(&self) -> Result<Vec<SpentUtxo>, RecoverError<StorageError<S>>> {
        let tx_ids = self
            .storage
            .get_spending_tx_ids()
            .await
            .map_err(RecoverError::Storage)?;

        let mut recovered = Vec::new();
        for tx_id in tx_ids {
            if let Some(record) = self.recover_spent_record(&tx_id).await? {
                recovered.push(record);
            }
        }

        Ok(recovered)
    }

    pub async fn get_spent_record(
        &self,
        spent_tx_id: &str,
    ) -> Result<SpentUtxo, GetError<StorageError<S>>> {
        self.storage
            .get_spent_utxo(spent_tx_id)
            .await
            .map_err(GetError::Storage)?
            .ok_or(GetError::NotFound)
    }
}

impl<S, G> Service<S, G>
where
    S: storage::Storage,
    G: gateway::Gateway,
{
    async fn height(&self) -> Result<u64, QueryError<StorageError<S>>> {
        self.storage
            .get_height()
            .await
            .map_err(QueryError::Storage)?
            .ok_or(QueryError::NoHeight)
    }

    /// Spendable outputs at the current height and their total.
    pub async fn get_utxos(
        &self,
        query: &UtxoQuery,
    ) -> Result<Partition, QueryError<StorageError<S>>> {
        let height = self.height().await?;

        self.storage
            .get_address_utxos(&query.address, &query.coin, height)
            .await
            .map_err(QueryError::Storage)
    }

    /// Unspent outputs still locked at the current height and their total.
    pub async fn get_lock_utxos(
        &self,
        query: &UtxoQuery,
    ) -> Result<Partition, QueryError<StorageError<S>>> {
        let height = self.height().await?;

        self.storage
            .get_address_lock_utxos(&query.address, &query.coin, height)
            .await
            .map_err(QueryError::Storage)
    }

    pub async fn get_spent_utxos(
        &self,
        query: &UtxoQuery,
    ) -> Result<Partition, QueryError<StorageError<S>>> {
        self.storage
            .get_address_spent_utxos(&query.address, &query.coin)
            .await
            .map_err(QueryError::Storage)
    }

    /// Available, locked and spent figures from one read at the current height.
    pub async fn balance(&self, query: &UtxoQuery) -> Result<Balances, QueryError<StorageError<S>>> {
        let height = self.height().await?;

        let utxos = self
            .storage
            .get_address_coin_utxos(&query.address, &query.coin)
            .await
            .map_err(QueryError::Storage)?;

        Ok(balance::partition(utxos, height))
    }

    pub async fn get_utxo(
        &self,
        tx_id: &str,
        vout: u64,
    ) -> Result<Utxo, GetError<StorageError<S>>> {
        utxos::Storage::get_utxo(&self.storage, tx_id, vout)
            .await
            .map_err(GetError::Storage)?
            .ok_or(GetError::NotFound)
    }

    pub async fn get_address_utxo(
        &self,
        query: &AddressUtxoQuery,
    ) -> Result<Utxo, GetError<StorageError<S>>> {
        self.storage
            .get_address_utxo(&query.address, &query.tx_id, query.vout)
            .await
            .map_err(GetError::Storage)?
            .ok_or(GetError::NotFound)
    }

    pub async fn add_address(
        &self,
        request: &AddAddressRequest,
    ) -> Result<String, addresses::InsertError<StorageError<S>>> {
        self.storage.insert_address(&request.address).await?;

        Ok(request.address.clone())
    }

    pub async fn get_addresses(&self) -> Result<Vec<String>, QueryError<StorageError<S>>> {
        self.storage
            .get_addresses()
            .await
            .map_err(QueryError::Storage)
    }

    /// Record a newly discovered output.
    pub async fn insert_utxo(&self, utxo: &Utxo) -> Result<(), utxos::InsertError<StorageError<S>>> {
        self.storage.insert_utxo(utxo).await
    }

    /// Manual correction of an existing output.
    pub async fn update_utxo(
        &self,
        request: &UpdateUtxoRequest,
    ) -> Result<Utxo, utxos::UpdateError<StorageError<S>>> {
        self.storage
            .update_address_utxo_mandatory(&request.utxo.address, &request.utxo)
            .await
    }

    /// Advance the height cursor lock thresholds are compared against.
    pub async fn update_height(&self, height: u64) -> Result<(), StorageError<S>> {
        self.storage.update_height(height).await
    }

    pub fn generate_address<K: KeyGenerator>(
        &self,
        keys: &K,
    ) -> Result<GeneratedAddress, KeyError<K::Error>> {
        keys::generate_address(keys, &self.config.network)
    }

    pub fn sign_transaction<T: TransactionSigner>(
        &self,
        signer: &T,
        request: &SignTransactionRequest,
    ) -> Result<String, SignError<T::Error>> {
        keys::sign_transaction(signer, request, &self.config.network)
    }
}

fn reconcile_failed<GE, SE>(tx_id: &str, source: ReconcileError<SE>) -> SendTransactionError<GE, SE>
where
    GE: std::error::Error + 'static,
    SE: std::error::Error + 'static,
{
    log::error!("reconciliation of accepted transaction {} failed: {}", tx_id, source);

    SendTransactionError::Reconcile {
        tx_id: tx_id.to_string(),
        source,
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SendTransactionError<GE, SE>
where
    GE: std::error::Error + 'static,
    SE: std::error::Error + 'static,
{
    #[error("failed to decode transaction: {0}")]
    Decode(#[from] DecodeError),
    #[error("failed to broadcast transaction: {0}")]
    Broadcast(#[from] BroadcastError<GE>),
    #[error("transaction {tx_id} was accepted but reconciliation failed: {source}")]
    Reconcile {
        tx_id: String,
        source: ReconcileError<SE>,
    },
}

impl<GE, SE> SendTransactionError<GE, SE>
where
    GE: std::error::Error + 'static,
    SE: std::error::Error + 'static,
{
    pub fn category(&self) -> ErrorCategory {
        match self {
            SendTransactionError::Decode(_) => ErrorCategory::Decode,
            SendTransactionError::Broadcast(_) => ErrorCategory::Broadcast,
            SendTransactionError::Reconcile { source, .. } => source.category(),
        }
    }
}

/// Failure after the gateway accepted the transaction. Marks already written
/// stay. Calling again for the same transaction, or
/// [`Service::recover_spent_record`], completes the work; both merge into the
/// audit record rather than replace it.
#[derive(thiserror::Error, Debug)]
pub enum ReconcileError<SE>
where
    SE: std::error::Error + 'static,
{
    #[error("failed to look up spent utxo: {0}")]
    Lookup(SE),
    #[error("failed to mark utxo spent: {0}")]
    MarkSpent(#[from] utxos::UpdateError<SE>),
    #[error("failed to store spent record: {0}")]
    SpentRecord(SE),
}

impl<SE> ReconcileError<SE>
where
    SE: std::error::Error + 'static,
{
    pub fn category(&self) -> ErrorCategory {
        match self {
            ReconcileError::MarkSpent(err) => err.category(),
            ReconcileError::Lookup(_) | ReconcileError::SpentRecord(_) => ErrorCategory::Store,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum QueryError<SE>
where
    SE: std::error::Error + 'static,
{
    #[error("no chain height")]
    NoHeight,
    #[error("storage error: {0}")]
    Storage(SE),
}

impl<SE> QueryError<SE>
where
    SE: std::error::Error + 'static,
{
    pub fn category(&self) -> ErrorCategory {
        match self {
            QueryError::NoHeight => ErrorCategory::NoHeight,
            QueryError::Storage(_) => ErrorCategory::Store,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum GetError<SE>
where
    SE: std::error::Error + 'static,
{
    #[error("not found")]
    NotFound,
    #[error("storage error: {0}")]
    Storage(SE),
}

impl<SE> GetError<SE>
where
    SE: std::error::Error + 'static,
{
    pub fn category(&self) -> ErrorCategory {
        match self {
            GetError::NotFound => ErrorCategory::NotFound,
            GetError::Storage(_) => ErrorCategory::Store,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum RecoverError<SE>
where
    SE: std::error::Error + 'static,
{
    #[error("storage error: {0}")]
    Storage(SE),
}

impl<SE> RecoverError<SE>
where
    SE: std::error::Error + 'static,
{
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::Store
    }
}
