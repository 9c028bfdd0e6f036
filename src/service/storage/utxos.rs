use async_trait::async_trait;

use crate::service::balance::{self, Partition};
use crate::service::error::ErrorCategory;
use crate::types::Utxo;

#[async_trait]
pub trait Storage: Send + Sync {
    type InternalError: std::error::Error + Send + Sync + 'static;

    /// Record an output the ledger has just learned about.
    async fn insert_utxo(&self, utxo: &Utxo) -> Result<(), InsertError<Self::InternalError>>;

    async fn get_utxo(&self, tx_id: &str, vout: u64)
        -> Result<Option<Utxo>, Self::InternalError>;

    /// Same as [`get_utxo`](Storage::get_utxo) but only matches records owned
    /// by `address`.
    async fn get_address_utxo(
        &self,
        address: &str,
        tx_id: &str,
        vout: u64,
    ) -> Result<Option<Utxo>, Self::InternalError>;

    /// Every record of `address` in `coin`, whatever its state.
    async fn get_address_coin_utxos(
        &self,
        address: &str,
        coin: &str,
    ) -> Result<Vec<Utxo>, Self::InternalError>;

    /// Every record whose `spent` equals `spent_tx_id`.
    async fn get_utxos_spent_by(&self, spent_tx_id: &str)
        -> Result<Vec<Utxo>, Self::InternalError>;

    /// Distinct non-empty `spent` values across all records.
    async fn get_spending_tx_ids(&self) -> Result<Vec<String>, Self::InternalError>;

    /// Best-effort upsert, used to mark an output spent after a confirmed
    /// broadcast.
    ///
    /// An absent record is created from `utxo`. An existing record keeps its
    /// amount, coin and lock; only `spent` is taken from `utxo`, and only when
    /// the stored value is empty or already equal. Returns the stored record.
    async fn update_address_utxo(
        &self,
        address: &str,
        utxo: &Utxo,
    ) -> Result<Utxo, UpdateError<Self::InternalError>>;

    /// Strict update for manual corrections. The record must already exist.
    /// Address, coin, amount and lock are overwritten; `spent` follows the
    /// same set-once rule as [`update_address_utxo`](Storage::update_address_utxo).
    async fn update_address_utxo_mandatory(
        &self,
        address: &str,
        utxo: &Utxo,
    ) -> Result<Utxo, UpdateError<Self::InternalError>>;

    /// Unspent and unlocked records at `height` with their total.
    async fn get_address_utxos(
        &self,
        address: &str,
        coin: &str,
        height: u64,
    ) -> Result<Partition, Self::InternalError> {
        let utxos = self.get_address_coin_utxos(address, coin).await?;

        Ok(balance::partition(utxos, height).available)
    }

    /// Unspent records still locked at `height` with their total.
    async fn get_address_lock_utxos(
        &self,
        address: &str,
        coin: &str,
        height: u64,
    ) -> Result<Partition, Self::InternalError> {
        let utxos = self.get_address_coin_utxos(address, coin).await?;

        Ok(balance::partition(utxos, height).locked)
    }

    async fn get_address_spent_utxos(
        &self,
        address: &str,
        coin: &str,
    ) -> Result<Partition, Self::InternalError> {
        let utxos = self.get_address_coin_utxos(address, coin).await?;

        // spent records do not depend on height
        Ok(balance::partition(utxos, 0).spent)
    }
}

/// Checks the set-once rule for `spent` and returns the value to store.
pub fn next_spent<IE: std::error::Error + 'static>(
    stored: &Utxo,
    incoming: &str,
) -> Result<String, UpdateError<IE>> {
    if stored.spent.is_empty() || stored.spent == incoming {
        return Ok(incoming.to_string());
    }

    Err(UpdateError::SpentConflict {
        tx_id: stored.tx_id.clone(),
        vout: stored.vout,
        spent: stored.spent.clone(),
        attempted: incoming.to_string(),
    })
}

#[derive(thiserror::Error, Debug)]
pub enum InsertError<IE>
where
    IE: std::error::Error + 'static,
{
    #[error("utxo txid={tx_id} vout={vout} already exists")]
    Conflict { tx_id: String, vout: u64 },
    #[error("internal error: {0}")]
    Internal(#[from] IE),
}

#[derive(thiserror::Error, Debug)]
pub enum UpdateError<IE>
where
    IE: std::error::Error + 'static,
{
    #[error("utxo txid={tx_id} vout={vout} not found")]
    NotFound { tx_id: String, vout: u64 },
    #[error("utxo belongs to {found}, not {expected}")]
    AddressMismatch { expected: String, found: String },
    #[error("utxo txid={tx_id} vout={vout} already spent by {spent}, refusing {attempted:?}")]
    SpentConflict {
        tx_id: String,
        vout: u64,
        spent: String,
        attempted: String,
    },
    #[error("internal error: {0}")]
    Internal(#[from] IE),
}

impl<IE> InsertError<IE>
where
    IE: std::error::Error + 'static,
{
    pub fn category(&self) -> ErrorCategory {
        match self {
            InsertError::Conflict { .. } => ErrorCategory::Conflict,
            InsertError::Internal(_) => ErrorCategory::Store,
        }
    }
}

impl<IE> UpdateError<IE>
where
    IE: std::error::Error + 'static,
{
    pub fn category(&self) -> ErrorCategory {
        match self {
            UpdateError::NotFound { .. } => ErrorCategory::NotFound,
            UpdateError::AddressMismatch { .. } | UpdateError::SpentConflict { .. } => {
                ErrorCategory::Conflict
            }
            UpdateError::Internal(_) => ErrorCategory::Store,
        }
    }
}
