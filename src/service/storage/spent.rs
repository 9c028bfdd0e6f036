use async_trait::async_trait;

use crate::types::SpentUtxo;

/// What a [`merge_spent_utxo`](Storage::merge_spent_utxo) call changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Merge {
    /// No record existed under the id before this call.
    pub created: bool,
    /// Entries appended, not counting ones already present by `(tx_id, vout)`.
    pub added: usize,
}

impl Merge {
    pub fn changed(&self) -> bool {
        self.created || self.added > 0
    }
}

#[async_trait]
pub trait Storage: Send + Sync {
    type InternalError: std::error::Error + Send + Sync + 'static;

    /// Store the audit record for `record.spent_tx_id`, or extend the stored
    /// one with the entries of `record` it lacks. Entries are keyed by
    /// `(tx_id, vout)` and never duplicated or replaced.
    async fn merge_spent_utxo(&self, record: &SpentUtxo) -> Result<Merge, Self::InternalError>;

    async fn get_spent_utxo(
        &self,
        spent_tx_id: &str,
    ) -> Result<Option<SpentUtxo>, Self::InternalError>;
}
