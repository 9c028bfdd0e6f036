use std::time::Duration;

/// `Gateway` submits signed transactions to the network.
///
/// Submission is at-most-once from the ledger's side: the service never
/// retries, a failed or timed out call is reported to the caller.
#[async_trait::async_trait]
pub trait Gateway: Send + Sync {
    type InternalError: std::error::Error + Send + Sync + 'static;

    /// Submit a hex-encoded signed transaction and return the id the network
    /// assigned to it.
    async fn submit(&self, raw_tx: &str) -> Result<String, Self::InternalError>;
}

#[derive(thiserror::Error, Debug)]
pub enum BroadcastError<GE>
where
    GE: std::error::Error + 'static,
{
    #[error("transaction rejected: {0}")]
    Rejected(GE),
    #[error("broadcast timed out after {0:?}")]
    Timeout(Duration),
}
