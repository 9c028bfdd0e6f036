use async_trait::async_trait;

/// Chain height cursor the lock thresholds are compared against.
#[async_trait]
pub trait Storage: Send + Sync {
    type InternalError: std::error::Error + Send + Sync + 'static;

    /// `None` until the first height has been recorded.
    async fn get_height(&self) -> Result<Option<u64>, Self::InternalError>;

    async fn update_height(&self, height: u64) -> Result<(), Self::InternalError>;
}
