use async_trait::async_trait;

use crate::service::error::ErrorCategory;

#[async_trait]
pub trait Storage: Send + Sync {
    type InternalError: std::error::Error + Send + Sync + 'static;

    /// Start tracking `address`.
    async fn insert_address(&self, address: &str) -> Result<(), InsertError<Self::InternalError>>;

    async fn get_addresses(&self) -> Result<Vec<String>, Self::InternalError>;
}

#[derive(thiserror::Error, Debug)]
pub enum InsertError<IE>
where
    IE: std::error::Error + 'static,
{
    #[error("address {0} is already tracked")]
    AlreadyExists(String),
    #[error("internal error: {0}")]
    Internal(#[from] IE),
}

impl<IE> InsertError<IE>
where
    IE: std::error::Error + 'static,
{
    pub fn category(&self) -> ErrorCategory {
        match self {
            InsertError::AlreadyExists(_) => ErrorCategory::Conflict,
            InsertError::Internal(_) => ErrorCategory::Store,
        }
    }
}
