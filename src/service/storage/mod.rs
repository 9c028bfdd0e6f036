pub mod addresses;
pub mod chain;
pub mod in_memory;
pub mod spent;
pub mod utxos;

/// Everything the ledger persists: outputs, tracked addresses, spent audit
/// records and the chain height cursor.
///
/// There is no transaction spanning several records. Operations that touch
/// more than one record are ordered so an interrupted call can be completed
/// later, see [`Service::recover_all`](crate::service::Service::recover_all).
pub trait Storage:
    utxos::Storage<InternalError = <Self as Storage>::InternalError>
    + addresses::Storage<InternalError = <Self as Storage>::InternalError>
    + spent::Storage<InternalError = <Self as Storage>::InternalError>
    + chain::Storage<InternalError = <Self as Storage>::InternalError>
    + Sync
    + Send
{
    type InternalError: std::error::Error + Send + Sync + 'static;
}
