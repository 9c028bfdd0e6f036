//! Decoding of hex-encoded signed transactions.
//!
//! Only what the ledger needs is exposed: the outputs each input consumes
//! and the amount and destination script of each new output.

pub mod encoding;
#[cfg(test)]
mod tests;
pub mod transaction;

pub use encoding::StructureError;
pub use transaction::{Hash, OutPoint, SerializeType, Transaction, TxIn, TxOut};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EncodingError {
    #[error("odd hex length: {0}")]
    OddLength(usize),
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("malformed encoding: {0}")]
    MalformedEncoding(#[from] EncodingError),
    #[error("malformed structure: {0}")]
    MalformedStructure(#[from] StructureError),
}

/// Parse a hex-encoded serialized transaction.
pub fn decode(raw_hex: &str) -> Result<Transaction, DecodeError> {
    if raw_hex.len() % 2 != 0 {
        return Err(EncodingError::OddLength(raw_hex.len()).into());
    }

    let bytes = hex::decode(raw_hex).map_err(EncodingError::Hex)?;

    Ok(Transaction::deserialize(&bytes)?)
}

/// Hex encoding of `tx`, the inverse of [`decode`].
pub fn encode(tx: &Transaction) -> String {
    hex::encode(tx.serialize())
}
