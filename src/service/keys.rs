//! Collaborators for key generation and administrative signing. Neither is on
//! the reconciliation path; their failures are reported, never dropped.

use super::error::ErrorCategory;
use super::request::SignTransactionRequest;
use crate::types::DEFAULT_COIN;

const SIGNED_TX_VERSION: u32 = 1;
const SIGNED_TX_LOCK_TIME: u32 = 0;

pub trait KeyGenerator {
    type Error: std::error::Error + 'static;

    /// Fresh `(private_key, public_key)` pair, hex encoded.
    fn generate_key_pair(&self) -> Result<(String, String), Self::Error>;

    fn derive_public_key(&self, private_key: &str) -> Result<String, Self::Error>;

    fn derive_address(&self, public_key: &str, network: &str) -> Result<String, Self::Error>;
}

/// Reference to the output a signed input spends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRef {
    pub tx_id: String,
    pub index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    pub address: String,
    pub amount: u64,
}

pub trait TransactionSigner {
    type Error: std::error::Error + 'static;

    /// Build an unsigned transaction template.
    fn encode_transaction(
        &self,
        version: u32,
        lock_time: u32,
        inputs: &[InputRef],
        outputs: &[Payment],
        coin: &str,
    ) -> Result<String, Self::Error>;

    /// Sign `template`, returning the hex-encoded raw transaction.
    fn sign_transaction(
        &self,
        template: &str,
        private_keys: &[String],
        network: &str,
        pk_scripts: &[String],
    ) -> Result<String, Self::Error>;
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedAddress {
    pub address: String,
    #[cfg_attr(feature = "serde", serde(rename = "ecPrivate"))]
    pub private_key: String,
    #[cfg_attr(feature = "serde", serde(rename = "ecPublic"))]
    pub public_key: String,
}

pub fn generate_address<K: KeyGenerator>(
    keys: &K,
    network: &str,
) -> Result<GeneratedAddress, KeyError<K::Error>> {
    let (private_key, public_key) = keys.generate_key_pair().map_err(KeyError::Generate)?;

    let derived = keys
        .derive_public_key(&private_key)
        .map_err(KeyError::DerivePublicKey)?;
    if derived != public_key {
        return Err(KeyError::PublicKeyMismatch);
    }

    let address = keys
        .derive_address(&public_key, network)
        .map_err(KeyError::DeriveAddress)?;

    Ok(GeneratedAddress {
        address,
        private_key,
        public_key,
    })
}

pub fn sign_transaction<T: TransactionSigner>(
    signer: &T,
    request: &SignTransactionRequest,
    network: &str,
) -> Result<String, SignError<T::Error>> {
    let inputs = [InputRef {
        tx_id: request.input_tx_id.clone(),
        index: request.input_index,
    }];
    let outputs = [Payment {
        address: request.output_address.clone(),
        amount: request.output_amount,
    }];

    let template = signer
        .encode_transaction(
            SIGNED_TX_VERSION,
            SIGNED_TX_LOCK_TIME,
            &inputs,
            &outputs,
            DEFAULT_COIN,
        )
        .map_err(SignError::Encode)?;

    signer
        .sign_transaction(
            &template,
            &[request.private_key.clone()],
            network,
            &[request.pk_script.clone()],
        )
        .map_err(SignError::Sign)
}

#[derive(thiserror::Error, Debug)]
pub enum KeyError<E>
where
    E: std::error::Error + 'static,
{
    #[error("failed to generate key pair: {0}")]
    Generate(E),
    #[error("failed to derive public key: {0}")]
    DerivePublicKey(E),
    #[error("derived public key does not match the generated one")]
    PublicKeyMismatch,
    #[error("failed to derive address: {0}")]
    DeriveAddress(E),
}

impl<E: std::error::Error + 'static> KeyError<E> {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::Collaborator
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SignError<E>
where
    E: std::error::Error + 'static,
{
    #[error("failed to encode transaction: {0}")]
    Encode(E),
    #[error("failed to sign transaction: {0}")]
    Sign(E),
}

impl<E: std::error::Error + 'static> SignError<E> {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::Collaborator
    }
}
