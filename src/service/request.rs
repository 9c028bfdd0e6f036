//! Validated request structures.
//!
//! Transports hand over string-keyed parameters; each request type checks
//! required fields and parses integers here, before anything reaches the
//! storage or the network.

use std::collections::HashMap;
use std::str::FromStr;

use super::error::ErrorCategory;
use crate::types::{Utxo, DEFAULT_COIN};

/// Raw form or query parameters as received by the transport.
pub type Params = HashMap<String, String>;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("wrong {field}: {value:?}")]
    InvalidInteger { field: &'static str, value: String },
    #[error("spent list entry {index}: {field} is required")]
    IncompleteUtxo { index: usize, field: &'static str },
    #[cfg(feature = "serde")]
    #[error("wrong spent list: {0}")]
    InvalidSpentList(#[from] serde_json::Error),
}

impl ValidationError {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::Validation
    }
}

fn optional<'a>(params: &'a Params, field: &'static str) -> Option<&'a str> {
    params
        .get(field)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

fn required<'a>(params: &'a Params, field: &'static str) -> Result<&'a str, ValidationError> {
    optional(params, field).ok_or(ValidationError::Missing(field))
}

fn integer<T: FromStr>(params: &Params, field: &'static str) -> Result<T, ValidationError> {
    let value = required(params, field)?;

    value
        .parse()
        .map_err(|_| ValidationError::InvalidInteger {
            field,
            value: value.to_string(),
        })
}

fn coin_or_default(coin: Option<&str>) -> String {
    coin.filter(|coin| !coin.is_empty())
        .unwrap_or(DEFAULT_COIN)
        .to_string()
}

/// Balance and list queries for one address and coin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtxoQuery {
    pub address: String,
    pub coin: String,
}

impl UtxoQuery {
    pub fn new(address: impl Into<String>, coin: Option<&str>) -> Self {
        Self {
            address: address.into(),
            coin: coin_or_default(coin),
        }
    }

    pub fn from_params(params: &Params) -> Result<Self, ValidationError> {
        Ok(Self::new(
            required(params, "address")?,
            optional(params, "coin"),
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressUtxoQuery {
    pub address: String,
    pub tx_id: String,
    pub vout: u64,
}

impl AddressUtxoQuery {
    pub fn from_params(params: &Params) -> Result<Self, ValidationError> {
        Ok(Self {
            address: required(params, "address")?.to_string(),
            tx_id: required(params, "txid")?.to_string(),
            vout: integer(params, "vout")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddAddressRequest {
    pub address: String,
}

impl AddAddressRequest {
    pub fn from_params(params: &Params) -> Result<Self, ValidationError> {
        Ok(Self {
            address: required(params, "address")?.to_string(),
        })
    }
}

/// Manual correction of a stored output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateUtxoRequest {
    pub utxo: Utxo,
}

impl UpdateUtxoRequest {
    pub fn from_params(params: &Params) -> Result<Self, ValidationError> {
        let tx_id = required(params, "txid")?;
        let vout = integer(params, "vout")?;
        let amount = integer(params, "amount")?;
        let coin = required(params, "coin")?;
        let lock = integer(params, "lock")?;
        let address = required(params, "address")?;

        let mut utxo = Utxo::new(tx_id, vout, address, coin, amount).with_lock(lock);
        utxo.spent = optional(params, "spent").unwrap_or_default().to_string();

        Ok(Self { utxo })
    }
}

/// Broadcast a transaction and mark the outputs the caller lists as spent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendTransactionRequest {
    pub raw: String,
    pub spent: Vec<Utxo>,
}

impl SendTransactionRequest {
    pub fn new(raw: impl Into<String>, spent: Vec<Utxo>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(ValidationError::Missing("raw"));
        }

        for (index, utxo) in spent.iter().enumerate() {
            if utxo.tx_id.is_empty() {
                return Err(ValidationError::IncompleteUtxo {
                    index,
                    field: "txid",
                });
            }
            if utxo.address.is_empty() {
                return Err(ValidationError::IncompleteUtxo {
                    index,
                    field: "address",
                });
            }
        }

        Ok(Self { raw, spent })
    }

    /// `spent` holds the client-serialized JSON list of outputs.
    #[cfg(feature = "serde")]
    pub fn from_params(params: &Params) -> Result<Self, ValidationError> {
        let raw = required(params, "raw")?;
        let spent = params
            .get("spent")
            .ok_or(ValidationError::Missing("spent"))?;
        let spent: Vec<Utxo> = serde_json::from_str(spent)?;

        Self::new(raw, spent)
    }
}

/// Broadcast a transaction and derive the spent outputs from its inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendRawTransactionRequest {
    pub raw: String,
}

impl SendRawTransactionRequest {
    pub fn from_params(params: &Params) -> Result<Self, ValidationError> {
        Ok(Self {
            raw: required(params, "raw")?.to_string(),
        })
    }
}

/// Single-input, single-output transaction signed by an operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignTransactionRequest {
    pub input_tx_id: String,
    pub input_index: u32,
    pub pk_script: String,
    pub output_address: String,
    pub output_amount: u64,
    pub private_key: String,
}

impl SignTransactionRequest {
    pub fn from_params(params: &Params) -> Result<Self, ValidationError> {
        Ok(Self {
            input_tx_id: required(params, "input")?.to_string(),
            input_index: integer(params, "inputValue")?,
            pk_script: required(params, "pkHex")?.to_string(),
            output_address: required(params, "output")?.to_string(),
            output_amount: integer(params, "outputValue")?,
            private_key: required(params, "key")?.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn query_defaults_coin() {
        let query = UtxoQuery::from_params(&params(&[("address", "a"), ("coin", "")])).unwrap();

        assert_eq!(query.coin, DEFAULT_COIN);
    }

    #[test]
    fn query_requires_address() {
        let err = UtxoQuery::from_params(&params(&[("coin", "MEER")])).unwrap_err();

        assert!(matches!(err, ValidationError::Missing("address")));
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[test]
    fn update_rejects_negative_and_overflowing_integers() {
        let base = [
            ("txid", "t1"),
            ("vout", "0"),
            ("amount", "10"),
            ("coin", "MEER"),
            ("lock", "0"),
            ("address", "a"),
        ];

        for (field, bad) in [
            ("vout", "-1"),
            ("amount", "18446744073709551616"),
            ("lock", "ten"),
        ] {
            let mut p = params(&base);
            p.insert(field.to_string(), bad.to_string());

            let err = UpdateUtxoRequest::from_params(&p).unwrap_err();
            assert!(
                matches!(err, ValidationError::InvalidInteger { field: f, .. } if f == field),
                "{field}: {err}"
            );
        }
    }

    #[test]
    fn update_requires_lock() {
        let p = params(&[
            ("txid", "t1"),
            ("vout", "0"),
            ("amount", "10"),
            ("coin", "MEER"),
            ("address", "a"),
        ]);

        assert!(matches!(
            UpdateUtxoRequest::from_params(&p).unwrap_err(),
            ValidationError::Missing("lock")
        ));
    }

    #[test]
    fn update_builds_record() {
        let p = params(&[
            ("txid", "t1"),
            ("vout", "2"),
            ("amount", "10"),
            ("coin", "MEER"),
            ("lock", "7"),
            ("address", "a"),
        ]);

        let request = UpdateUtxoRequest::from_params(&p).unwrap();

        assert_eq!(
            request.utxo,
            Utxo::new("t1", 2, "a", "MEER", 10).with_lock(7)
        );
    }

    #[test]
    fn send_rejects_incomplete_entries() {
        let mut utxo = Utxo::new("t1", 0, "", DEFAULT_COIN, 1);

        let err = SendTransactionRequest::new("00", vec![utxo.clone()]).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::IncompleteUtxo {
                index: 0,
                field: "address"
            }
        ));

        utxo.address = "a".into();
        assert!(SendTransactionRequest::new("", vec![utxo]).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn send_parses_spent_list() {
        let p = params(&[
            ("raw", "00"),
            (
                "spent",
                r#"[{"txid":"t1","vout":0,"address":"a","coin":"MEER","amount":5,"spent":"","lock":0}]"#,
            ),
        ]);

        let request = SendTransactionRequest::from_params(&p).unwrap();

        assert_eq!(request.spent, vec![Utxo::new("t1", 0, "a", "MEER", 5)]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn send_rejects_bad_json() {
        let p = params(&[("raw", "00"), ("spent", "[{")]);

        assert!(matches!(
            SendTransactionRequest::from_params(&p).unwrap_err(),
            ValidationError::InvalidSpentList(_)
        ));
    }

    #[test]
    fn sign_request_parses_numbers() {
        let p = params(&[
            ("input", "t1"),
            ("inputValue", "1"),
            ("pkHex", "76a9"),
            ("output", "a"),
            ("outputValue", "100"),
            ("key", "k"),
        ]);

        let request = SignTransactionRequest::from_params(&p).unwrap();

        assert_eq!(request.input_index, 1);
        assert_eq!(request.output_amount, 100);
    }
}
