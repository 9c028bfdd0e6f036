/// Coin assumed whenever a caller does not name one.
pub const DEFAULT_COIN: &str = "MEER";

#[cfg(feature = "serde")]
fn default_coin() -> String {
    DEFAULT_COIN.to_string()
}

/// One transaction output owned by a tracked address.
///
/// `(tx_id, vout)` identifies the record and never changes. `spent` is empty
/// while the output is unspent and holds the id of the consuming transaction
/// afterwards; once set it is never cleared or reassigned.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utxo {
    #[cfg_attr(feature = "serde", serde(rename = "txid"))]
    pub tx_id: String,
    pub vout: u64,
    pub address: String,
    #[cfg_attr(feature = "serde", serde(default = "default_coin"))]
    pub coin: String,
    pub amount: u64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub spent: String,
    /// Height threshold. The output is locked while the chain height is
    /// strictly below it, `0` means never locked.
    #[cfg_attr(feature = "serde", serde(default))]
    pub lock: u64,
}

impl Utxo {
    pub fn new(
        tx_id: impl Into<String>,
        vout: u64,
        address: impl Into<String>,
        coin: impl Into<String>,
        amount: u64,
    ) -> Self {
        Self {
            tx_id: tx_id.into(),
            vout,
            address: address.into(),
            coin: coin.into(),
            amount,
            spent: String::new(),
            lock: 0,
        }
    }

    pub fn with_lock(mut self, lock: u64) -> Self {
        self.lock = lock;
        self
    }

    pub fn is_spent(&self) -> bool {
        !self.spent.is_empty()
    }

    pub fn is_locked_at(&self, height: u64) -> bool {
        self.lock > height
    }

    /// Where the output falls at the given chain height.
    pub fn state_at(&self, height: u64) -> UtxoState {
        if self.is_spent() {
            UtxoState::Spent
        } else if self.is_locked_at(height) {
            UtxoState::Locked
        } else {
            UtxoState::Available
        }
    }
}

/// Derived state of a [`Utxo`]. Only `Spent` is stored; locked vs available
/// moves with the chain height.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UtxoState {
    Available,
    Locked,
    Spent,
}

/// Audit record grouping every output consumed by one transaction.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpentUtxo {
    #[cfg_attr(feature = "serde", serde(rename = "spentTxId"))]
    pub spent_tx_id: String,
    /// Snapshots of the consumed outputs taken after they were marked spent.
    #[cfg_attr(feature = "serde", serde(rename = "utxoList"))]
    pub utxo_list: Vec<Utxo>,
}

impl SpentUtxo {
    pub fn new(spent_tx_id: impl Into<String>, utxo_list: Vec<Utxo>) -> Self {
        Self {
            spent_tx_id: spent_tx_id.into(),
            utxo_list,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_boundary_is_inclusive_of_lock_height() {
        let utxo = Utxo::new("t1", 0, "addr", DEFAULT_COIN, 10).with_lock(100);

        assert_eq!(utxo.state_at(99), UtxoState::Locked);
        assert_eq!(utxo.state_at(100), UtxoState::Available);
        assert_eq!(utxo.state_at(101), UtxoState::Available);
    }

    #[test]
    fn spent_wins_over_lock() {
        let mut utxo = Utxo::new("t1", 0, "addr", DEFAULT_COIN, 10).with_lock(100);
        utxo.spent = "t2".into();

        assert_eq!(utxo.state_at(0), UtxoState::Spent);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn client_list_defaults_missing_fields() {
        let utxos: Vec<Utxo> =
            serde_json::from_str(r#"[{"txid":"t1","vout":1,"address":"a","amount":5}]"#)
                .unwrap();

        assert_eq!(utxos[0].coin, DEFAULT_COIN);
        assert!(utxos[0].spent.is_empty());
        assert_eq!(utxos[0].lock, 0);
    }
}
