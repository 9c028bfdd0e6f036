//! Splitting an address' outputs into available, locked and spent at a given
//! chain height. The three parts are disjoint and together cover every record.

use crate::types::{Utxo, UtxoState};

/// Records of one state together with the sum of their amounts.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub utxos: Vec<Utxo>,
    /// Sum of `utxos` amounts, clamped at `u64::MAX`. A clamped sum means the
    /// stored amounts exceed any valid supply; [`Balances::total`] reports it.
    pub amount: u64,
}

impl Partition {
    fn push(&mut self, utxo: Utxo) {
        self.amount = self.amount.saturating_add(utxo.amount);
        self.utxos.push(utxo);
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Balances {
    pub height: u64,
    pub available: Partition,
    pub locked: Partition,
    pub spent: Partition,
}

impl Balances {
    /// `available + locked + spent`, the amount ever received. `None` when
    /// the sum does not fit in a `u64`, including when a partition clamped.
    pub fn total(&self) -> Option<u64> {
        [&self.available, &self.locked, &self.spent]
            .into_iter()
            .try_fold(0u64, |total, part| {
                let exact: u64 = part
                    .utxos
                    .iter()
                    .try_fold(0u64, |sum, utxo| sum.checked_add(utxo.amount))?;
                total.checked_add(exact)
            })
    }
}

pub fn partition(utxos: impl IntoIterator<Item = Utxo>, height: u64) -> Balances {
    let mut balances = Balances {
        height,
        ..Default::default()
    };

    for utxo in utxos {
        match utxo.state_at(height) {
            UtxoState::Available => balances.available.push(utxo),
            UtxoState::Locked => balances.locked.push(utxo),
            UtxoState::Spent => balances.spent.push(utxo),
        }
    }

    balances
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;
    use crate::types::DEFAULT_COIN;

    fn utxo(vout: u64, amount: u64, lock: u64, spent: &str) -> Utxo {
        let mut utxo = Utxo::new("t1", vout, "addr", DEFAULT_COIN, amount).with_lock(lock);
        utxo.spent = spent.to_string();
        utxo
    }

    #[test]
    fn zero_lock_is_always_available() {
        for height in [0, 1, 10, u64::MAX] {
            let balances = partition(vec![utxo(0, 7, 0, "")], height);

            assert_eq!(balances.available.amount, 7);
            assert_eq!(balances.locked.amount, 0);
        }
    }

    #[test]
    fn lock_releases_at_lock_height() {
        let utxos = vec![utxo(0, 5, 100, "")];

        assert_eq!(partition(utxos.clone(), 99).locked.amount, 5);
        assert_eq!(partition(utxos.clone(), 100).available.amount, 5);
        assert_eq!(partition(utxos, 100).locked.amount, 0);
    }

    #[test]
    fn partitions_conserve_total() {
        let mut rng = rand::thread_rng();

        for _ in 0..50 {
            let count = rng.gen_range(0..40);
            let utxos: Vec<Utxo> = (0..count)
                .map(|vout| {
                    let spent = if rng.gen_bool(0.3) { "t2" } else { "" };
                    utxo(vout, rng.gen_range(0..1_000_000), rng.gen_range(0..200), spent)
                })
                .collect();
            let expected: u64 = utxos.iter().map(|u| u.amount).sum();
            let height = rng.gen_range(0..200);

            let balances = partition(utxos.clone(), height);

            assert_eq!(balances.total(), Some(expected));
            assert_eq!(
                balances.available.utxos.len()
                    + balances.locked.utxos.len()
                    + balances.spent.utxos.len(),
                utxos.len()
            );
        }
    }

    #[test]
    fn overflowing_amounts_clamp_and_total_reports_it() {
        let balances = partition(
            vec![utxo(0, u64::MAX, 0, ""), utxo(1, 1, 0, ""), utxo(2, 3, 0, "t2")],
            10,
        );

        assert_eq!(balances.available.amount, u64::MAX);
        assert_eq!(balances.spent.amount, 3);
        assert_eq!(balances.total(), None);
    }
}
