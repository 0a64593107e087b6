//! Unspent-set derivation.
//!
//! Spending is tracked per transaction, not per output: a transaction drops
//! out of the set as soon as any stored input references it, whichever
//! output that input claims.

use std::collections::{HashMap, HashSet};

use secp256k1::PublicKey;
use tracing::debug;

use crate::db::TxStorage;
use crate::errors::LedgerResult;
use crate::transactions::{Digest, Tx};
use crate::verifiers::Unlocker;

/// Stored transactions not referenced by any stored input, keyed by digest.
pub type UnspentSet = HashMap<Digest, Tx>;

/// One pass over the store. The result does not depend on the order the
/// store visits transactions in: a digest seen as spent is never inserted,
/// and a later spend removes an earlier insert.
pub fn compute_unspent<S: TxStorage + ?Sized>(store: &S) -> LedgerResult<UnspentSet> {
    let mut unspent = UnspentSet::new();
    let mut spent: HashSet<Digest> = HashSet::new();
    let mut visited = 0usize;

    store.iter(&mut |tx| {
        visited += 1;
        if !spent.contains(&tx.digest()) {
            unspent.insert(tx.digest(), tx.clone());
        }

        if tx.is_base() {
            return Ok(());
        }

        for input in tx.inputs().iter().filter(|input| !input.is_base()) {
            spent.insert(input.prev);
            unspent.remove(&input.prev);
        }
        Ok(())
    })?;

    debug!(visited, unspent = unspent.len(), spent = spent.len(), "computed unspent set");
    Ok(unspent)
}

/// Unspent transactions whose every output `key` can unlock.
pub fn find_unspent_for<S, U>(store: &S, unlocker: &U, key: &PublicKey) -> LedgerResult<UnspentSet>
where
    S: TxStorage + ?Sized,
    U: Unlocker + ?Sized,
{
    let mut unspent = compute_unspent(store)?;
    unspent.retain(|_, tx| {
        tx.outputs()
            .iter()
            .all(|output| unlocker.can_unlock(output, key))
    });
    Ok(unspent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemTxStore;
    use crate::errors::LedgerError;
    use crate::keygen::generate_curve_keys;
    use crate::transactions::{TxIn, TxOut};
    use crate::verifiers::KeySetUnlock;

    #[test]
    fn empty_store_has_nothing_unspent() {
        assert!(compute_unspent(&MemTxStore::new()).unwrap().is_empty());
    }

    #[test]
    fn spender_before_source_still_excludes_source() {
        let (_, alice) = generate_curve_keys(1);
        let base = Tx::new(&[TxIn::base()], &[TxOut::new("x", &[alice], b"")]);
        let spend = Tx::new(
            &[TxIn::new(base.digest(), 0, &[alice])],
            &[TxOut::new("x", &[alice], b"1")],
        );

        let store = MemTxStore::with_order(&[spend.clone(), base.clone()]);
        let unspent = compute_unspent(&store).unwrap();
        assert!(unspent.contains_key(&spend.digest()));
        assert!(!unspent.contains_key(&base.digest()));
    }

    #[test]
    fn base_inputs_mark_nothing_spent() {
        let (_, alice) = generate_curve_keys(1);
        let base = Tx::new(&[TxIn::base()], &[TxOut::new("x", &[alice], b"")]);
        let mixed = Tx::new(
            &[TxIn::base(), TxIn::new(base.digest(), 0, &[alice])],
            &[TxOut::new("y", &[alice], b"")],
        );
        let store = MemTxStore::with_order(&[base.clone(), mixed.clone()]);
        let unspent = compute_unspent(&store).unwrap();
        assert_eq!(unspent.len(), 1);
        assert!(unspent.contains_key(&mixed.digest()));
    }

    #[test]
    fn owner_filter_requires_every_output() {
        let (_, alice) = generate_curve_keys(1);
        let (_, bob) = generate_curve_keys(2);
        let mine = Tx::new(&[TxIn::base()], &[TxOut::new("a", &[alice], b"")]);
        let shared = Tx::new(
            &[TxIn::base()],
            &[TxOut::new("b", &[alice], b""), TxOut::new("c", &[bob], b"")],
        );
        let store = MemTxStore::with_order(&[mine.clone(), shared.clone()]);

        let for_alice = find_unspent_for(&store, &KeySetUnlock, &alice).unwrap();
        assert_eq!(for_alice.len(), 1);
        assert!(for_alice.contains_key(&mine.digest()));

        assert!(find_unspent_for(&store, &KeySetUnlock, &bob).unwrap().is_empty());
    }

    #[test]
    fn store_errors_propagate() {
        struct Broken;
        impl TxStorage for Broken {
            fn get(&self, digest: &Digest) -> LedgerResult<Tx> {
                Err(LedgerError::TxNotFound(*digest))
            }
            fn set(&mut self, _: &Tx) -> LedgerResult<()> {
                Ok(())
            }
            fn set_batch(&mut self, _: &[Tx]) -> LedgerResult<()> {
                Ok(())
            }
            fn iter(&self, _: &mut dyn FnMut(&Tx) -> LedgerResult<()>) -> LedgerResult<()> {
                Err(LedgerError::Storage("disk gone".into()))
            }
        }
        assert_eq!(
            compute_unspent(&Broken),
            Err(LedgerError::Storage("disk gone".into()))
        );
    }
}
