//! Transaction admission on top of a store and a data-key index.
//!
//! Every call is a request against the current state of the collaborators;
//! the ledger itself holds nothing but them. Batch admission takes its
//! unspent snapshot, validates and commits without any lock of its own, so
//! `submit` and `submit_batch` must be serialized by the caller or the store.

use secp256k1::PublicKey;
use tracing::{debug, info, warn};

use crate::db::{DataKeyIndex, TxStorage};
use crate::errors::{LedgerError, LedgerResult};
use crate::transactions::{DataKey, Tx};
use crate::unspent::{self, UnspentSet};
use crate::verifiers::{KeySetUnlock, TxVerifier, Unlocker};

#[derive(Debug, Clone)]
pub struct Ledger<S, I, U = KeySetUnlock> {
    store: S,
    index: I,
    verifier: TxVerifier<U>,
}

impl<S, I> Ledger<S, I>
where
    S: TxStorage,
    I: DataKeyIndex,
{
    pub fn new(store: S, index: I) -> Self {
        Self::with_unlocker(store, index, KeySetUnlock)
    }
}

impl<S, I, U> Ledger<S, I, U>
where
    S: TxStorage,
    I: DataKeyIndex,
    U: Unlocker,
{
    pub fn with_unlocker(store: S, index: I, unlocker: U) -> Self {
        Self {
            store,
            index,
            verifier: TxVerifier::new(unlocker),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    pub fn validate_inputs(&self, tx: &Tx) -> LedgerResult<()> {
        self.verifier.validate_inputs(tx, &self.store)
    }

    /// Validates `tx` and persists it. The store is untouched on failure.
    pub fn submit(&mut self, tx: &Tx) -> LedgerResult<()> {
        if let Err(err) = self.validate_inputs(tx) {
            warn!(tx = %tx.digest(), %err, "rejected transaction");
            return Err(err);
        }
        self.store.set(tx)?;
        info!(tx = %tx.digest(), inputs = tx.inputs().len(), outputs = tx.outputs().len(), "committed transaction");
        Ok(())
    }

    /// Validates every transaction against committed history, then persists
    /// the whole batch in one `set_batch` call.
    ///
    /// The unspent snapshot is taken once, before the batch, and is not
    /// updated as the batch is walked. Two transactions in the same batch
    /// claiming the same output are therefore both accepted; only conflicts
    /// with already committed transactions are caught.
    pub fn submit_batch(&mut self, txs: &[Tx]) -> LedgerResult<()> {
        let unspent = self.compute_unspent()?;

        for tx in txs {
            if let Err(err) = self.check_batch_entry(tx, &unspent) {
                warn!(tx = %tx.digest(), %err, batch = txs.len(), "rejected batch");
                return Err(err);
            }
        }

        self.store.set_batch(txs)?;
        info!(batch = txs.len(), "committed batch");
        Ok(())
    }

    fn check_batch_entry(&self, tx: &Tx, unspent: &UnspentSet) -> LedgerResult<()> {
        self.validate_inputs(tx)?;

        // Make sure inputs haven't been spent
        for input in tx.inputs().iter().filter(|input| !input.is_base()) {
            if !unspent.contains_key(&input.prev) {
                return Err(LedgerError::AlreadySpent {
                    tx: input.prev,
                    index: input.index,
                });
            }
        }
        Ok(())
    }

    pub fn compute_unspent(&self) -> LedgerResult<UnspentSet> {
        unspent::compute_unspent(&self.store)
    }

    pub fn find_unspent_for(&self, key: &PublicKey) -> LedgerResult<UnspentSet> {
        unspent::find_unspent_for(&self.store, self.verifier.unlocker(), key)
    }

    /// Latest transaction and output position recorded for `key`.
    pub fn resolve_data_key(&self, key: &DataKey) -> LedgerResult<(Tx, u32)> {
        let (digest, position) = self.index.get(key)?;
        let tx = self.store.get(&digest)?;
        Ok((tx, position))
    }

    /// Points every output's data key at its position in `txs`. Not called by
    /// `submit`/`submit_batch`; wire it in after a commit, or use the
    /// `*_and_index` variants.
    pub fn index_outputs(&mut self, txs: &[Tx]) -> LedgerResult<()> {
        for tx in txs {
            for (position, output) in tx.outputs().iter().enumerate() {
                self.index
                    .set(&output.data_key, tx.digest(), position as u32)?;
            }
            debug!(tx = %tx.digest(), outputs = tx.outputs().len(), "indexed outputs");
        }
        Ok(())
    }

    pub fn submit_and_index(&mut self, tx: &Tx) -> LedgerResult<()> {
        self.submit(tx)?;
        self.index_outputs(std::slice::from_ref(tx))
    }

    pub fn submit_batch_and_index(&mut self, txs: &[Tx]) -> LedgerResult<()> {
        self.submit_batch(txs)?;
        self.index_outputs(txs)
    }
}
