use std::collections::HashMap;

use crate::errors::{LedgerError, LedgerResult};
use crate::transactions::{DataKey, Digest, Tx};

/// Durable transaction store the ledger writes through.
///
/// Implementations own atomicity and isolation: `set_batch` must be
/// all-or-nothing, and `iter` must visit every stored transaction exactly
/// once. Visitation order is up to the store.
pub trait TxStorage {
    fn get(&self, digest: &Digest) -> LedgerResult<Tx>;

    fn set(&mut self, tx: &Tx) -> LedgerResult<()>;

    fn set_batch(&mut self, txs: &[Tx]) -> LedgerResult<()>;

    /// Stops at the first error returned by `visit` and hands it back.
    fn iter(&self, visit: &mut dyn FnMut(&Tx) -> LedgerResult<()>) -> LedgerResult<()>;
}

/// Secondary index from a data key to the output holding its latest state.
pub trait DataKeyIndex {
    fn get(&self, key: &DataKey) -> LedgerResult<(Digest, u32)>;

    fn set(&mut self, key: &DataKey, digest: Digest, index: u32) -> LedgerResult<()>;
}

#[derive(Debug, Default, Clone)]
pub struct MemTxStore {
    tx_by_hash: HashMap<Digest, Tx>,
    order: Vec<Digest>,
}

impl MemTxStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that iterates `txs` exactly in the given order.
    pub fn with_order(txs: &[Tx]) -> Self {
        let mut store = Self::default();
        for tx in txs {
            store.insert(tx);
        }
        store
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, digest: &Digest) -> bool {
        self.tx_by_hash.contains_key(digest)
    }

    // Content-addressed: storing the same digest twice keeps one copy.
    fn insert(&mut self, tx: &Tx) {
        if self.tx_by_hash.insert(tx.digest(), tx.clone()).is_none() {
            self.order.push(tx.digest());
        }
    }
}

impl TxStorage for MemTxStore {
    fn get(&self, digest: &Digest) -> LedgerResult<Tx> {
        self.tx_by_hash
            .get(digest)
            .cloned()
            .ok_or(LedgerError::TxNotFound(*digest))
    }

    fn set(&mut self, tx: &Tx) -> LedgerResult<()> {
        self.insert(tx);
        Ok(())
    }

    fn set_batch(&mut self, txs: &[Tx]) -> LedgerResult<()> {
        for tx in txs {
            self.insert(tx);
        }
        Ok(())
    }

    fn iter(&self, visit: &mut dyn FnMut(&Tx) -> LedgerResult<()>) -> LedgerResult<()> {
        for digest in &self.order {
            if let Some(tx) = self.tx_by_hash.get(digest) {
                visit(tx)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemDataKeyIndex {
    latest: HashMap<DataKey, (Digest, u32)>,
}

impl MemDataKeyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.latest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latest.is_empty()
    }
}

impl DataKeyIndex for MemDataKeyIndex {
    fn get(&self, key: &DataKey) -> LedgerResult<(Digest, u32)> {
        self.latest
            .get(key)
            .copied()
            .ok_or_else(|| LedgerError::DataKeyNotFound(key.clone()))
    }

    fn set(&mut self, key: &DataKey, digest: Digest, index: u32) -> LedgerResult<()> {
        self.latest.insert(key.clone(), (digest, index));
        Ok(())
    }
}
