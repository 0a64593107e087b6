use secp256k1::PublicKey;
use tracing::debug;

use crate::db::TxStorage;
use crate::errors::{LedgerError, LedgerResult};
use crate::transactions::{Tx, TxOut};

/// Decides whether a public key may claim an output.
pub trait Unlocker {
    fn can_unlock(&self, output: &TxOut, key: &PublicKey) -> bool;
}

/// A key unlocks an output when the output lists it.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeySetUnlock;

impl Unlocker for KeySetUnlock {
    fn can_unlock(&self, output: &TxOut, key: &PublicKey) -> bool {
        output.can_unlock(key)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TxVerifier<U = KeySetUnlock> {
    unlocker: U,
}

impl<U: Unlocker> TxVerifier<U> {
    pub fn new(unlocker: U) -> Self {
        Self { unlocker }
    }

    pub fn unlocker(&self) -> &U {
        &self.unlocker
    }

    /// Checks that every key on every non-base input may claim the output it
    /// references. Reads the store only.
    ///
    /// An input listing no keys has nothing to check and passes, so it can
    /// claim any existing output.
    pub fn validate_inputs<S: TxStorage + ?Sized>(&self, tx: &Tx, store: &S) -> LedgerResult<()> {
        for input in tx.inputs().iter().filter(|input| !input.is_base()) {
            let prev = store.get(&input.prev)?;
            let output = prev
                .outputs()
                .get(input.index as usize)
                .ok_or(LedgerError::OutOfRange {
                    tx: input.prev,
                    index: input.index,
                    outputs: prev.outputs().len(),
                })?;

            // Each key must be able to unlock
            if let Some(key) = input
                .pub_keys
                .iter()
                .find(|key| !self.unlocker.can_unlock(output, key))
            {
                debug!(tx = %tx.digest(), prev = %input.prev, key = %hex::encode(key.serialize()), "key cannot unlock output");
                return Err(LedgerError::NotAuthorized {
                    tx: input.prev,
                    index: input.index,
                });
            }
        }
        Ok(())
    }
}
