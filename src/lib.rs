//! Transaction ledger core: input authorization, batch admission and the
//! unspent-transaction set derived from stored history.
//!
//! Storage, the data-key index, content addressing and the unlock predicate
//! are collaborators behind traits ([`TxStorage`], [`DataKeyIndex`],
//! [`Digester`], [`Unlocker`]); in-memory versions ship for tests and demos.
//!
//! ```
//! use hexa_ledger::{generate_curve_keys, Ledger, MemDataKeyIndex, MemTxStore, Tx, TxIn, TxOut};
//!
//! let (_, alice) = generate_curve_keys(1337);
//! let mut ledger = Ledger::new(MemTxStore::new(), MemDataKeyIndex::new());
//!
//! let base = Tx::new(&[TxIn::base()], &[TxOut::new("x", &[alice], b"")]);
//! ledger.submit(&base).unwrap();
//! let spend = Tx::new(&[TxIn::new(base.digest(), 0, &[alice])], &[TxOut::new("x", &[alice], b"1")]);
//! ledger.submit(&spend).unwrap();
//!
//! let unspent = ledger.compute_unspent().unwrap();
//! assert!(unspent.contains_key(&spend.digest()));
//! assert!(!unspent.contains_key(&base.digest()));
//! ```

pub mod db;
pub mod errors;
pub mod keygen;
pub mod ledger;
pub mod transactions;
pub mod unspent;
pub mod verifiers;

pub use db::{DataKeyIndex, MemDataKeyIndex, MemTxStore, TxStorage};
pub use errors::{LedgerError, LedgerResult};
pub use keygen::{address, generate_curve_keys};
pub use ledger::Ledger;
pub use transactions::{genesis_digest, DataKey, Digest, Digester, Sha256d, Tx, TxIn, TxOut};
pub use unspent::{compute_unspent, find_unspent_for, UnspentSet};
pub use verifiers::{KeySetUnlock, TxVerifier, Unlocker};
