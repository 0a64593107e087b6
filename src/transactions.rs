use std::fmt;

use hex::{decode_to_slice, FromHexError};
use secp256k1::PublicKey;
use sha256::digest;

/// Content-derived identifier of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Digest([u8; 32]);

impl Digest {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn from_hex(s: &str) -> Result<Self, FromHexError> {
        let mut bytes = [0u8; 32];
        decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Reference carried by every base input.
pub fn genesis_digest() -> Digest {
    Digest::from_hex(&digest("GENESIS")).unwrap_or_default()
}

/// Application-defined name of a state record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DataKey(Vec<u8>);

impl DataKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for DataKey {
    fn from(key: &str) -> Self {
        Self(key.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for DataKey {
    fn from(key: Vec<u8>) -> Self {
        Self(key)
    }
}

impl fmt::Display for DataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

/// A claim against output `index` of transaction `prev`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxIn {
    pub prev: Digest,
    pub index: u32,
    pub pub_keys: Vec<PublicKey>,
    pub base: bool,
}

impl TxIn {
    pub fn new(prev: Digest, index: u32, pub_keys: &[PublicKey]) -> Self {
        Self {
            prev,
            index,
            pub_keys: pub_keys.to_vec(),
            base: false,
        }
    }

    /// An input with no spending history. Skips every reference check.
    pub fn base() -> Self {
        Self {
            prev: genesis_digest(),
            index: 0,
            pub_keys: vec![],
            base: true,
        }
    }

    pub fn is_base(&self) -> bool {
        self.base
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOut {
    pub data_key: DataKey,
    /// Keys allowed to claim this output.
    pub pub_keys: Vec<PublicKey>,
    pub data: Vec<u8>,
}

impl TxOut {
    pub fn new(data_key: impl Into<DataKey>, pub_keys: &[PublicKey], data: &[u8]) -> Self {
        Self {
            data_key: data_key.into(),
            pub_keys: pub_keys.to_vec(),
            data: data.to_vec(),
        }
    }

    pub fn can_unlock(&self, key: &PublicKey) -> bool {
        self.pub_keys.contains(key)
    }
}

/// Content-addressing scheme for transactions.
pub trait Digester {
    fn digest(&self, inputs: &[TxIn], outputs: &[TxOut]) -> Digest;
}

/// Double sha256 over a canonical rendering of the inputs and outputs.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256d;

impl Digester for Sha256d {
    fn digest(&self, inputs: &[TxIn], outputs: &[TxOut]) -> Digest {
        let mut hash_string = String::new();
        for input in inputs {
            hash_string += &format!("i{}:{}:{}", input.prev, input.index, input.base);
            for key in &input.pub_keys {
                hash_string += &format!(":{}", hex::encode(key.serialize()));
            }
            hash_string.push(';');
        }
        for output in outputs {
            hash_string += &format!(
                "o{}:{}",
                hex::encode(output.data_key.as_bytes()),
                hex::encode(&output.data)
            );
            for key in &output.pub_keys {
                hash_string += &format!(":{}", hex::encode(key.serialize()));
            }
            hash_string.push(';');
        }

        // sha256 always renders 64 hex chars, so decoding cannot fail.
        Digest::from_hex(&digest(digest(hash_string))).unwrap_or_default()
    }
}

/// Immutable, content-addressed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tx {
    digest: Digest,
    inputs: Vec<TxIn>,
    outputs: Vec<TxOut>,
}

impl Tx {
    pub fn new(inputs: &[TxIn], outputs: &[TxOut]) -> Self {
        Self::with_digester(&Sha256d, inputs, outputs)
    }

    pub fn with_digester<D: Digester + ?Sized>(
        digester: &D,
        inputs: &[TxIn],
        outputs: &[TxOut],
    ) -> Self {
        Self {
            digest: digester.digest(inputs, outputs),
            inputs: inputs.to_vec(),
            outputs: outputs.to_vec(),
        }
    }

    pub fn digest(&self) -> Digest {
        self.digest
    }

    pub fn inputs(&self) -> &[TxIn] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TxOut] {
        &self.outputs
    }

    /// No inputs, or only base claims.
    pub fn is_base(&self) -> bool {
        self.inputs.iter().all(TxIn::is_base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keygen::generate_curve_keys;

    #[test]
    fn digest_is_deterministic() {
        let (_, key) = generate_curve_keys(1);
        let out = TxOut::new("x", &[key], b"state");
        let a = Tx::new(&[TxIn::base()], &[out.clone()]);
        let b = Tx::new(&[TxIn::base()], &[out]);
        assert_eq!(a.digest(), b.digest());
    }

    #[test]
    fn digest_follows_content() {
        let (_, key) = generate_curve_keys(1);
        let a = Tx::new(&[TxIn::base()], &[TxOut::new("x", &[key], b"")]);
        let b = Tx::new(&[TxIn::base()], &[TxOut::new("y", &[key], b"")]);
        assert_ne!(a.digest(), b.digest());
    }

    #[test]
    fn custom_digester_is_used() {
        struct Fixed;
        impl Digester for Fixed {
            fn digest(&self, _: &[TxIn], _: &[TxOut]) -> Digest {
                Digest::new([7; 32])
            }
        }
        let tx = Tx::with_digester(&Fixed, &[], &[]);
        assert_eq!(tx.digest(), Digest::new([7; 32]));
    }

    #[test]
    fn base_detection() {
        let (_, key) = generate_curve_keys(2);
        assert!(Tx::new(&[], &[]).is_base());
        assert!(Tx::new(&[TxIn::base()], &[]).is_base());
        let spend = TxIn::new(Digest::new([1; 32]), 0, &[key]);
        assert!(!Tx::new(&[TxIn::base(), spend], &[]).is_base());
    }

    #[test]
    fn hex_round_trip_and_genesis() {
        let d = genesis_digest();
        assert_ne!(d, Digest::default());
        assert_eq!(Digest::from_hex(&d.to_string()).unwrap(), d);
        assert!(Digest::from_hex("zz").is_err());
    }

    #[test]
    fn data_key_display() {
        assert_eq!(DataKey::from("hello").to_string(), "hello");
    }
}
