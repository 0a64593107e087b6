use pcg_rand::Pcg64;
use rand::Rng;
use rand::SeedableRng;
use ripemd::{Digest as _, Ripemd160};

use secp256k1::{PublicKey, SecretKey};

/// Deterministic key pair for `seed`. Draws again when the 32 random bytes
/// fall outside the curve order.
pub fn generate_curve_keys(seed: u64) -> (SecretKey, PublicKey) {
    let context = secp256k1::Secp256k1::new();
    let mut rng = Pcg64::seed_from_u64(seed);
    let secret_key = loop {
        let random_val = rng.gen::<[u8; 32]>();
        if let Ok(secret_key) = SecretKey::from_slice(&random_val) {
            break secret_key;
        }
    };
    let public_key = PublicKey::from_secret_key(&context, &secret_key);
    (secret_key, public_key)
}

/// Base58 owner address of a public key, used to tag log lines.
pub fn address(public_key: &PublicKey) -> String {
    // Sha256 the public key
    let sha256 = sha256::digest(hex::encode(public_key.serialize()));
    // Ripemd160 the sha256
    let mut ripemd_hasher = Ripemd160::new();
    ripemd_hasher.update(sha256);
    let result = ripemd_hasher.finalize();
    // Compute checksum by double-sha256ing the first 4 bytes
    let checksum = sha256::digest(sha256::digest(hex::encode(&result[0..4])));
    // Concat result and checksum
    let mut new_result = result.to_vec();
    if let Ok(mut checksum) = hex::decode(checksum) {
        new_result.append(&mut checksum);
    }
    // b58 encode the byte address.
    bs58::encode(new_result).into_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_keys() {
        assert_eq!(generate_curve_keys(1337).1, generate_curve_keys(1337).1);
        assert_ne!(generate_curve_keys(1337).1, generate_curve_keys(420).1);
    }

    #[test]
    fn address_is_stable() {
        let (_, public_key) = generate_curve_keys(7);
        let a = address(&public_key);
        assert!(!a.is_empty());
        assert_eq!(a, address(&public_key));
    }
}
