//! Signing identities.
//!
//! An [`Identity`] wraps an Ed25519 key pair and the ledger address derived
//! from its public key. The address is computed once at construction and
//! never changes afterwards.

use std::fmt;

use ed25519_dalek::{SECRET_KEY_LENGTH, Signer, SigningKey};
use momentx_types::{ADDRESS_LENGTH, LedgerAddress};
use sha3::{Digest, Sha3_256};

use crate::LedgerError;

/// Signature scheme flag prepended to the public key before hashing.
const ED25519_FLAG: u8 = 0x00;
/// Length of a `seed || public key` key pair encoding.
const KEYPAIR_LENGTH: usize = 64;

/// Key pair plus derived address, authorizing on-chain actions.
pub struct Identity {
    signing_key: SigningKey,
    address: LedgerAddress,
}

impl Identity {
    /// Build an identity from hex-encoded key material (`0x` prefix optional).
    pub fn from_hex_seed(hex_seed: &str) -> Result<Self, LedgerError> {
        let trimmed = hex_seed.trim();
        let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(digits).map_err(|error| LedgerError::invalid_seed(format!("not valid hex: {error}")))?;
        Self::from_seed_bytes(&bytes)
    }

    /// Build an identity from raw key material.
    ///
    /// Accepts a 32-byte secret seed or a 64-byte `seed || public key` pair.
    /// For the latter the public half must match the key derived from the seed.
    pub fn from_seed_bytes(bytes: &[u8]) -> Result<Self, LedgerError> {
        let signing_key = match bytes.len() {
            SECRET_KEY_LENGTH => {
                let seed: &[u8; SECRET_KEY_LENGTH] = bytes
                    .try_into()
                    .map_err(|_| LedgerError::invalid_seed("seed length mismatch"))?;
                SigningKey::from_bytes(seed)
            }
            KEYPAIR_LENGTH => {
                let keypair: &[u8; KEYPAIR_LENGTH] = bytes
                    .try_into()
                    .map_err(|_| LedgerError::invalid_seed("key pair length mismatch"))?;
                SigningKey::from_keypair_bytes(keypair)
                    .map_err(|_| LedgerError::invalid_seed("public key does not match the secret seed"))?
            }
            other => {
                return Err(LedgerError::invalid_seed(format!(
                    "expected {SECRET_KEY_LENGTH} or {KEYPAIR_LENGTH} bytes, got {other}"
                )));
            }
        };
        let address = derive_address(&signing_key.verifying_key().to_bytes());
        Ok(Self { signing_key, address })
    }

    pub fn address(&self) -> LedgerAddress {
        self.address
    }

    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Sign a message (transaction bytes) with the identity's secret key.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity").field("address", &self.address).finish_non_exhaustive()
    }
}

fn derive_address(public_key: &[u8; 32]) -> LedgerAddress {
    let digest = Sha3_256::new().chain_update([ED25519_FLAG]).chain_update(public_key).finalize();
    let mut bytes = [0u8; ADDRESS_LENGTH];
    bytes.copy_from_slice(&digest[..ADDRESS_LENGTH]);
    LedgerAddress::new(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signature, Verifier};

    const SEED_HEX: &str = "0707070707070707070707070707070707070707070707070707070707070707";
    const PUBLIC_KEY_HEX: &str = "ea4a6c63e29c520abef5507b132ec5f9954776aebebe7b92421eea691446d22c";

    #[test]
    fn address_matches_known_vector() {
        let identity = Identity::from_hex_seed(SEED_HEX).expect("valid seed");
        assert_eq!(hex::encode(identity.public_key_bytes()), PUBLIC_KEY_HEX);
        assert_eq!(identity.address().to_string(), "0xb433df8c8cf30ec783402ce3789e650cbfea088c");
    }

    #[test]
    fn address_is_deterministic() {
        let first = Identity::from_hex_seed(SEED_HEX).unwrap();
        let second = Identity::from_hex_seed(&format!("0x{SEED_HEX}")).unwrap();
        assert_eq!(first.address(), first.address());
        assert_eq!(first.address(), second.address());
    }

    #[test]
    fn accepts_matching_keypair_bytes() {
        let keypair = format!("{SEED_HEX}{PUBLIC_KEY_HEX}");
        let from_pair = Identity::from_hex_seed(&keypair).expect("matching key pair");
        let from_seed = Identity::from_hex_seed(SEED_HEX).unwrap();
        assert_eq!(from_pair.address(), from_seed.address());
    }

    #[test]
    fn rejects_mismatched_keypair_bytes() {
        let keypair = format!("{SEED_HEX}{}", "00".repeat(32));
        let error = Identity::from_hex_seed(&keypair).unwrap_err();
        assert!(matches!(error, LedgerError::InvalidSeed { .. }), "unexpected error: {error}");
    }

    #[test]
    fn rejects_malformed_seed() {
        assert!(matches!(Identity::from_hex_seed("not-hex"), Err(LedgerError::InvalidSeed { .. })));
        assert!(matches!(Identity::from_seed_bytes(&[1, 2, 3]), Err(LedgerError::InvalidSeed { .. })));
    }

    #[test]
    fn signatures_verify_against_public_key() {
        let identity = Identity::from_hex_seed(SEED_HEX).unwrap();
        let message = b"TransactionData::payload";
        let signature = Signature::from_bytes(&identity.sign(message));
        identity
            .signing_key
            .verifying_key()
            .verify(message, &signature)
            .expect("signature verifies");
    }

    #[test]
    fn debug_output_hides_key_material() {
        let identity = Identity::from_hex_seed(SEED_HEX).unwrap();
        let rendered = format!("{identity:?}");
        assert!(rendered.contains("0xb433df8c"));
        assert!(!rendered.contains("070707"));
    }
}
