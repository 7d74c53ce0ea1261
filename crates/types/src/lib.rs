//! Shared type definitions for the MomentX demo.
//!
//! Identifiers live here together with the decoded shapes of every ledger
//! response the demo consumes (see [`ledger`]). Responses are decoded once at
//! the client boundary so downstream code never walks untyped JSON.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod ledger;

pub use ledger::{
    DynamicFieldInfo, DynamicFieldPage, ExecutionStatus, FaucetResponse, LedgerEvent, MoveObjectData, NewObjectEvent, ObjectChangeEvent,
    ObjectData, ObjectDetails, ObjectRead, ObjectRef, OwnedObjectInfo, OwnedObjectRef, Owner, PublishEvent, TransactionEffects,
    TransactionResponse, TransferredGasObject,
};

/// Number of bytes in a ledger account address.
pub const ADDRESS_LENGTH: usize = 20;
const OBJECT_ID_HEX_DIGITS: usize = ADDRESS_LENGTH * 2;

/// Failure to parse an identifier received from configuration or the ledger.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdError {
    #[error("identifier is empty")]
    Empty,
    #[error("identifier '{0}' is not valid hex")]
    NotHex(String),
    #[error("identifier '{value}' must be at most {expected} bytes, got {actual}")]
    WrongLength { value: String, expected: usize, actual: usize },
}

/// Identifier of an on-chain object or package.
///
/// Always stored lowercase, `0x`-prefixed and left-padded to the full
/// 20-byte width, so the short form `0x2` and the padded form the node
/// reports compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId(String);

impl ObjectId {
    /// Parse and normalise a hex object identifier (`0x` prefix optional).
    ///
    /// Short identifiers are zero-padded; more than 20 bytes of digits is rejected.
    pub fn parse(raw: &str) -> Result<Self, IdError> {
        let digits = strip_hex_prefix(raw.trim());
        if digits.is_empty() {
            return Err(IdError::Empty);
        }
        if !digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return Err(IdError::NotHex(raw.to_string()));
        }
        if digits.len() > OBJECT_ID_HEX_DIGITS {
            return Err(IdError::WrongLength {
                value: raw.to_string(),
                expected: ADDRESS_LENGTH,
                actual: digits.len().div_ceil(2),
            });
        }
        Ok(Self(format!(
            "0x{:0>width$}",
            digits.to_ascii_lowercase(),
            width = OBJECT_ID_HEX_DIGITS
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ObjectId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ObjectId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ObjectId> for String {
    fn from(value: ObjectId) -> Self {
        value.0
    }
}

/// Account address derived from a signing identity's public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LedgerAddress([u8; ADDRESS_LENGTH]);

impl LedgerAddress {
    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Parse a hex address; the `0x` prefix is optional.
    pub fn parse(raw: &str) -> Result<Self, IdError> {
        let digits = strip_hex_prefix(raw.trim());
        if digits.is_empty() {
            return Err(IdError::Empty);
        }
        let decoded = hex::decode(digits).map_err(|_| IdError::NotHex(raw.to_string()))?;
        let bytes: [u8; ADDRESS_LENGTH] = decoded.as_slice().try_into().map_err(|_| IdError::WrongLength {
            value: raw.to_string(),
            expected: ADDRESS_LENGTH,
            actual: decoded.len(),
        })?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }
}

impl fmt::Display for LedgerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for LedgerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LedgerAddress({self})")
    }
}

impl FromStr for LedgerAddress {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for LedgerAddress {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<LedgerAddress> for String {
    fn from(value: LedgerAddress) -> Self {
        value.to_string()
    }
}

/// Published module identifiers captured from the publish transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResult {
    /// Package that holds the published module.
    pub module_id: ObjectId,
    /// Shared object created by the module initializer.
    pub global_object_id: ObjectId,
}

impl PublishResult {
    /// Fully-qualified Move type name for a struct declared by the published package.
    pub fn qualified_type(&self, module: &str, struct_name: &str) -> String {
        format!("{}::{}::{}", self.module_id, module, struct_name)
    }
}

fn strip_hex_prefix(value: &str) -> &str {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_id_is_normalised() {
        let id = ObjectId::parse("ABCDEF0123").expect("parse");
        assert_eq!(id.as_str(), "0x000000000000000000000000000000abcdef0123");
        assert_eq!(id, ObjectId::parse("0xabcdef0123").expect("parse prefixed"));
    }

    #[test]
    fn short_and_padded_ids_compare_equal() {
        let short = ObjectId::parse("0xaa").unwrap();
        let padded = ObjectId::parse("0x00000000000000000000000000000000000000aa").unwrap();
        assert_eq!(short, padded);
        assert_eq!(short.to_string(), padded.as_str());
    }

    #[test]
    fn object_id_rejects_non_hex() {
        assert_eq!(ObjectId::parse("0x"), Err(IdError::Empty));
        assert!(matches!(ObjectId::parse("0xzz"), Err(IdError::NotHex(_))));
    }

    #[test]
    fn object_id_rejects_more_than_twenty_bytes() {
        let raw = format!("0x1{}", "0".repeat(40));
        assert_eq!(
            ObjectId::parse(&raw),
            Err(IdError::WrongLength {
                value: raw.clone(),
                expected: ADDRESS_LENGTH,
                actual: 21
            })
        );
    }

    #[test]
    fn address_round_trips_through_display() {
        let raw = "0x00112233445566778899aabbccddeeff00112233";
        let address = LedgerAddress::parse(raw).expect("parse address");
        assert_eq!(address.to_string(), raw);
        assert_eq!(LedgerAddress::parse(&raw[2..]).expect("parse bare"), address);
    }

    #[test]
    fn address_rejects_wrong_length() {
        let error = LedgerAddress::parse("0x0011").unwrap_err();
        assert_eq!(
            error,
            IdError::WrongLength {
                value: "0x0011".into(),
                expected: ADDRESS_LENGTH,
                actual: 2
            }
        );
    }

    #[test]
    fn qualified_type_joins_package_module_and_struct() {
        let publish = PublishResult {
            module_id: ObjectId::parse("0xabc").unwrap(),
            global_object_id: ObjectId::parse("0xdef").unwrap(),
        };
        assert_eq!(
            publish.qualified_type("ylabs_nft", "YlabsNFT"),
            "0x0000000000000000000000000000000000000abc::ylabs_nft::YlabsNFT"
        );
    }
}
