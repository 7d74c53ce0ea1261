//! Decoded ledger responses.
//!
//! Each type mirrors one JSON-RPC payload of the full node. Effect events are
//! a tagged enum so callers match on the kind instead of probing field paths.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};
use serde_json::Value;

use crate::{LedgerAddress, ObjectId};

/// Object id embedded in a dynamic field name, e.g. `0x2::object::ID { bytes: 0x… }`.
static EMBEDDED_OBJECT_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"0x[0-9a-fA-F]{40}\b").expect("valid object id pattern"));

/// Versioned reference to an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRef {
    pub object_id: ObjectId,
    pub version: u64,
    pub digest: String,
}

/// Ownership of an on-chain object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "OwnerRepr")]
pub enum Owner {
    AddressOwner(LedgerAddress),
    ObjectOwner(ObjectId),
    Shared { initial_shared_version: Option<u64> },
    Immutable,
}

impl Owner {
    pub fn is_shared(&self) -> bool {
        matches!(self, Owner::Shared { .. })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OwnerRepr {
    Tagged(TaggedOwner),
    Bare(String),
}

#[derive(Deserialize)]
enum TaggedOwner {
    AddressOwner(LedgerAddress),
    ObjectOwner(ObjectId),
    Shared {
        #[serde(default)]
        initial_shared_version: Option<u64>,
    },
}

impl TryFrom<OwnerRepr> for Owner {
    type Error = String;

    fn try_from(value: OwnerRepr) -> Result<Self, Self::Error> {
        match value {
            OwnerRepr::Tagged(TaggedOwner::AddressOwner(address)) => Ok(Owner::AddressOwner(address)),
            OwnerRepr::Tagged(TaggedOwner::ObjectOwner(id)) => Ok(Owner::ObjectOwner(id)),
            OwnerRepr::Tagged(TaggedOwner::Shared { initial_shared_version }) => Ok(Owner::Shared { initial_shared_version }),
            OwnerRepr::Bare(kind) => match kind.as_str() {
                "Shared" => Ok(Owner::Shared {
                    initial_shared_version: None,
                }),
                "Immutable" => Ok(Owner::Immutable),
                other => Err(format!("unknown owner kind '{other}'")),
            },
        }
    }
}

/// Object produced by a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewObjectEvent {
    pub package_id: ObjectId,
    #[serde(default)]
    pub transaction_module: String,
    pub sender: LedgerAddress,
    pub recipient: Owner,
    pub object_type: String,
    pub object_id: ObjectId,
    #[serde(default)]
    pub version: u64,
}

/// Package published by a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishEvent {
    pub sender: LedgerAddress,
    pub package_id: ObjectId,
}

/// Mutation, transfer, or deletion of an existing object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectChangeEvent {
    #[serde(default)]
    pub package_id: Option<ObjectId>,
    #[serde(default)]
    pub transaction_module: Option<String>,
    #[serde(default)]
    pub sender: Option<LedgerAddress>,
    #[serde(default)]
    pub recipient: Option<Owner>,
    #[serde(default)]
    pub object_type: Option<String>,
    pub object_id: ObjectId,
    #[serde(default)]
    pub version: u64,
}

/// One effect event emitted by an executed transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LedgerEvent {
    NewObject(NewObjectEvent),
    Publish(PublishEvent),
    MutateObject(ObjectChangeEvent),
    DeleteObject(ObjectChangeEvent),
    TransferObject(ObjectChangeEvent),
    CoinBalanceChange(Value),
    MoveEvent(Value),
    /// Event kind this tool does not interpret.
    Other { kind: String, payload: Value },
}

impl<'de> Deserialize<'de> for LedgerEvent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = serde_json::Map::<String, Value>::deserialize(deserializer)?;
        if map.len() != 1 {
            return Err(D::Error::custom(format!("expected a single event kind, found {} keys", map.len())));
        }
        let Some((kind, payload)) = map.into_iter().next() else {
            return Err(D::Error::custom("empty event"));
        };
        let event = match kind.as_str() {
            "newObject" => LedgerEvent::NewObject(serde_json::from_value(payload).map_err(D::Error::custom)?),
            "publish" => LedgerEvent::Publish(serde_json::from_value(payload).map_err(D::Error::custom)?),
            "mutateObject" => LedgerEvent::MutateObject(serde_json::from_value(payload).map_err(D::Error::custom)?),
            "deleteObject" => LedgerEvent::DeleteObject(serde_json::from_value(payload).map_err(D::Error::custom)?),
            "transferObject" => LedgerEvent::TransferObject(serde_json::from_value(payload).map_err(D::Error::custom)?),
            "coinBalanceChange" => LedgerEvent::CoinBalanceChange(payload),
            "moveEvent" => LedgerEvent::MoveEvent(payload),
            _ => LedgerEvent::Other { kind, payload },
        };
        Ok(event)
    }
}

/// Outcome reported by the node for an executed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ExecutionStatus {
    Success,
    Failure {
        #[serde(default)]
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedObjectRef {
    pub owner: Owner,
    pub reference: ObjectRef,
}

/// Effects block of an executed transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEffects {
    pub status: ExecutionStatus,
    #[serde(default)]
    pub transaction_digest: Option<String>,
    #[serde(default)]
    pub created: Vec<OwnedObjectRef>,
    #[serde(default)]
    pub events: Vec<LedgerEvent>,
}

/// Response to an executed transaction.
///
/// The raw payload is retained for logging; every decision is taken from the
/// decoded [`TransactionEffects`].
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionResponse {
    pub digest: Option<String>,
    pub effects: TransactionEffects,
    pub raw: Value,
}

#[derive(Deserialize)]
struct CertifiedEffects {
    effects: EffectsEnvelope,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EffectsEnvelope {
    #[serde(default)]
    transaction_effects_digest: Option<String>,
    effects: TransactionEffects,
}

impl TransactionResponse {
    /// Decode an execution response, accepting both the `EffectsCert`-wrapped
    /// form and the bare certified-effects form.
    pub fn from_json(raw: Value) -> Result<Self, serde_json::Error> {
        let certified = raw.get("EffectsCert").cloned().unwrap_or_else(|| raw.clone());
        let CertifiedEffects { effects } = serde_json::from_value(certified)?;
        let digest = effects
            .transaction_effects_digest
            .or_else(|| effects.effects.transaction_digest.clone());
        Ok(Self {
            digest,
            effects: effects.effects,
            raw,
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self.effects.status, ExecutionStatus::Success)
    }

    /// `NewObject` events in response order.
    pub fn new_objects(&self) -> impl Iterator<Item = &NewObjectEvent> {
        self.effects.events.iter().filter_map(|event| match event {
            LedgerEvent::NewObject(created) => Some(created),
            _ => None,
        })
    }

    /// Package id from the first `Publish` event, if any.
    pub fn published_package(&self) -> Option<&ObjectId> {
        self.effects.events.iter().find_map(|event| match event {
            LedgerEvent::Publish(publish) => Some(&publish.package_id),
            _ => None,
        })
    }
}

impl Serialize for TransactionResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TransactionResponse {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        TransactionResponse::from_json(raw).map_err(D::Error::custom)
    }
}

/// Contents of a Move object as returned by `sui_getObject`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveObjectData {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub has_public_transfer: bool,
    #[serde(default)]
    pub fields: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dataType", rename_all = "camelCase")]
pub enum ObjectData {
    MoveObject(MoveObjectData),
    Package {
        #[serde(default)]
        disassembled: Value,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectDetails {
    pub data: ObjectData,
    pub owner: Owner,
    #[serde(default)]
    pub previous_transaction: Option<String>,
    #[serde(default)]
    pub storage_rebate: Option<u64>,
    pub reference: ObjectRef,
}

impl ObjectDetails {
    pub fn move_object(&self) -> Option<&MoveObjectData> {
        match &self.data {
            ObjectData::MoveObject(data) => Some(data),
            ObjectData::Package { .. } => None,
        }
    }
}

/// Result of reading one object by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "details")]
pub enum ObjectRead {
    Exists(ObjectDetails),
    NotExists(ObjectId),
    Deleted(ObjectRef),
}

impl ObjectRead {
    pub fn details(&self) -> Option<&ObjectDetails> {
        match self {
            ObjectRead::Exists(details) => Some(details),
            _ => None,
        }
    }
}

/// One entry of a dynamic-field container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicFieldInfo {
    pub name: Value,
    #[serde(default, rename = "type")]
    pub field_kind: Option<String>,
    #[serde(default)]
    pub object_type: Option<String>,
    pub object_id: ObjectId,
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub digest: String,
}

impl DynamicFieldInfo {
    /// Object the entry points at.
    ///
    /// Tables keyed by object id carry the referenced id inside the field
    /// name; entries without one resolve to the field object itself.
    pub fn referenced_object_id(&self) -> ObjectId {
        let rendered = match &self.name {
            Value::String(name) => name.clone(),
            other => other.to_string(),
        };
        EMBEDDED_OBJECT_ID
            .find(&rendered)
            .and_then(|found| ObjectId::parse(found.as_str()).ok())
            .unwrap_or_else(|| self.object_id.clone())
    }
}

/// One page of a dynamic-field enumeration.
///
/// `has_more` is the only end-of-sequence signal; a missing cursor never means
/// "start over".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "DynamicFieldPageRepr")]
pub struct DynamicFieldPage {
    pub entries: Vec<DynamicFieldInfo>,
    pub next_cursor: Option<ObjectId>,
    pub has_more: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DynamicFieldPageRepr {
    #[serde(default, alias = "entries")]
    data: Vec<DynamicFieldInfo>,
    #[serde(default)]
    next_cursor: Option<ObjectId>,
    #[serde(default, alias = "hasMore")]
    has_next_page: Option<bool>,
}

impl From<DynamicFieldPageRepr> for DynamicFieldPage {
    fn from(repr: DynamicFieldPageRepr) -> Self {
        // Nodes that predate `hasNextPage` signal the end with a null cursor.
        let has_more = repr.has_next_page.unwrap_or(repr.next_cursor.is_some());
        Self {
            entries: repr.data,
            next_cursor: repr.next_cursor,
            has_more,
        }
    }
}

/// Summary of an object owned by an address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedObjectInfo {
    pub object_id: ObjectId,
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub digest: String,
    #[serde(rename = "type")]
    pub object_type: String,
    pub owner: Owner,
    #[serde(default)]
    pub previous_transaction: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferredGasObject {
    pub amount: u64,
    pub id: ObjectId,
    pub transfer_tx_digest: String,
}

/// Faucet reply to a funding request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FaucetResponse {
    #[serde(default)]
    pub transferred_gas_objects: Vec<TransferredGasObject>,
    #[serde(default)]
    pub error: Option<String>,
}
