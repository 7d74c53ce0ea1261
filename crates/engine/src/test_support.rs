//! Scripted in-memory ledger used by the engine's unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use momentx_api::{Identity, LedgerClient, LedgerError, MoveCall};
use momentx_types::{
    DynamicFieldPage, FaucetResponse, LedgerAddress, ObjectId, ObjectRead, OwnedObjectInfo, PublishResult, TransactionResponse,
};
use serde_json::{Value, json};

use crate::model::Identities;

pub const PACKAGE_ID: &str = "0x00000000000000000000000000000000000000aa";
pub const GLOBAL_ID: &str = "0x00000000000000000000000000000000000000bb";
pub const MINTED_ID: &str = "0x00000000000000000000000000000000000000cc";
pub const TOKEN_TYPE: &str = "0x00000000000000000000000000000000000000aa::ylabs_nft::YlabsNFT";

pub fn test_identities() -> Identities {
    Identities {
        admin: Identity::from_seed_bytes(&[1; 32]).expect("admin seed"),
        merchant: Identity::from_seed_bytes(&[2; 32]).expect("merchant seed"),
        user: Identity::from_seed_bytes(&[3; 32]).expect("user seed"),
    }
}

pub fn published() -> PublishResult {
    PublishResult {
        module_id: ObjectId::parse(PACKAGE_ID).unwrap(),
        global_object_id: ObjectId::parse(GLOBAL_ID).unwrap(),
    }
}

/// A move call as the mock observed it.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub function: String,
    pub signer: LedgerAddress,
    pub arguments: Vec<Value>,
    pub gas_budget: u64,
}

#[derive(Default)]
struct MockState {
    operations: Vec<String>,
    calls: Vec<RecordedCall>,
    funded: Vec<LedgerAddress>,
    published_modules: Vec<Vec<u8>>,
    merchants: Vec<LedgerAddress>,
    failing: Vec<String>,
    publish_events: Option<Vec<Value>>,
    airdrop_events: Option<Vec<Value>>,
    pages: VecDeque<DynamicFieldPage>,
    endless_pages: bool,
    cursors_seen: Vec<Option<ObjectId>>,
    objects: HashMap<ObjectId, ObjectRead>,
    owned: Vec<OwnedObjectInfo>,
}

/// In-memory [`LedgerClient`].
///
/// Mirrors the contract's merchant role check: `set_stock` is rejected unless
/// `add_merchant` previously granted the role to the signer.
#[derive(Default)]
pub struct MockLedger {
    state: Mutex<MockState>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the named operation (`publish`, `fund`, or a function name) fail.
    pub fn failing(self, operation: &str) -> Self {
        self.state.lock().unwrap().failing.push(operation.to_string());
        self
    }

    pub fn with_publish_events(self, events: Vec<Value>) -> Self {
        self.state.lock().unwrap().publish_events = Some(events);
        self
    }

    pub fn with_airdrop_events(self, events: Vec<Value>) -> Self {
        self.state.lock().unwrap().airdrop_events = Some(events);
        self
    }

    pub fn with_page(self, page: DynamicFieldPage) -> Self {
        self.state.lock().unwrap().pages.push_back(page);
        self
    }

    /// Every page claims more entries follow.
    pub fn with_endless_pages(self) -> Self {
        self.state.lock().unwrap().endless_pages = true;
        self
    }

    pub fn with_object(self, read: Value) -> Self {
        let read: ObjectRead = serde_json::from_value(read).expect("object fixture");
        let id = match &read {
            ObjectRead::Exists(details) => details.reference.object_id.clone(),
            ObjectRead::NotExists(id) => id.clone(),
            ObjectRead::Deleted(reference) => reference.object_id.clone(),
        };
        self.state.lock().unwrap().objects.insert(id, read);
        self
    }

    pub fn with_owned(self, owned: Value) -> Self {
        let owned: Vec<OwnedObjectInfo> = serde_json::from_value(owned).expect("owned fixture");
        self.state.lock().unwrap().owned = owned;
        self
    }

    pub fn operations(&self) -> Vec<String> {
        self.state.lock().unwrap().operations.clone()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn funded(&self) -> Vec<LedgerAddress> {
        self.state.lock().unwrap().funded.clone()
    }

    pub fn published_modules(&self) -> Vec<Vec<u8>> {
        self.state.lock().unwrap().published_modules.clone()
    }

    pub fn cursors_seen(&self) -> Vec<Option<ObjectId>> {
        self.state.lock().unwrap().cursors_seen.clone()
    }

    pub fn object_reads(&self) -> usize {
        self.operations().iter().filter(|operation| *operation == "get_object").count()
    }
}

fn success(events: Vec<Value>) -> TransactionResponse {
    TransactionResponse::from_json(json!({
        "effects": {
            "transactionEffectsDigest": "mock-digest",
            "effects": {"status": {"status": "success"}, "events": events}
        }
    }))
    .expect("mock response")
}

fn rejected(reason: &str) -> LedgerError {
    LedgerError::ExecutionFailed {
        error: reason.to_string(),
        digest: None,
    }
}

fn new_object(object_type: &str, object_id: &str, recipient: Value, sender: LedgerAddress) -> Value {
    json!({"newObject": {
        "packageId": PACKAGE_ID,
        "transactionModule": "ylabs_nft",
        "sender": sender,
        "recipient": recipient,
        "objectType": object_type,
        "objectId": object_id,
        "version": 1
    }})
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn request_funds(&self, address: LedgerAddress) -> Result<FaucetResponse, LedgerError> {
        let mut state = self.state.lock().unwrap();
        state.operations.push("fund".into());
        if state.failing.iter().any(|operation| operation == "fund") {
            return Err(LedgerError::FaucetRejected {
                message: "faucet drained".into(),
            });
        }
        state.funded.push(address);
        Ok(FaucetResponse::default())
    }

    async fn publish(&self, modules: &[Vec<u8>], signer: &Identity, _gas_budget: u64) -> Result<TransactionResponse, LedgerError> {
        let mut state = self.state.lock().unwrap();
        state.operations.push("publish".into());
        if state.failing.iter().any(|operation| operation == "publish") {
            return Err(rejected("InsufficientGas"));
        }
        state.published_modules.extend(modules.iter().cloned());
        let sender = signer.address();
        let events = state.publish_events.clone().unwrap_or_else(|| {
            vec![
                new_object(
                    &format!("{PACKAGE_ID}::ylabs_nft::Global"),
                    GLOBAL_ID,
                    json!({"Shared": {"initial_shared_version": 1}}),
                    sender,
                ),
                json!({"publish": {"sender": sender, "packageId": PACKAGE_ID}}),
            ]
        });
        Ok(success(events))
    }

    async fn call(&self, call: &MoveCall, signer: &Identity) -> Result<TransactionResponse, LedgerError> {
        let mut state = self.state.lock().unwrap();
        state.operations.push(call.function.clone());
        state.calls.push(RecordedCall {
            function: call.function.clone(),
            signer: signer.address(),
            arguments: call.arguments.clone(),
            gas_budget: call.gas_budget,
        });
        if state.failing.contains(&call.function) {
            return Err(rejected(&format!("MoveAbort in {}", call.function)));
        }

        let sender = signer.address();
        match call.function.as_str() {
            "add_merchant" => {
                let merchant = call
                    .arguments
                    .get(1)
                    .and_then(Value::as_str)
                    .and_then(|raw| LedgerAddress::parse(raw).ok())
                    .ok_or_else(|| rejected("EInvalidArgument"))?;
                state.merchants.push(merchant);
                Ok(success(vec![]))
            }
            "set_stock" | "redeem_request" => {
                if !state.merchants.contains(&sender) {
                    return Err(rejected("ENotMerchant"));
                }
                Ok(success(vec![]))
            }
            "airdrop" => {
                let events = state.airdrop_events.clone().unwrap_or_else(|| {
                    vec![new_object(TOKEN_TYPE, MINTED_ID, json!({"AddressOwner": sender}), sender)]
                });
                Ok(success(events))
            }
            _ => Ok(success(vec![])),
        }
    }

    async fn get_object(&self, id: &ObjectId) -> Result<ObjectRead, LedgerError> {
        let mut state = self.state.lock().unwrap();
        state.operations.push("get_object".into());
        Ok(state
            .objects
            .get(id)
            .cloned()
            .unwrap_or_else(|| ObjectRead::NotExists(id.clone())))
    }

    async fn get_dynamic_fields(&self, _container: &ObjectId, cursor: Option<&ObjectId>) -> Result<DynamicFieldPage, LedgerError> {
        let mut state = self.state.lock().unwrap();
        state.operations.push("get_dynamic_fields".into());
        state.cursors_seen.push(cursor.cloned());
        if state.endless_pages {
            return Ok(DynamicFieldPage {
                entries: Vec::new(),
                next_cursor: Some(ObjectId::parse("0x0e").unwrap()),
                has_more: true,
            });
        }
        Ok(state.pages.pop_front().unwrap_or(DynamicFieldPage {
            entries: Vec::new(),
            next_cursor: None,
            has_more: false,
        }))
    }

    async fn get_objects_owned_by(&self, _address: LedgerAddress) -> Result<Vec<OwnedObjectInfo>, LedgerError> {
        let mut state = self.state.lock().unwrap();
        state.operations.push("get_objects_owned_by".into());
        Ok(state.owned.clone())
    }
}
