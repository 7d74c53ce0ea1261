//! JSON-RPC implementation of [`LedgerClient`].
//!
//! Transactions are built by the full node (`sui_moveCall`, `sui_publish`),
//! signed locally by the acting [`Identity`] and submitted with
//! `sui_executeTransaction`, waiting for local execution.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use momentx_types::{DynamicFieldPage, FaucetResponse, LedgerAddress, ObjectId, ObjectRead, OwnedObjectInfo, TransactionResponse};
use reqwest::{Client, header};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tracing::{debug, info, warn};
use url::Url;

use crate::{Identity, LedgerClient, LedgerError, MoveCall, check_status, validate_endpoint};

/// Default timeout applied to every HTTP request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const SIGNATURE_SCHEME: &str = "ED25519";
const EXECUTE_REQUEST_TYPE: &str = "WaitForLocalExecution";

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionBytes {
    tx_bytes: String,
}

/// Ledger client speaking JSON-RPC to a full node, with an optional faucet.
#[derive(Debug)]
pub struct RpcLedgerClient {
    rpc_url: Url,
    faucet_url: Option<Url>,
    http: Client,
    next_request_id: AtomicU64,
}

impl RpcLedgerClient {
    /// Build a client after validating both endpoints.
    pub fn new(rpc_url: &str, faucet_url: Option<&str>) -> Result<Self, LedgerError> {
        Self::with_timeout(rpc_url, faucet_url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(rpc_url: &str, faucet_url: Option<&str>, timeout: Duration) -> Result<Self, LedgerError> {
        let rpc_url = validate_endpoint(rpc_url)?;
        let faucet_url = faucet_url.map(validate_endpoint).transpose()?;

        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        default_headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(concat!("momentx-demo/", env!("CARGO_PKG_VERSION"))),
        );

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(timeout)
            .build()
            .map_err(|source| LedgerError::transport("client setup", source))?;

        Ok(Self {
            rpc_url,
            faucet_url,
            http,
            next_request_id: AtomicU64::new(1),
        })
    }

    pub fn has_faucet(&self) -> bool {
        self.faucet_url.is_some()
    }

    async fn rpc<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, LedgerError> {
        let id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };
        debug!(%method, id, url = %self.rpc_url, "sending rpc request");

        let response = self
            .http
            .post(self.rpc_url.clone())
            .json(&request)
            .send()
            .await
            .map_err(|source| LedgerError::transport(method, source))?;
        let status = response.status();
        let text = response.text().await.map_err(|source| LedgerError::transport(method, source))?;
        if !status.is_success() {
            return Err(LedgerError::Http {
                method: method.to_string(),
                status: status.as_u16(),
                body: text,
            });
        }

        let result = decode_rpc_result(method, &text)?;
        serde_json::from_value(result).map_err(|error| LedgerError::decode(method, error))
    }

    async fn execute(&self, unsigned: TransactionBytes, signer: &Identity) -> Result<TransactionResponse, LedgerError> {
        let params = execute_params(&unsigned, signer)?;
        let raw: Value = self.rpc("sui_executeTransaction", params).await?;
        let response =
            TransactionResponse::from_json(raw).map_err(|error| LedgerError::decode("sui_executeTransaction", error))?;
        debug!(digest = ?response.digest, events = response.effects.events.len(), "transaction executed");
        if let Err(error) = check_status(&response) {
            warn!(digest = ?response.digest, response = %response.raw, "transaction failed");
            return Err(error);
        }
        Ok(response)
    }
}

/// `sui_publish` parameters: sender, base64 modules, gas object (node picks), budget.
fn publish_params(sender: LedgerAddress, modules: &[Vec<u8>], gas_budget: u64) -> Value {
    let compiled_modules: Vec<String> = modules.iter().map(|module| BASE64.encode(module)).collect();
    json!([sender, compiled_modules, Value::Null, gas_budget])
}

/// `sui_moveCall` parameters in the node's positional order.
fn move_call_params(sender: LedgerAddress, call: &MoveCall) -> Value {
    json!([
        sender,
        call.package,
        call.module,
        call.function,
        call.type_arguments,
        call.arguments,
        Value::Null,
        call.gas_budget,
    ])
}

/// Sign the node-built transaction bytes and lay out `sui_executeTransaction` parameters.
fn execute_params(unsigned: &TransactionBytes, signer: &Identity) -> Result<Value, LedgerError> {
    let tx_bytes = BASE64
        .decode(&unsigned.tx_bytes)
        .map_err(|error| LedgerError::decode("sui_executeTransaction", error))?;
    let signature = signer.sign(&tx_bytes);
    Ok(json!([
        unsigned.tx_bytes,
        SIGNATURE_SCHEME,
        BASE64.encode(signature),
        BASE64.encode(signer.public_key_bytes()),
        EXECUTE_REQUEST_TYPE,
    ]))
}

/// Extract `result` from a JSON-RPC reply, surfacing the `error` object if present.
fn decode_rpc_result(method: &str, body: &str) -> Result<Value, LedgerError> {
    let envelope: RpcResponse = serde_json::from_str(body).map_err(|error| LedgerError::decode(method, error))?;
    if let Some(error) = envelope.error {
        return Err(LedgerError::Rpc {
            method: method.to_string(),
            code: error.code,
            message: error.message,
        });
    }
    Ok(envelope.result.unwrap_or(Value::Null))
}

fn faucet_gas_url(faucet_url: &Url) -> String {
    format!("{}/gas", faucet_url.as_str().trim_end_matches('/'))
}

#[async_trait]
impl LedgerClient for RpcLedgerClient {
    async fn request_funds(&self, address: LedgerAddress) -> Result<FaucetResponse, LedgerError> {
        let faucet_url = self.faucet_url.as_ref().ok_or(LedgerError::FaucetUnavailable)?;
        let url = faucet_gas_url(faucet_url);
        info!(%address, %url, "requesting gas from faucet");

        let response = self
            .http
            .post(&url)
            .json(&json!({ "FixedAmountRequest": { "recipient": address } }))
            .send()
            .await
            .map_err(|source| LedgerError::transport("faucet", source))?;
        let status = response.status();
        let text = response.text().await.map_err(|source| LedgerError::transport("faucet", source))?;
        if !status.is_success() {
            return Err(LedgerError::Http {
                method: "faucet".into(),
                status: status.as_u16(),
                body: text,
            });
        }

        let funded: FaucetResponse = serde_json::from_str(&text).map_err(|error| LedgerError::decode("faucet", error))?;
        if let Some(message) = funded.error.clone() {
            return Err(LedgerError::FaucetRejected { message });
        }
        Ok(funded)
    }

    async fn publish(&self, modules: &[Vec<u8>], signer: &Identity, gas_budget: u64) -> Result<TransactionResponse, LedgerError> {
        let unsigned: TransactionBytes = self.rpc("sui_publish", publish_params(signer.address(), modules, gas_budget)).await?;
        self.execute(unsigned, signer).await
    }

    async fn call(&self, call: &MoveCall, signer: &Identity) -> Result<TransactionResponse, LedgerError> {
        let unsigned: TransactionBytes = self.rpc("sui_moveCall", move_call_params(signer.address(), call)).await?;
        self.execute(unsigned, signer).await
    }

    async fn get_object(&self, id: &ObjectId) -> Result<ObjectRead, LedgerError> {
        self.rpc("sui_getObject", json!([id])).await
    }

    async fn get_dynamic_fields(&self, container: &ObjectId, cursor: Option<&ObjectId>) -> Result<DynamicFieldPage, LedgerError> {
        self.rpc("sui_getDynamicFields", json!([container, cursor, Value::Null])).await
    }

    async fn get_objects_owned_by(&self, address: LedgerAddress) -> Result<Vec<OwnedObjectInfo>, LedgerError> {
        self.rpc("sui_getObjectsOwnedByAddress", json!([address])).await
    }
}
