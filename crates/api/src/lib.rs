//! MomentX ledger client utilities.
//!
//! This crate is the boundary between the demo and the remote ledger:
//!
//! - [`Identity`] holds a signing key pair and its derived address
//! - [`LedgerClient`] is the abstract remote interface (funding, publish,
//!   move calls, object reads, dynamic-field pages, owned-object listings)
//! - [`RpcLedgerClient`] implements it over JSON-RPC with `reqwest`
//! - [`validate_endpoint`] checks configured URLs before any request is sent
//!
//! Every response is decoded into the typed shapes of `momentx_types` here,
//! so callers never inspect raw JSON.
//!
//! # Example
//!
//! ```ignore
//! use momentx_api::{Identity, LedgerClient, RpcLedgerClient};
//!
//! # async fn demo() -> Result<(), momentx_api::LedgerError> {
//! let client = RpcLedgerClient::new("https://fullnode.devnet.example.io:443", None)?;
//! let admin = Identity::from_hex_seed("07".repeat(32).as_str())?;
//! let owned = client.get_objects_owned_by(admin.address()).await?;
//! println!("admin owns {} objects", owned.len());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use momentx_types::{DynamicFieldPage, ExecutionStatus, FaucetResponse, LedgerAddress, ObjectId, ObjectRead, OwnedObjectInfo, TransactionResponse};
use serde::Serialize;
use serde_json::Value;
use url::Url;

mod error;
mod identity;
mod rpc;

pub use error::LedgerError;
pub use identity::Identity;
pub use rpc::{DEFAULT_REQUEST_TIMEOUT, RpcLedgerClient};

/// Hostnames allowed for local development regardless of scheme.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1", "0.0.0.0"];

/// A move function invocation on a published package.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCall {
    pub package: ObjectId,
    pub module: String,
    pub function: String,
    pub type_arguments: Vec<String>,
    /// Positional arguments in the JSON form the node accepts.
    pub arguments: Vec<Value>,
    pub gas_budget: u64,
}

/// Remote interface to the ledger.
///
/// Implementations perform one remote call per method and decode the reply
/// before returning it. Executed transactions whose effects report a failure
/// status are returned as [`LedgerError::ExecutionFailed`].
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Ask the faucet to fund `address` with gas coins.
    async fn request_funds(&self, address: LedgerAddress) -> Result<FaucetResponse, LedgerError>;

    /// Publish compiled modules, signed and paid for by `signer`.
    async fn publish(&self, modules: &[Vec<u8>], signer: &Identity, gas_budget: u64) -> Result<TransactionResponse, LedgerError>;

    /// Execute a move call signed by `signer`.
    async fn call(&self, call: &MoveCall, signer: &Identity) -> Result<TransactionResponse, LedgerError>;

    async fn get_object(&self, id: &ObjectId) -> Result<ObjectRead, LedgerError>;

    /// Fetch one page of a dynamic-field container. `cursor` is `None` for the first page.
    async fn get_dynamic_fields(&self, container: &ObjectId, cursor: Option<&ObjectId>) -> Result<DynamicFieldPage, LedgerError>;

    async fn get_objects_owned_by(&self, address: LedgerAddress) -> Result<Vec<OwnedObjectInfo>, LedgerError>;
}

/// Convert a failed execution status into [`LedgerError::ExecutionFailed`].
pub fn check_status(response: &TransactionResponse) -> Result<(), LedgerError> {
    match &response.effects.status {
        ExecutionStatus::Success => Ok(()),
        ExecutionStatus::Failure { error } => Err(LedgerError::ExecutionFailed {
            error: error.clone(),
            digest: response.digest.clone(),
        }),
    }
}

/// Validate that an endpoint URL is acceptable for use by the client.
///
/// Rules:
/// - `localhost`, `127.0.0.1` or `0.0.0.0`: any scheme is allowed
/// - otherwise: scheme must be HTTPS
pub fn validate_endpoint(raw: &str) -> Result<Url, LedgerError> {
    let parsed = Url::parse(raw.trim()).map_err(|error| LedgerError::invalid_endpoint(raw, error.to_string()))?;

    let host_name = parsed
        .host_str()
        .ok_or_else(|| LedgerError::invalid_endpoint(raw, "URL must include a host"))?;

    if LOCALHOST_DOMAINS
        .iter()
        .any(|&allowed| host_name.eq_ignore_ascii_case(allowed))
    {
        return Ok(parsed);
    }

    if parsed.scheme() != "https" {
        return Err(LedgerError::invalid_endpoint(
            raw,
            format!("non-local endpoints must use https; got '{}://'", parsed.scheme()),
        ));
    }

    Ok(parsed)
}
