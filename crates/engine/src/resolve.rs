//! Run-time context and argument resolution.
//!
//! [`RunContext`] carries the identifiers produced while the workflow runs.
//! Each identifier is written exactly once; later steps read them when their
//! [`CallArg`]s are resolved.

use indexmap::IndexMap;
use momentx_types::{LedgerAddress, ObjectId, PublishResult};
use serde::Serialize;
use serde_json::Value;

use crate::{
    WorkflowError,
    model::{CallArg, Role},
};

/// Identifiers threaded between workflow steps.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunContext {
    /// Package id of the published module.
    pub module_id: Option<ObjectId>,
    /// Shared object created by the module initializer.
    pub global_object_id: Option<ObjectId>,
    /// Token captured from the airdrop response.
    pub minted_object_id: Option<ObjectId>,
    /// Address of each demo identity.
    pub addresses: IndexMap<Role, LedgerAddress>,
}

impl RunContext {
    pub fn new(addresses: IndexMap<Role, LedgerAddress>) -> Self {
        Self {
            addresses,
            ..Default::default()
        }
    }

    /// Context for a module that has already been published.
    pub fn for_published(publish: &PublishResult, addresses: IndexMap<Role, LedgerAddress>) -> Self {
        Self {
            module_id: Some(publish.module_id.clone()),
            global_object_id: Some(publish.global_object_id.clone()),
            minted_object_id: None,
            addresses,
        }
    }

    pub fn record_publish(&mut self, publish: &PublishResult) -> Result<(), WorkflowError> {
        set_once(&mut self.module_id, "module id", publish.module_id.clone())?;
        set_once(&mut self.global_object_id, "global object id", publish.global_object_id.clone())
    }

    pub fn record_minted(&mut self, object_id: ObjectId) -> Result<(), WorkflowError> {
        set_once(&mut self.minted_object_id, "minted object id", object_id)
    }

    pub fn require_module_id(&self, step: &str) -> Result<&ObjectId, WorkflowError> {
        self.module_id.as_ref().ok_or_else(|| missing(step, "module id"))
    }

    /// Resolve a step argument into the JSON form sent to the ledger.
    pub fn resolve_argument(&self, step: &str, argument: &CallArg) -> Result<Value, WorkflowError> {
        let resolved = match argument {
            CallArg::Literal(value) => value.clone(),
            CallArg::GlobalObject => {
                let id = self.global_object_id.as_ref().ok_or_else(|| missing(step, "global object id"))?;
                Value::String(id.to_string())
            }
            CallArg::MintedObject => {
                let id = self.minted_object_id.as_ref().ok_or_else(|| missing(step, "minted object id"))?;
                Value::String(id.to_string())
            }
            CallArg::AddressOf(role) => {
                let address = self.addresses.get(role).ok_or_else(|| missing(step, role_address(*role)))?;
                Value::String(address.to_string())
            }
        };
        Ok(resolved)
    }

    pub fn resolve_arguments(&self, step: &str, arguments: &[CallArg]) -> Result<Vec<Value>, WorkflowError> {
        arguments.iter().map(|argument| self.resolve_argument(step, argument)).collect()
    }
}

fn set_once(slot: &mut Option<ObjectId>, output: &'static str, value: ObjectId) -> Result<(), WorkflowError> {
    if let Some(existing) = slot {
        return Err(WorkflowError::OutputAlreadyRecorded {
            output,
            existing: existing.clone(),
        });
    }
    *slot = Some(value);
    Ok(())
}

fn missing(step: &str, output: &'static str) -> WorkflowError {
    WorkflowError::MissingOutput {
        step: step.to_string(),
        output,
    }
}

fn role_address(role: Role) -> &'static str {
    match role {
        Role::Admin => "admin address",
        Role::Merchant => "merchant address",
        Role::User => "user address",
    }
}
