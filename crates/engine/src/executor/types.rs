//! Core executor data types.

use chrono::{DateTime, Utc};
use momentx_types::{FaucetResponse, ObjectId, PublishResult, TransactionResponse};
use serde::Serialize;

use crate::{WorkflowError, model::Role, resolve::RunContext};

/// Status of an executed step.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Step executed and the ledger reported success.
    Succeeded,
    /// Step attempted but the call or its result handling failed.
    Failed,
}

/// Result of running a step.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResult {
    /// Step name.
    pub name: String,
    /// Role that signed the call.
    pub actor: Role,
    pub status: StepStatus,
    /// Raw ledger response, when the call returned one.
    pub response: Option<TransactionResponse>,
    /// Identifier captured by the step's extraction, if any.
    pub extracted_id: Option<ObjectId>,
    /// Error text for failed steps.
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

/// A step that did not complete.
///
/// `response` is present when the ledger answered but the transaction failed
/// or its effects lacked the expected output.
#[derive(Debug)]
pub struct StepFailure {
    pub error: WorkflowError,
    pub response: Option<TransactionResponse>,
}

impl StepFailure {
    pub fn with_response(error: impl Into<WorkflowError>, response: TransactionResponse) -> Self {
        Self {
            error: error.into(),
            response: Some(response),
        }
    }
}

impl From<WorkflowError> for StepFailure {
    fn from(error: WorkflowError) -> Self {
        Self { error, response: None }
    }
}

impl From<momentx_api::LedgerError> for StepFailure {
    fn from(error: momentx_api::LedgerError) -> Self {
        WorkflowError::from(error).into()
    }
}

/// Everything a successful run produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowReport {
    pub funding: Vec<FaucetResponse>,
    pub publish: PublishResult,
    pub steps: Vec<StepResult>,
    pub context: RunContext,
}

impl WorkflowReport {
    pub fn minted_object_id(&self) -> Option<&ObjectId> {
        self.context.minted_object_id.as_ref()
    }
}
