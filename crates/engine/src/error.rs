//! Error types for the demo workflow.

use momentx_api::LedgerError;
use momentx_types::ObjectId;
use thiserror::Error;

/// Failure raised while configuring, running, or querying the workflow.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("configuration error: {field}: {reason}")]
    Configuration { field: String, reason: String },

    #[error("malformed ledger response: {0}")]
    MalformedResponse(String),

    #[error("ledger call failed: {0}")]
    LedgerCall(#[from] LedgerError),

    #[error("step '{step}' needs the {output} before it has been produced")]
    MissingOutput { step: String, output: &'static str },

    #[error("{output} was already recorded as {existing}")]
    OutputAlreadyRecorded { output: &'static str, existing: ObjectId },

    #[error("container {container} still reported more entries after {limit} pages")]
    PageLimitExceeded { container: ObjectId, limit: usize },

    #[error("step '{step}' failed: {source}")]
    Step {
        step: String,
        #[source]
        source: Box<WorkflowError>,
    },
}

impl WorkflowError {
    pub fn configuration(field: impl Into<String>, reason: impl ToString) -> Self {
        Self::Configuration {
            field: field.into(),
            reason: reason.to_string(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// Attach the failing step's name.
    pub fn in_step(self, step: impl Into<String>) -> Self {
        Self::Step {
            step: step.into(),
            source: Box::new(self),
        }
    }

    /// Name of the step that failed, if the error came out of the runner.
    pub fn failed_step(&self) -> Option<&str> {
        match self {
            Self::Step { step, .. } => Some(step),
            _ => None,
        }
    }

    /// The underlying error with step context stripped.
    pub fn root(&self) -> &WorkflowError {
        match self {
            Self::Step { source, .. } => source.root(),
            other => other,
        }
    }
}
