//! Error types for ledger access.

use thiserror::Error;

/// Failure raised by an identity or a ledger client call.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("invalid key pair seed: {reason}")]
    InvalidSeed { reason: String },

    #[error("invalid endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("no faucet endpoint configured")]
    FaucetUnavailable,

    #[error("faucet rejected funding request: {message}")]
    FaucetRejected { message: String },

    #[error("network error calling {method}: {source}")]
    Transport {
        method: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} from {method}: {body}")]
    Http { method: String, status: u16, body: String },

    #[error("RPC error {code} from {method}: {message}")]
    Rpc { method: String, code: i64, message: String },

    #[error("could not decode {method} response: {message}")]
    Decode { method: String, message: String },

    #[error("transaction failed: {error}")]
    ExecutionFailed { error: String, digest: Option<String> },
}

impl LedgerError {
    pub fn invalid_seed(reason: impl Into<String>) -> Self {
        Self::InvalidSeed { reason: reason.into() }
    }

    pub fn invalid_endpoint(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn transport(method: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            method: method.into(),
            source,
        }
    }

    pub fn decode(method: impl Into<String>, message: impl ToString) -> Self {
        Self::Decode {
            method: method.into(),
            message: message.to_string(),
        }
    }
}
