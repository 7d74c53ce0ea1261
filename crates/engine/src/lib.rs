//! # MomentX Engine
//!
//! Drives the MomentX demo against a ledger: publishes the `ylabs_nft` module,
//! walks the merchant onboarding and redemption sequence, and reads back the
//! resulting on-chain state.
//!
//! ## Architecture
//!
//! - **`model`**: roles, identities, call arguments, workflow steps and the fixed interaction plan
//! - **`resolve`**: the run context that threads produced identifiers into later steps
//! - **`effects`**: extraction of published and created object ids from transaction effects
//! - **`executor`**: publish, single-step execution, and the sequential runner
//! - **`query`**: read-only state queries with bounded pagination
//!
//! ## Usage
//!
//! ```rust,no_run
//! # async fn demo(client: &dyn momentx_api::LedgerClient, identities: momentx_engine::Identities, bytecode: Vec<u8>)
//! # -> Result<(), momentx_engine::WorkflowError> {
//! use momentx_engine::{DemoWorkflowRunner, StateQuery, WorkflowSettings};
//!
//! let mut runner = DemoWorkflowRunner::new(client, &identities, WorkflowSettings::default());
//! let report = runner.run(&[bytecode], true).await?;
//! let snapshot = StateQuery::new(client)
//!     .collect(&report.publish, identities.user.address(), runner.settings())
//!     .await?;
//! println!("{} tokens registered", snapshot.tokens.entries.len());
//! # Ok(())
//! # }
//! ```

pub mod effects;
pub mod error;
pub mod executor;
pub mod model;
pub mod query;
pub mod resolve;

#[cfg(test)]
mod test_support;

pub use error::WorkflowError;
pub use executor::{DemoWorkflowRunner, StepFailure, StepObserver, StepResult, StepStatus, WorkflowReport, publish_module, run_step};
pub use model::{CallArg, DEFAULT_GAS_BUDGET, Extraction, Identities, Role, WorkflowSettings, WorkflowStep, interaction_plan};
pub use query::{ContainerListing, GlobalState, MAX_PAGE_FETCHES, ResolvedEntry, StateQuery, StateSnapshot};
pub use resolve::RunContext;
