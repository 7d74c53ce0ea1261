//! Execution engine: publishes the module, issues the workflow steps one at a
//! time, and records the identifiers each step produces.
//!
//! - `publish::publish_module` submits the bytecode and extracts the package and global object ids
//! - `step_once::run_step` executes a single [`WorkflowStep`](crate::model::WorkflowStep)
//! - `runner::DemoWorkflowRunner` sequences funding, publish and the interaction plan

pub mod publish;
pub mod runner;
pub mod step_once;
pub mod types;

pub use publish::publish_module;
pub use runner::{DemoWorkflowRunner, StepObserver};
pub use step_once::run_step;
pub use types::{StepFailure, StepResult, StepStatus, WorkflowReport};
