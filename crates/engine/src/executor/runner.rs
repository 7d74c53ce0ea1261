//! Sequential demo workflow runner.
//!
//! The runner funds the identities, publishes the module, and then issues the
//! interaction plan strictly in order. Each step awaits its ledger call before
//! the next one starts; the first failure stops the run and is returned with
//! the failing step's name. Nothing is retried or rolled back.

use std::time::Instant;

use chrono::Utc;
use momentx_api::LedgerClient;
use momentx_types::{FaucetResponse, PublishResult};
use tracing::{error, info};

use crate::{
    WorkflowError,
    model::{Identities, Role, WorkflowSettings, WorkflowStep, interaction_plan},
    resolve::RunContext,
};

use super::{StepFailure, StepResult, StepStatus, WorkflowReport, publish_module, run_step};

/// Callback invoked with every step outcome, successful or not.
pub type StepObserver<'a> = Box<dyn FnMut(&StepResult) + Send + 'a>;

/// Drives the demo against a [`LedgerClient`].
pub struct DemoWorkflowRunner<'a> {
    client: &'a dyn LedgerClient,
    identities: &'a Identities,
    settings: WorkflowSettings,
    observer: Option<StepObserver<'a>>,
}

impl<'a> DemoWorkflowRunner<'a> {
    pub fn new(client: &'a dyn LedgerClient, identities: &'a Identities, settings: WorkflowSettings) -> Self {
        Self {
            client,
            identities,
            settings,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: impl FnMut(&StepResult) + Send + 'a) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn settings(&self) -> &WorkflowSettings {
        &self.settings
    }

    /// Request faucet gas for every identity, admin first.
    pub async fn fund_identities(&self) -> Result<Vec<FaucetResponse>, WorkflowError> {
        let mut funding = Vec::with_capacity(Role::ALL.len());
        for role in Role::ALL {
            let address = self.identities.get(role).address();
            let response = self
                .client
                .request_funds(address)
                .await
                .map_err(|error| WorkflowError::from(error).in_step(format!("fund {role}")))?;
            info!(
                %role,
                %address,
                coins = response.transferred_gas_objects.len(),
                response = %serde_json::to_string(&response).unwrap_or_default(),
                "identity funded"
            );
            funding.push(response);
        }
        Ok(funding)
    }

    /// Publish the module as the admin identity.
    pub async fn publish(&self, modules: &[Vec<u8>]) -> Result<PublishResult, WorkflowError> {
        publish_module(self.client, modules, &self.identities.admin, self.settings.gas_budget)
            .await
            .map_err(|error| error.in_step("publish"))
    }

    /// Execute `plan` in order, stopping at the first failure.
    pub async fn run_plan(&mut self, plan: &[WorkflowStep], run_context: &mut RunContext) -> Result<Vec<StepResult>, WorkflowError> {
        let mut results = Vec::with_capacity(plan.len());
        for (index, step) in plan.iter().enumerate() {
            info!(index, step = %step.name, total = plan.len(), "step started");
            let started_at = Utc::now();
            let timer = Instant::now();

            match run_step(step, run_context, self.identities, self.client, self.settings.gas_budget).await {
                Ok(result) => {
                    info!(step = %step.name, duration_ms = result.duration_ms, "step succeeded");
                    self.notify(&result);
                    results.push(result);
                }
                Err(StepFailure { error: failure, response }) => {
                    error!(step = %step.name, error = %failure, "step failed; aborting remaining steps");
                    let failed = StepResult {
                        name: step.name.clone(),
                        actor: step.actor,
                        status: StepStatus::Failed,
                        response,
                        extracted_id: None,
                        error: Some(failure.to_string()),
                        started_at,
                        duration_ms: timer.elapsed().as_millis().try_into().unwrap_or(u64::MAX),
                    };
                    self.notify(&failed);
                    return Err(failure.in_step(step.name.clone()));
                }
            }
        }
        Ok(results)
    }

    /// Full demo: optional funding, publish, then the fixed interaction plan.
    pub async fn run(&mut self, modules: &[Vec<u8>], fund: bool) -> Result<WorkflowReport, WorkflowError> {
        let funding = if fund { self.fund_identities().await? } else { Vec::new() };

        let publish = self.publish(modules).await?;
        let mut run_context = RunContext::new(self.identities.addresses());
        run_context.record_publish(&publish)?;

        let plan = interaction_plan(&self.settings);
        let steps = self.run_plan(&plan, &mut run_context).await?;

        Ok(WorkflowReport {
            funding,
            publish,
            steps,
            context: run_context,
        })
    }

    fn notify(&mut self, result: &StepResult) {
        if let Some(observer) = self.observer.as_mut() {
            observer(result);
        }
    }
}
