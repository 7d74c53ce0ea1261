//! Single-step execution helpers.

use std::time::Instant;

use chrono::Utc;
use momentx_api::{LedgerClient, MoveCall, check_status};
use momentx_types::{ObjectId, TransactionResponse};
use tracing::info;

use crate::{
    WorkflowError,
    effects::extract_created_object,
    model::{Extraction, Identities, WorkflowStep},
    resolve::RunContext,
};

use super::{StepFailure, StepResult, StepStatus};

/// Execute one workflow step against the ledger.
///
/// Arguments are resolved from `run_context` immediately before the call and
/// any extracted identifier is recorded back into it. Errors are returned
/// without step context; the runner attaches the step name. A failure after
/// the ledger answered keeps that response.
pub async fn run_step(
    step: &WorkflowStep,
    run_context: &mut RunContext,
    identities: &Identities,
    client: &dyn LedgerClient,
    gas_budget: u64,
) -> Result<StepResult, StepFailure> {
    let started_at = Utc::now();
    let timer = Instant::now();

    let package = run_context.require_module_id(&step.name)?.clone();
    let arguments = run_context.resolve_arguments(&step.name, &step.arguments)?;
    let call = MoveCall {
        package,
        module: step.module.clone(),
        function: step.function.clone(),
        type_arguments: step.type_arguments.clone(),
        arguments,
        gas_budget,
    };
    let signer = identities.get(step.actor);
    info!(step = %step.name, actor = %step.actor, signer = %signer.address(), "executing move call");

    let response = client.call(&call, signer).await?;
    info!(step = %step.name, response = %response.raw, "move call response");

    let extracted_id = match capture_output(step, &call, &response, run_context) {
        Ok(extracted_id) => extracted_id,
        Err(error) => return Err(StepFailure::with_response(error, response)),
    };

    Ok(StepResult {
        name: step.name.clone(),
        actor: step.actor,
        status: StepStatus::Succeeded,
        response: Some(response),
        extracted_id,
        error: None,
        started_at,
        duration_ms: timer.elapsed().as_millis().try_into().unwrap_or(u64::MAX),
    })
}

fn capture_output(
    step: &WorkflowStep,
    call: &MoveCall,
    response: &TransactionResponse,
    run_context: &mut RunContext,
) -> Result<Option<ObjectId>, WorkflowError> {
    check_status(response)?;
    let Some(Extraction::CreatedObject { type_suffix }) = &step.extract else {
        return Ok(None);
    };
    let object_type = format!("{}::{}", call.package, type_suffix);
    let object_id = extract_created_object(response, &object_type)?;
    run_context.record_minted(object_id.clone())?;
    info!(step = %step.name, %object_id, "captured created object");
    Ok(Some(object_id))
}
