//! Module publication.

use momentx_api::{Identity, LedgerClient, check_status};
use momentx_types::PublishResult;
use tracing::info;

use crate::{WorkflowError, effects::extract_publish_result};

/// Publish compiled modules and return the package and global object ids.
///
/// Fails with [`WorkflowError::MalformedResponse`] when the response lacks the
/// publish event or the shared object created by the module initializer.
pub async fn publish_module(
    client: &dyn LedgerClient,
    modules: &[Vec<u8>],
    signer: &Identity,
    gas_budget: u64,
) -> Result<PublishResult, WorkflowError> {
    info!(modules = modules.len(), publisher = %signer.address(), "publishing module");
    let response = client.publish(modules, signer, gas_budget).await?;
    info!(response = %response.raw, "publish response");
    check_status(&response)?;

    let publish = extract_publish_result(&response)?;
    info!(module_id = %publish.module_id, global_object_id = %publish.global_object_id, "module published");
    Ok(publish)
}
