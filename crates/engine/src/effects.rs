//! Identifier extraction from transaction effects.

use std::fmt;

use momentx_types::{ObjectId, PublishResult, TransactionResponse};
use tracing::warn;

use crate::WorkflowError;

/// Locate the published package and the shared object its initializer created.
///
/// The module id comes from the `Publish` event; the global object is the
/// first `NewObject` event owned as shared by that same package.
pub fn extract_publish_result(response: &TransactionResponse) -> Result<PublishResult, WorkflowError> {
    let module_id = response
        .published_package()
        .cloned()
        .ok_or_else(|| malformed(response, "publish response has no package publish event"))?;

    let global_object_id = response
        .new_objects()
        .find(|created| created.recipient.is_shared() && created.package_id == module_id)
        .map(|created| created.object_id.clone())
        .ok_or_else(|| malformed(response, format!("publish response has no shared object created by package {module_id}")))?;

    Ok(PublishResult {
        module_id,
        global_object_id,
    })
}

/// Id of the object created with exactly `object_type`.
///
/// When several created objects share the type the first one in response
/// order is returned.
pub fn extract_created_object(response: &TransactionResponse, object_type: &str) -> Result<ObjectId, WorkflowError> {
    let mut matching = response.new_objects().filter(|created| created.object_type == object_type);
    let first = matching
        .next()
        .ok_or_else(|| malformed(response, format!("response has no created object of type {object_type}")))?;

    let extra = matching.count();
    if extra > 0 {
        warn!(
            %object_type,
            chosen = %first.object_id,
            ignored = extra,
            "several created objects match; using the first in response order"
        );
    }
    Ok(first.object_id.clone())
}

fn malformed(response: &TransactionResponse, message: impl fmt::Display) -> WorkflowError {
    WorkflowError::malformed(format!("{message}; response: {}", response.raw))
}
