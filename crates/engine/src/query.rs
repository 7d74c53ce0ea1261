//! Read-only queries over the deployed module's state.
//!
//! Run after the workflow to show what it left behind: the merchant set held
//! by the global object, every token registered in the global NFT table, and
//! the tokens a given address owns.

use momentx_api::LedgerClient;
use momentx_types::{DynamicFieldInfo, LedgerAddress, ObjectId, ObjectRead, OwnedObjectInfo, PublishResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{WorkflowError, model::WorkflowSettings};

/// Upper bound on page fetches for a single container enumeration.
pub const MAX_PAGE_FETCHES: usize = 1000;

/// Projection of the global object's fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalState {
    pub merchants: Vec<LedgerAddress>,
    /// Dynamic-field container holding the minted tokens.
    pub nft_table_id: ObjectId,
}

#[derive(Deserialize)]
struct GlobalFields {
    merchants: Wrapped<MerchantSet>,
    nfts: Wrapped<TableFields>,
}

#[derive(Deserialize)]
struct Wrapped<T> {
    fields: T,
}

#[derive(Deserialize)]
struct MerchantSet {
    #[serde(default)]
    contents: Vec<LedgerAddress>,
}

#[derive(Deserialize)]
struct TableFields {
    id: UidField,
}

#[derive(Deserialize)]
struct UidField {
    id: ObjectId,
}

/// Container entry together with the object it references.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedEntry {
    pub entry: DynamicFieldInfo,
    pub object: ObjectRead,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerListing {
    pub entries: Vec<ResolvedEntry>,
    /// Number of pages fetched.
    pub pages: usize,
}

/// Everything the post-run queries read.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub global_object: ObjectRead,
    pub global_state: GlobalState,
    pub tokens: ContainerListing,
    pub owner: LedgerAddress,
    pub owned_tokens: Vec<OwnedObjectInfo>,
}

pub struct StateQuery<'a> {
    client: &'a dyn LedgerClient,
    max_pages: usize,
}

impl<'a> StateQuery<'a> {
    pub fn new(client: &'a dyn LedgerClient) -> Self {
        Self {
            client,
            max_pages: MAX_PAGE_FETCHES,
        }
    }

    pub fn with_page_limit(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Read the global object and decode its merchant set and token table id.
    pub async fn global_state(&self, global_object_id: &ObjectId) -> Result<(ObjectRead, GlobalState), WorkflowError> {
        let read = self.client.get_object(global_object_id).await?;
        debug!(object = ?read, "global object");

        let data = read
            .details()
            .and_then(|details| details.move_object())
            .ok_or_else(|| WorkflowError::malformed(format!("global object {global_object_id} is not a live Move object")))?;
        let fields: GlobalFields = serde_json::from_value(data.fields.clone())
            .map_err(|error| WorkflowError::malformed(format!("global object {global_object_id} fields: {error}")))?;

        let state = GlobalState {
            merchants: fields.merchants.fields.contents,
            nft_table_id: fields.nfts.fields.id.id,
        };
        info!(merchants = state.merchants.len(), nft_table = %state.nft_table_id, "read global state");
        Ok((read, state))
    }

    /// Page through `container` and resolve the object behind every entry.
    ///
    /// Stops when a page reports `has_more == false`. A page that claims more
    /// entries without a cursor is malformed.
    pub async fn enumerate_container(&self, container: &ObjectId) -> Result<ContainerListing, WorkflowError> {
        let mut entries = Vec::new();
        let mut cursor: Option<ObjectId> = None;
        let mut pages = 0;

        loop {
            if pages >= self.max_pages {
                return Err(WorkflowError::PageLimitExceeded {
                    container: container.clone(),
                    limit: self.max_pages,
                });
            }
            let page = self.client.get_dynamic_fields(container, cursor.as_ref()).await?;
            pages += 1;
            info!(%container, page = pages, entries = page.entries.len(), has_more = page.has_more, "fetched container page");

            for entry in page.entries {
                let object_id = entry.referenced_object_id();
                let object = self.client.get_object(&object_id).await?;
                debug!(%object_id, object = ?object, "resolved container entry");
                entries.push(ResolvedEntry { entry, object });
            }

            if !page.has_more {
                break;
            }
            let next = page.next_cursor.ok_or_else(|| {
                WorkflowError::malformed(format!("page {pages} of container {container} reports more entries but no cursor"))
            })?;
            cursor = Some(next);
        }

        Ok(ContainerListing { entries, pages })
    }

    /// Objects owned by `owner` whose type equals `object_type` exactly.
    pub async fn owned_objects_of_type(&self, owner: LedgerAddress, object_type: &str) -> Result<Vec<OwnedObjectInfo>, WorkflowError> {
        let owned = self.client.get_objects_owned_by(owner).await?;
        let total = owned.len();
        let matching: Vec<_> = owned.into_iter().filter(|object| object.object_type == object_type).collect();
        info!(%owner, %object_type, total, matching = matching.len(), "filtered owned objects");
        Ok(matching)
    }

    /// Run every query for a published deployment.
    pub async fn collect(
        &self,
        publish: &PublishResult,
        owner: LedgerAddress,
        settings: &WorkflowSettings,
    ) -> Result<StateSnapshot, WorkflowError> {
        let (global_object, global_state) = self.global_state(&publish.global_object_id).await?;
        let tokens = self.enumerate_container(&global_state.nft_table_id).await?;
        let token_type = publish.qualified_type(&settings.module_name, &settings.token_struct);
        let owned_tokens = self.owned_objects_of_type(owner, &token_type).await?;
        Ok(StateSnapshot {
            global_object,
            global_state,
            tokens,
            owner,
            owned_tokens,
        })
    }
}
