use ecclesia_application::{EmptyBinReport, RestoredEntity};
use ecclesia_domain::RecycleBinItem;
use serde::Serialize;
use serde_json::Value;
use ts_rs::TS;

use super::{RecordResponse, UserProfileResponse};

/// API representation of a recycle-bin envelope.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/recycle-bin-item-response.ts"
)]
pub struct RecycleBinItemResponse {
    pub id: String,
    pub original_id: String,
    #[serde(rename = "type")]
    pub type_tag: String,
    #[ts(type = "Record<string, unknown>")]
    pub data: Value,
    pub deleted_by: String,
    pub deleted_at: String,
    pub reason: Option<String>,
}

impl From<RecycleBinItem> for RecycleBinItemResponse {
    fn from(value: RecycleBinItem) -> Self {
        Self {
            id: value.id().to_owned(),
            original_id: value.original_id().to_owned(),
            type_tag: value.type_tag().to_owned(),
            data: value.data().clone(),
            deleted_by: value.deleted_by().to_owned(),
            deleted_at: value.deleted_at().to_rfc3339(),
            reason: value.reason().map(ToOwned::to_owned),
        }
    }
}

/// The entity re-created by a restore.
#[derive(Debug, Serialize, TS)]
#[serde(tag = "kind", content = "entity", rename_all = "snake_case")]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/restored-entity-response.ts"
)]
pub enum RestoredEntityResponse {
    Record(RecordResponse),
    User(UserProfileResponse),
}

impl From<RestoredEntity> for RestoredEntityResponse {
    fn from(value: RestoredEntity) -> Self {
        match value {
            RestoredEntity::Record(record) => Self::Record(record.into()),
            RestoredEntity::User(profile) => Self::User(profile.into()),
        }
    }
}

/// Envelope that could not be purged while emptying the bin.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/empty-bin-failure-response.ts"
)]
pub struct EmptyBinFailureResponse {
    pub item_id: String,
    pub message: String,
}

/// Outcome of emptying the recycle bin.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/empty-bin-response.ts"
)]
pub struct EmptyBinResponse {
    pub removed: Vec<String>,
    pub failed: Vec<EmptyBinFailureResponse>,
}

impl From<EmptyBinReport> for EmptyBinResponse {
    fn from(value: EmptyBinReport) -> Self {
        Self {
            removed: value.removed,
            failed: value
                .failed
                .into_iter()
                .map(|failure| EmptyBinFailureResponse {
                    item_id: failure.item_id,
                    message: failure.message,
                })
                .collect(),
        }
    }
}
