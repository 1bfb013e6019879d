use ecclesia_application::SubmitPermissionRequestInput;
use ecclesia_core::AppResult;
use ecclesia_domain::{EntityType, PermissionRequest, RequestType};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for requesting an edit or delete grant.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/submit-permission-request-request.ts"
)]
pub struct SubmitPermissionRequestRequest {
    #[ts(type = "\"edit\" | \"delete\"")]
    pub request_type: String,
    pub data_type: String,
    pub data_id: String,
    pub reason: String,
}

impl SubmitPermissionRequestRequest {
    /// Parses transport values into the service input.
    pub fn into_input(self) -> AppResult<SubmitPermissionRequestInput> {
        Ok(SubmitPermissionRequestInput {
            request_type: self.request_type.parse::<RequestType>()?,
            data_type: EntityType::from_transport(self.data_type.as_str())?,
            data_id: self.data_id,
            reason: self.reason,
        })
    }
}

/// Incoming payload for an approval.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/approve-permission-request-request.ts"
)]
pub struct ApprovePermissionRequestRequest {
    #[serde(default)]
    pub notes: Option<String>,
}

/// Incoming payload for a denial.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/deny-permission-request-request.ts"
)]
pub struct DenyPermissionRequestRequest {
    pub notes: String,
}

/// API representation of a permission request.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/permission-request-response.ts"
)]
pub struct PermissionRequestResponse {
    pub id: String,
    pub requester_id: String,
    pub requester_name: String,
    pub requester_email: Option<String>,
    #[ts(type = "\"edit\" | \"delete\"")]
    pub request_type: &'static str,
    pub data_type: &'static str,
    pub data_id: String,
    pub data_name: String,
    pub reason: String,
    pub requested_at: String,
    #[ts(type = "\"pending\" | \"approved\" | \"denied\" | \"expired\"")]
    pub status: &'static str,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<String>,
    pub review_notes: Option<String>,
    pub expires_at: Option<String>,
}

impl From<PermissionRequest> for PermissionRequestResponse {
    fn from(value: PermissionRequest) -> Self {
        Self {
            id: value.id,
            requester_id: value.requester_id,
            requester_name: value.requester_name,
            requester_email: value.requester_email,
            request_type: value.request_type.as_str(),
            data_type: value.target.data_type.as_str(),
            data_id: value.target.data_id,
            data_name: value.target.data_name,
            reason: value.reason,
            requested_at: value.requested_at.to_rfc3339(),
            status: value.status.as_str(),
            reviewed_by: value.reviewed_by,
            reviewed_at: value.reviewed_at.map(|at| at.to_rfc3339()),
            review_notes: value.review_notes,
            expires_at: value.expires_at.map(|at| at.to_rfc3339()),
        }
    }
}
