use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{MenuItemResponse, UserIdentityResponse, UserProfileResponse};

/// Incoming payload from the trusted identity bridge.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/create-session-request.ts"
)]
pub struct CreateSessionRequest {
    pub subject: String,
    pub display_name: String,
    pub email: Option<String>,
    pub token: String,
}

/// Signed-in identity together with its profile and navigation.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/session-response.ts"
)]
pub struct SessionResponse {
    pub identity: UserIdentityResponse,
    pub profile: UserProfileResponse,
    pub menu: Vec<MenuItemResponse>,
}
