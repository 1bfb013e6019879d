use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use ecclesia_core::UserIdentity;
use ecclesia_domain::RequestStatus;

use crate::dto::{
    ApprovePermissionRequestRequest, DenyPermissionRequestRequest, PermissionRequestResponse,
    SubmitPermissionRequestRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, serde::Deserialize)]
pub struct PermissionRequestListParams {
    pub status: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

pub async fn list_permission_requests_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<PermissionRequestListParams>,
) -> ApiResult<Json<Vec<PermissionRequestResponse>>> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<RequestStatus>)
        .transpose()?;

    let requests = state
        .permission_request_service
        .list_requests(
            &user,
            status,
            query.limit.unwrap_or(50),
            query.offset.unwrap_or(0),
        )
        .await?
        .into_iter()
        .map(PermissionRequestResponse::from)
        .collect();

    Ok(Json(requests))
}

pub async fn submit_permission_request_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<SubmitPermissionRequestRequest>,
) -> ApiResult<(StatusCode, Json<PermissionRequestResponse>)> {
    let request = state
        .permission_request_service
        .submit(&user, payload.into_input()?)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PermissionRequestResponse::from(request)),
    ))
}

pub async fn approve_permission_request_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(request_id): Path<String>,
    Json(payload): Json<ApprovePermissionRequestRequest>,
) -> ApiResult<Json<PermissionRequestResponse>> {
    let request = state
        .permission_request_service
        .approve(&user, request_id.as_str(), payload.notes.as_deref())
        .await?;

    Ok(Json(PermissionRequestResponse::from(request)))
}

pub async fn deny_permission_request_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(request_id): Path<String>,
    Json(payload): Json<DenyPermissionRequestRequest>,
) -> ApiResult<Json<PermissionRequestResponse>> {
    let request = state
        .permission_request_service
        .deny(&user, request_id.as_str(), payload.notes.as_str())
        .await?;

    Ok(Json(PermissionRequestResponse::from(request)))
}
