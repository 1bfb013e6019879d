use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use ecclesia_application::AuditLogQuery;
use ecclesia_core::UserIdentity;

use crate::dto::{AuditLogEntryResponse, UpdateUserAccessRequest, UserProfileResponse};
use crate::error::ApiResult;
use crate::state::AppState;

use super::DeleteQuery;

pub async fn list_users_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<UserProfileResponse>>> {
    let users = state
        .user_admin_service
        .list_users(&user)
        .await?
        .into_iter()
        .map(UserProfileResponse::from)
        .collect();

    Ok(Json(users))
}

pub async fn update_user_access_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(subject): Path<String>,
    Json(payload): Json<UpdateUserAccessRequest>,
) -> ApiResult<Json<UserProfileResponse>> {
    let profile = state
        .user_admin_service
        .update_user_access(&user, subject.as_str(), payload.into_input()?)
        .await?;

    Ok(Json(UserProfileResponse::from(profile)))
}

pub async fn delete_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(subject): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> ApiResult<StatusCode> {
    state
        .user_admin_service
        .delete_user(&user, subject.as_str(), query.reason.as_deref())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, serde::Deserialize)]
pub struct AuditLogParams {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub action: Option<String>,
    pub subject: Option<String>,
}

pub async fn list_audit_log_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<AuditLogParams>,
) -> ApiResult<Json<Vec<AuditLogEntryResponse>>> {
    let entries = state
        .user_admin_service
        .list_audit_log(
            &user,
            AuditLogQuery {
                limit: query.limit.unwrap_or(50),
                offset: query.offset.unwrap_or(0),
                action: query.action,
                subject: query.subject,
            },
        )
        .await?
        .into_iter()
        .map(AuditLogEntryResponse::from)
        .collect();

    Ok(Json(entries))
}
