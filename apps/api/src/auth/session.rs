use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use ecclesia_core::{AppError, UserIdentity};
use sha2::{Digest, Sha256};
use tower_sessions::Session;
use tracing::info;

use crate::dto::{CreateSessionRequest, SessionResponse};
use crate::error::ApiResult;
use crate::state::AppState;

use super::SESSION_USER_KEY;

/// Starts a session for an identity vouched for by the bridge token holder.
pub async fn create_session_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<CreateSessionRequest>,
) -> ApiResult<Json<SessionResponse>> {
    if !bridge_token_matches(&payload.token, &state.auth_bridge_token) {
        return Err(AppError::Unauthorized("invalid bridge token".to_owned()).into());
    }

    let subject = payload.subject.trim();
    if subject.is_empty() {
        return Err(AppError::Validation("subject must not be empty".to_owned()).into());
    }

    let identity = UserIdentity::new(
        subject,
        payload.display_name.trim(),
        payload
            .email
            .map(|email| email.trim().to_owned())
            .filter(|email| !email.is_empty()),
    );
    let profile = state.user_admin_service.ensure_profile(&identity).await?;

    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;

    session
        .insert(SESSION_USER_KEY, &identity)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session identity: {error}"))
        })?;

    info!(subject = %identity.subject(), role = profile.role().as_str(), "session started");

    let menu = state.access_service.accessible_menu(&identity).await?;
    Ok(Json(SessionResponse {
        identity: identity.into(),
        profile: profile.into(),
        menu: menu.into_iter().map(Into::into).collect(),
    }))
}

pub async fn logout_handler(session: Session) -> ApiResult<StatusCode> {
    session
        .delete()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn me_handler(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<Json<SessionResponse>> {
    let identity = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    let profile = state.access_service.require_profile(&identity).await?;
    let menu = state.access_service.accessible_menu(&identity).await?;

    Ok(Json(SessionResponse {
        identity: identity.into(),
        profile: profile.into(),
        menu: menu.into_iter().map(Into::into).collect(),
    }))
}

/// Compares SHA-256 digests of both tokens in constant time.
fn bridge_token_matches(provided: &str, expected: &str) -> bool {
    let provided = Sha256::digest(provided.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());

    provided
        .iter()
        .zip(expected.iter())
        .fold(0u8, |difference, (left, right)| difference | (left ^ right))
        == 0
}
