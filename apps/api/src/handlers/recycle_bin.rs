use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use ecclesia_application::RecycleBinQuery;
use ecclesia_core::UserIdentity;

use crate::dto::{EmptyBinResponse, RecycleBinItemResponse, RestoredEntityResponse};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, serde::Deserialize)]
pub struct RecycleBinListParams {
    #[serde(rename = "type")]
    pub entity_type: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

pub async fn list_recycle_bin_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<RecycleBinListParams>,
) -> ApiResult<Json<Vec<RecycleBinItemResponse>>> {
    let items = state
        .recycle_bin_service
        .list_items(
            &user,
            RecycleBinQuery {
                entity_type: query.entity_type.filter(|value| !value.trim().is_empty()),
                limit: query.limit,
                offset: query.offset.unwrap_or(0),
            },
        )
        .await?
        .into_iter()
        .map(RecycleBinItemResponse::from)
        .collect();

    Ok(Json(items))
}

pub async fn restore_recycle_bin_item_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(item_id): Path<String>,
) -> ApiResult<Json<RestoredEntityResponse>> {
    let restored = state
        .recycle_bin_service
        .restore(&user, item_id.as_str())
        .await?;

    Ok(Json(RestoredEntityResponse::from(restored)))
}

pub async fn delete_recycle_bin_item_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(item_id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .recycle_bin_service
        .remove_from_recycle_bin(&user, item_id.as_str())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn empty_recycle_bin_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<EmptyBinResponse>> {
    let report = state.recycle_bin_service.empty_bin(&user).await?;

    Ok(Json(EmptyBinResponse::from(report)))
}
