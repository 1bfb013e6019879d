use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use ecclesia_application::RecordListQuery;
use ecclesia_core::UserIdentity;
use ecclesia_domain::EntityType;

use crate::dto::{CreateRecordRequest, RecordResponse, SaveAttendanceRequest, UpdateRecordRequest};
use crate::error::ApiResult;
use crate::state::AppState;

use super::DeleteQuery;

#[derive(Debug, serde::Deserialize)]
pub struct RecordListParams {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub search: Option<String>,
}

pub async fn list_records_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(entity_type): Path<String>,
    Query(query): Query<RecordListParams>,
) -> ApiResult<Json<Vec<RecordResponse>>> {
    let entity_type = EntityType::from_transport(entity_type.as_str())?;
    let records = state
        .record_service
        .list_records(
            &user,
            entity_type,
            RecordListQuery {
                limit: query.limit.unwrap_or(50),
                offset: query.offset.unwrap_or(0),
                search: query.search.filter(|value| !value.trim().is_empty()),
            },
        )
        .await?
        .into_iter()
        .map(RecordResponse::from)
        .collect();

    Ok(Json(records))
}

pub async fn create_record_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(entity_type): Path<String>,
    Json(payload): Json<CreateRecordRequest>,
) -> ApiResult<(StatusCode, Json<RecordResponse>)> {
    let entity_type = EntityType::from_transport(entity_type.as_str())?;
    let record = state
        .record_service
        .create_record(&user, entity_type, payload.data)
        .await?;

    Ok((StatusCode::CREATED, Json(RecordResponse::from(record))))
}

pub async fn get_record_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((entity_type, record_id)): Path<(String, String)>,
) -> ApiResult<Json<RecordResponse>> {
    let entity_type = EntityType::from_transport(entity_type.as_str())?;
    let record = state
        .record_service
        .get_record(&user, entity_type, record_id.as_str())
        .await?;

    Ok(Json(RecordResponse::from(record)))
}

pub async fn update_record_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((entity_type, record_id)): Path<(String, String)>,
    Json(payload): Json<UpdateRecordRequest>,
) -> ApiResult<Json<RecordResponse>> {
    let entity_type = EntityType::from_transport(entity_type.as_str())?;
    let record = state
        .record_service
        .update_record(&user, entity_type, record_id.as_str(), payload.data)
        .await?;

    Ok(Json(RecordResponse::from(record)))
}

pub async fn delete_record_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((entity_type, record_id)): Path<(String, String)>,
    Query(query): Query<DeleteQuery>,
) -> ApiResult<StatusCode> {
    let entity_type = EntityType::from_transport(entity_type.as_str())?;
    state
        .record_service
        .delete_record(&user, entity_type, record_id.as_str(), query.reason.as_deref())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn save_attendance_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<SaveAttendanceRequest>,
) -> ApiResult<Json<Vec<RecordResponse>>> {
    let (date, entries) = payload.into_parts()?;
    let records = state
        .record_service
        .save_attendance(&user, date, entries)
        .await?
        .into_iter()
        .map(RecordResponse::from)
        .collect();

    Ok(Json(records))
}
