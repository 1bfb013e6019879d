use axum::Json;
use axum::extract::{Extension, Path, State};
use ecclesia_core::UserIdentity;
use ecclesia_domain::Section;

use crate::dto::{MenuItemResponse, SectionAccessResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn menu_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<MenuItemResponse>>> {
    let menu = state
        .access_service
        .accessible_menu(&user)
        .await?
        .into_iter()
        .map(MenuItemResponse::from)
        .collect();

    Ok(Json(menu))
}

pub async fn section_access_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(section): Path<String>,
) -> ApiResult<Json<SectionAccessResponse>> {
    let section = Section::from_transport(section.as_str())?;
    let access = state.access_service.section_access(&user, section).await?;

    Ok(Json(SectionAccessResponse::new(section, access)))
}
