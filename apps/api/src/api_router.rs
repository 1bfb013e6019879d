use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{delete, get, post, put};
use ecclesia_core::AppError;
use tower_http::trace::TraceLayer;
use tower_sessions::SessionManagerLayer;
use tower_sessions_sqlx_store::PostgresStore;

use crate::state::AppState;
use crate::{auth, handlers, middleware};

mod cors;

pub fn build_router(
    app_state: AppState,
    frontend_url: &str,
    session_layer: SessionManagerLayer<PostgresStore>,
) -> Result<Router, AppError> {
    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me_handler))
        .route("/api/access/menu", get(handlers::access::menu_handler))
        .route(
            "/api/access/sections/{section}",
            get(handlers::access::section_access_handler),
        )
        .route(
            "/api/records/{entity_type}",
            get(handlers::records::list_records_handler)
                .post(handlers::records::create_record_handler),
        )
        .route(
            "/api/records/{entity_type}/{record_id}",
            get(handlers::records::get_record_handler)
                .put(handlers::records::update_record_handler)
                .delete(handlers::records::delete_record_handler),
        )
        .route(
            "/api/attendance/batch",
            post(handlers::records::save_attendance_handler),
        )
        .route(
            "/api/permission-requests",
            get(handlers::permission_requests::list_permission_requests_handler)
                .post(handlers::permission_requests::submit_permission_request_handler),
        )
        .route(
            "/api/permission-requests/{request_id}/approve",
            post(handlers::permission_requests::approve_permission_request_handler),
        )
        .route(
            "/api/permission-requests/{request_id}/deny",
            post(handlers::permission_requests::deny_permission_request_handler),
        )
        .route(
            "/api/recycle-bin",
            get(handlers::recycle_bin::list_recycle_bin_handler)
                .delete(handlers::recycle_bin::empty_recycle_bin_handler),
        )
        .route(
            "/api/recycle-bin/{item_id}/restore",
            post(handlers::recycle_bin::restore_recycle_bin_item_handler),
        )
        .route(
            "/api/recycle-bin/{item_id}",
            delete(handlers::recycle_bin::delete_recycle_bin_item_handler),
        )
        .route("/api/users", get(handlers::users::list_users_handler))
        .route(
            "/api/users/{subject}/access",
            put(handlers::users::update_user_access_handler),
        )
        .route(
            "/api/users/{subject}",
            delete(handlers::users::delete_user_handler),
        )
        .route(
            "/api/audit-log",
            get(handlers::users::list_audit_log_handler),
        )
        .route_layer(from_fn(middleware::require_auth));

    let cors_layer = cors::build_cors_layer(frontend_url)?;

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/auth/session", post(auth::create_session_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .merge(protected_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .layer(session_layer)
        .with_state(app_state))
}
