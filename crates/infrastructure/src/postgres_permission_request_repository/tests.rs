use chrono::{DateTime, Duration, TimeZone, Utc};
use ecclesia_application::{PermissionRequestQuery, PermissionRequestRepository};
use ecclesia_core::AppError;
use ecclesia_domain::{
    EntityType, PermissionRequest, RequestStatus, RequestTarget, RequestType, Role, UserProfile,
};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::PostgresPermissionRequestRepository;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres permission request tests: {error}");
    }

    Some(pool)
}

fn submitted_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
        .single()
        .unwrap_or_default()
}

fn pending_request(requester_id: &str) -> PermissionRequest {
    let requester = UserProfile::new(requester_id, "Ama Data", None, Role::DataPersonnel)
        .unwrap_or_else(|_| unreachable!());
    PermissionRequest::submit(
        &requester,
        RequestType::Edit,
        RequestTarget {
            data_type: EntityType::Member,
            data_id: "HKM-001".to_owned(),
            data_name: "Kofi Mensah".to_owned(),
        },
        "fix the phone number",
        submitted_at(),
    )
    .unwrap_or_else(|_| unreachable!())
}

fn reviewer() -> UserProfile {
    UserProfile::new("reviewer", "Reviewer", None, Role::Admin).unwrap_or_else(|_| unreachable!())
}

#[tokio::test]
async fn second_review_of_the_same_request_conflicts() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresPermissionRequestRepository::new(pool);
    let request = pending_request(&format!("dp-{}", Uuid::new_v4()));
    assert!(repository.insert_request(request.clone()).await.is_ok());

    let mut approved = request.clone();
    let mut denied = request.clone();
    let reviewed_at = submitted_at() + Duration::minutes(5);
    assert!(approved.approve(&reviewer(), None, reviewed_at).is_ok());
    assert!(denied.deny(&reviewer(), "not needed", reviewed_at).is_ok());

    let first = repository.save_review(&approved).await;
    let second = repository.save_review(&denied).await;
    let stored = repository
        .find_request(&request.id)
        .await
        .unwrap_or_default();

    assert!(first.is_ok());
    assert!(matches!(second, Err(AppError::Conflict(_))));
    assert_eq!(stored.map(|stored| stored.status), Some(RequestStatus::Approved));
}

#[tokio::test]
async fn grant_is_active_strictly_before_its_expiry() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresPermissionRequestRepository::new(pool);
    let requester_id = format!("dp-{}", Uuid::new_v4());
    let mut request = pending_request(&requester_id);
    assert!(repository.insert_request(request.clone()).await.is_ok());
    assert!(request.approve(&reviewer(), Some("ok"), submitted_at()).is_ok());
    assert!(repository.save_review(&request).await.is_ok());
    let expires_at = request.expires_at.unwrap_or_default();

    let grant_at = |now: DateTime<Utc>| {
        let repository = repository.clone();
        let requester_id = requester_id.clone();
        async move {
            repository
                .find_active_grant(
                    &requester_id,
                    RequestType::Edit,
                    EntityType::Member,
                    "HKM-001",
                    now,
                )
                .await
                .unwrap_or_default()
        }
    };

    assert!(grant_at(expires_at - Duration::seconds(1)).await.is_some());
    assert!(grant_at(expires_at).await.is_none());

    let expired = repository.expire_elapsed(expires_at).await.unwrap_or_default();
    let stored = repository
        .list_requests(PermissionRequestQuery {
            requester_id: Some(requester_id.clone()),
            status: None,
            limit: 10,
            offset: 0,
        })
        .await
        .unwrap_or_default();

    assert!(expired >= 1);
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].status, RequestStatus::Expired);
}
