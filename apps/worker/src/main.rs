//! Ecclesia background worker: closes elapsed permission grants.

#![forbid(unsafe_code)]

use std::env;
use std::sync::Arc;
use std::time::Duration;

use ecclesia_application::{AccessService, PermissionRequestService};
use ecclesia_core::{AppError, AppResult};
use ecclesia_infrastructure::{
    PostgresAuditRepository, PostgresPermissionRequestRepository, PostgresRecordRepository,
    PostgresUserProfileRepository,
};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
struct WorkerConfig {
    database_url: String,
    worker_id: String,
    sweep_interval_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = WorkerConfig::load()?;
    let pool = connect_pool(config.database_url.as_str()).await?;
    let permission_request_service = build_permission_request_service(pool);

    info!(
        worker_id = %config.worker_id,
        sweep_interval_ms = config.sweep_interval_ms,
        "ecclesia-worker started"
    );

    loop {
        match permission_request_service.expire_elapsed_grants().await {
            Ok(expired) => {
                debug!(worker_id = %config.worker_id, expired, "grant sweep finished");
            }
            Err(error) => {
                warn!(
                    worker_id = %config.worker_id,
                    error = %error,
                    "grant sweep failed"
                );
            }
        }

        tokio::time::sleep(Duration::from_millis(config.sweep_interval_ms)).await;
    }
}

async fn connect_pool(database_url: &str) -> AppResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))
}

fn build_permission_request_service(pool: PgPool) -> PermissionRequestService {
    let profile_repository = Arc::new(PostgresUserProfileRepository::new(pool.clone()));
    let permission_request_repository =
        Arc::new(PostgresPermissionRequestRepository::new(pool.clone()));
    let record_repository = Arc::new(PostgresRecordRepository::new(pool.clone()));
    let audit_repository = Arc::new(PostgresAuditRepository::new(pool));

    let access_service = AccessService::new(
        profile_repository,
        permission_request_repository.clone(),
        audit_repository.clone(),
    );

    PermissionRequestService::new(
        access_service,
        permission_request_repository,
        record_repository,
        audit_repository,
    )
}

impl WorkerConfig {
    fn load() -> AppResult<Self> {
        let database_url = required_env("DATABASE_URL")?;
        let worker_id = env::var("WORKER_ID")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| format!("worker-{}", std::process::id()));
        let sweep_interval_ms = parse_env_u64("EXPIRY_SWEEP_INTERVAL_MS", 60_000)?;

        if sweep_interval_ms == 0 {
            return Err(AppError::Validation(
                "EXPIRY_SWEEP_INTERVAL_MS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            database_url,
            worker_id,
            sweep_interval_ms,
        })
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> AppResult<String> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn parse_env_u64(name: &str, default: u64) -> AppResult<u64> {
    match env::var(name) {
        Ok(value) => value.parse::<u64>().map_err(|error| {
            AppError::Validation(format!("{name} must be a positive integer: {error}"))
        }),
        Err(_) => Ok(default),
    }
}
