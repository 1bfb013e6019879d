//! In-process fakes shared by service tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use ecclesia_core::{AppError, AppResult, UserIdentity};
use ecclesia_domain::{
    ChurchRecord, EntityType, PermissionRequest, RecordIdStrategy,
    RecycleBinItem, RequestStatus, RequestType, Role, UserProfile, format_prefixed_id,
};
use serde_json::{Value, json};
use tokio::sync::Mutex;

use crate::{
    AccessService, AttendanceEntry, AuditEvent, AuditLogEntry, AuditLogQuery, AuditLogRepository,
    AuditRepository, NewRecord, PermissionRequestQuery, PermissionRequestRepository,
    PermissionRequestService, RecordListQuery, RecordRepository, RecordService, RecycleBinQuery,
    RecycleBinRepository, RecycleBinService, UserAdminService, UserProfileRepository,
};

#[derive(Default)]
pub(crate) struct FakeProfiles {
    pub profiles: Mutex<HashMap<String, UserProfile>>,
}

#[async_trait]
impl UserProfileRepository for FakeProfiles {
    async fn find_profile(&self, subject: &str) -> AppResult<Option<UserProfile>> {
        Ok(self.profiles.lock().await.get(subject).cloned())
    }

    async fn list_profiles(&self) -> AppResult<Vec<UserProfile>> {
        let mut profiles = self
            .profiles
            .lock()
            .await
            .values()
            .cloned()
            .collect::<Vec<_>>();
        profiles.sort_by(|left, right| left.display_name().cmp(right.display_name()));
        Ok(profiles)
    }

    async fn save_profile(&self, profile: UserProfile) -> AppResult<()> {
        self.profiles
            .lock()
            .await
            .insert(profile.subject().to_owned(), profile);
        Ok(())
    }

    async fn delete_profile(&self, subject: &str) -> AppResult<()> {
        self.profiles
            .lock()
            .await
            .remove(subject)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("user '{subject}' does not exist")))
    }
}

#[derive(Default)]
pub(crate) struct FakeRecords {
    pub records: Mutex<Vec<ChurchRecord>>,
    sequences: Mutex<HashMap<EntityType, u64>>,
    pub fail_deletes: AtomicBool,
}

impl FakeRecords {
    async fn next_id(&self, entity_type: EntityType) -> String {
        let mut sequences = self.sequences.lock().await;
        let sequence = sequences.entry(entity_type).or_insert(0);
        *sequence += 1;

        match entity_type.id_strategy() {
            RecordIdStrategy::Prefixed(prefix) => format_prefixed_id(prefix, *sequence),
            RecordIdStrategy::Serial => sequence.to_string(),
            RecordIdStrategy::Uuid | RecordIdStrategy::Subject => {
                format!("{}-{sequence}", entity_type.as_str().to_lowercase())
            }
        }
    }
}

#[async_trait]
impl RecordRepository for FakeRecords {
    async fn list_records(
        &self,
        entity_type: EntityType,
        query: RecordListQuery,
    ) -> AppResult<Vec<ChurchRecord>> {
        let needle = query.search.map(|search| search.to_lowercase());
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .filter(|record| record.entity_type() == entity_type)
            .filter(|record| {
                needle.as_ref().is_none_or(|needle| {
                    record.data().to_string().to_lowercase().contains(needle)
                })
            })
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect())
    }

    async fn find_record(
        &self,
        entity_type: EntityType,
        record_id: &str,
    ) -> AppResult<Option<ChurchRecord>> {
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .find(|record| record.entity_type() == entity_type && record.record_id() == record_id)
            .cloned())
    }

    async fn insert_record(&self, record: NewRecord) -> AppResult<ChurchRecord> {
        let record_id = match record.record_id {
            Some(record_id) => record_id,
            None => self.next_id(record.entity_type).await,
        };

        let mut records = self.records.lock().await;
        if records.iter().any(|existing| {
            existing.entity_type() == record.entity_type && existing.record_id() == record_id
        }) {
            return Err(AppError::Conflict(format!(
                "{} '{record_id}' already exists",
                record.entity_type.as_str()
            )));
        }

        let stored = ChurchRecord::new(
            record_id,
            record.entity_type,
            record.data,
            record.created_by,
            record.created_at,
            record.created_at,
        )?;
        records.push(stored.clone());
        Ok(stored)
    }

    async fn update_record(
        &self,
        entity_type: EntityType,
        record_id: &str,
        data: Value,
        updated_at: DateTime<Utc>,
    ) -> AppResult<ChurchRecord> {
        let mut records = self.records.lock().await;
        let Some(existing) = records
            .iter_mut()
            .find(|record| record.entity_type() == entity_type && record.record_id() == record_id)
        else {
            return Err(AppError::NotFound(format!(
                "{} '{record_id}' does not exist",
                entity_type.as_str()
            )));
        };

        *existing = ChurchRecord::new(
            record_id,
            entity_type,
            data,
            existing.created_by(),
            existing.created_at(),
            updated_at,
        )?;
        Ok(existing.clone())
    }

    async fn delete_record(&self, entity_type: EntityType, record_id: &str) -> AppResult<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(AppError::Internal("record store unavailable".to_owned()));
        }

        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|record| {
            !(record.entity_type() == entity_type && record.record_id() == record_id)
        });
        if records.len() == before {
            return Err(AppError::NotFound(format!(
                "{} '{record_id}' does not exist",
                entity_type.as_str()
            )));
        }

        Ok(())
    }

    async fn find_attendance(
        &self,
        member_id: &str,
        date: NaiveDate,
    ) -> AppResult<Option<ChurchRecord>> {
        let date = date.format("%Y-%m-%d").to_string();
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .find(|record| {
                record.entity_type() == EntityType::AttendanceRecord
                    && record.data().get("member_id").and_then(Value::as_str) == Some(member_id)
                    && record.data().get("date").and_then(Value::as_str) == Some(date.as_str())
            })
            .cloned())
    }

    async fn upsert_attendance(
        &self,
        date: NaiveDate,
        entry: AttendanceEntry,
        recorded_by: &str,
        now: DateTime<Utc>,
    ) -> AppResult<ChurchRecord> {
        let existing_id = self
            .find_attendance(&entry.member_id, date)
            .await?
            .map(|record| record.record_id().to_owned());
        let data = json!({
            "member_id": entry.member_id,
            "date": date.format("%Y-%m-%d").to_string(),
            "status": entry.status.as_str(),
        });

        match existing_id {
            Some(record_id) => {
                self.update_record(EntityType::AttendanceRecord, &record_id, data, now)
                    .await
            }
            None => {
                self.insert_record(NewRecord {
                    entity_type: EntityType::AttendanceRecord,
                    record_id: None,
                    data,
                    created_by: recorded_by.to_owned(),
                    created_at: now,
                })
                .await
            }
        }
    }
}

#[derive(Default)]
pub(crate) struct FakeRecycleBin {
    pub items: Mutex<Vec<RecycleBinItem>>,
    pub fail_removals: AtomicBool,
}

#[async_trait]
impl RecycleBinRepository for FakeRecycleBin {
    async fn insert_item(&self, item: RecycleBinItem) -> AppResult<()> {
        self.items.lock().await.push(item);
        Ok(())
    }

    async fn list_items(&self, query: RecycleBinQuery) -> AppResult<Vec<RecycleBinItem>> {
        let mut items = self
            .items
            .lock()
            .await
            .iter()
            .filter(|item| {
                query
                    .entity_type
                    .as_deref()
                    .is_none_or(|entity_type| item.type_tag() == entity_type)
            })
            .cloned()
            .collect::<Vec<_>>();
        items.sort_by_key(|item| std::cmp::Reverse(item.deleted_at()));
        Ok(items
            .into_iter()
            .skip(query.offset)
            .take(query.limit.unwrap_or(usize::MAX))
            .collect())
    }

    async fn find_item(&self, item_id: &str) -> AppResult<Option<RecycleBinItem>> {
        Ok(self
            .items
            .lock()
            .await
            .iter()
            .find(|item| item.id() == item_id)
            .cloned())
    }

    async fn remove_item(&self, item_id: &str) -> AppResult<()> {
        if self.fail_removals.load(Ordering::SeqCst) {
            return Err(AppError::Internal("recycle bin unavailable".to_owned()));
        }

        let mut items = self.items.lock().await;
        let before = items.len();
        items.retain(|item| item.id() != item_id);
        if items.len() == before {
            return Err(AppError::NotFound(format!(
                "recycle bin item '{item_id}' does not exist"
            )));
        }

        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeRequests {
    pub requests: Mutex<Vec<PermissionRequest>>,
}

#[async_trait]
impl PermissionRequestRepository for FakeRequests {
    async fn insert_request(&self, request: PermissionRequest) -> AppResult<()> {
        self.requests.lock().await.push(request);
        Ok(())
    }

    async fn find_request(&self, request_id: &str) -> AppResult<Option<PermissionRequest>> {
        Ok(self
            .requests
            .lock()
            .await
            .iter()
            .find(|request| request.id == request_id)
            .cloned())
    }

    async fn list_requests(
        &self,
        query: PermissionRequestQuery,
    ) -> AppResult<Vec<PermissionRequest>> {
        let mut requests = self
            .requests
            .lock()
            .await
            .iter()
            .filter(|request| {
                query
                    .requester_id
                    .as_deref()
                    .is_none_or(|requester_id| request.requester_id == requester_id)
            })
            .filter(|request| query.status.is_none_or(|status| request.status == status))
            .cloned()
            .collect::<Vec<_>>();
        requests.sort_by_key(|request| std::cmp::Reverse(request.requested_at));
        Ok(requests
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect())
    }

    async fn save_review(&self, request: &PermissionRequest) -> AppResult<()> {
        let mut requests = self.requests.lock().await;
        let Some(stored) = requests.iter_mut().find(|stored| stored.id == request.id) else {
            return Err(AppError::NotFound(format!(
                "permission request '{}' does not exist",
                request.id
            )));
        };
        if stored.status != RequestStatus::Pending {
            return Err(AppError::Conflict(format!(
                "permission request '{}' was already reviewed",
                request.id
            )));
        }

        *stored = request.clone();
        Ok(())
    }

    async fn find_active_grant(
        &self,
        requester_id: &str,
        request_type: RequestType,
        data_type: EntityType,
        data_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<PermissionRequest>> {
        Ok(self
            .requests
            .lock()
            .await
            .iter()
            .find(|request| request.grants(requester_id, request_type, data_type, data_id, now))
            .cloned())
    }

    async fn expire_elapsed(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut expired = 0;
        for request in self.requests.lock().await.iter_mut() {
            if request.expire_if_elapsed(now) {
                expired += 1;
            }
        }

        Ok(expired)
    }
}

#[derive(Default)]
pub(crate) struct FakeAudit {
    pub events: Mutex<Vec<AuditEvent>>,
    pub fail_appends: AtomicBool,
}

impl FakeAudit {
    pub async fn actions(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .await
            .iter()
            .map(|event| event.action.as_str())
            .collect()
    }
}

#[async_trait]
impl AuditRepository for FakeAudit {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(AppError::Internal("audit store unavailable".to_owned()));
        }

        self.events.lock().await.push(event);
        Ok(())
    }
}

#[async_trait]
impl AuditLogRepository for FakeAudit {
    async fn list_recent_entries(&self, query: AuditLogQuery) -> AppResult<Vec<AuditLogEntry>> {
        Ok(self
            .events
            .lock()
            .await
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, event)| {
                query
                    .action
                    .as_deref()
                    .is_none_or(|action| event.action.as_str() == action)
            })
            .skip(query.offset)
            .take(query.limit)
            .map(|(index, event)| AuditLogEntry {
                event_id: index.to_string(),
                subject: event.subject.clone(),
                action: event.action.as_str().to_owned(),
                resource_type: event.resource_type.clone(),
                resource_id: event.resource_id.clone(),
                detail: event.detail.clone(),
                created_at: String::new(),
            })
            .collect())
    }
}

/// Fully wired services over fresh fakes.
pub(crate) struct Harness {
    pub profiles: Arc<FakeProfiles>,
    pub records: Arc<FakeRecords>,
    pub recycle_bin: Arc<FakeRecycleBin>,
    pub requests: Arc<FakeRequests>,
    pub audit: Arc<FakeAudit>,
    pub access_service: AccessService,
    pub permission_request_service: PermissionRequestService,
    pub recycle_bin_service: RecycleBinService,
    pub record_service: RecordService,
    pub user_admin_service: UserAdminService,
}

impl Harness {
    pub fn new() -> Self {
        let profiles = Arc::new(FakeProfiles::default());
        let records = Arc::new(FakeRecords::default());
        let recycle_bin = Arc::new(FakeRecycleBin::default());
        let requests = Arc::new(FakeRequests::default());
        let audit = Arc::new(FakeAudit::default());

        let access_service =
            AccessService::new(profiles.clone(), requests.clone(), audit.clone());
        let recycle_bin_service = RecycleBinService::new(
            access_service.clone(),
            recycle_bin.clone(),
            records.clone(),
            profiles.clone(),
            audit.clone(),
        );
        let permission_request_service = PermissionRequestService::new(
            access_service.clone(),
            requests.clone(),
            records.clone(),
            audit.clone(),
        );
        let record_service = RecordService::new(
            access_service.clone(),
            records.clone(),
            recycle_bin_service.clone(),
            audit.clone(),
        );
        let user_admin_service = UserAdminService::new(
            access_service.clone(),
            profiles.clone(),
            recycle_bin_service.clone(),
            audit.clone(),
            audit.clone(),
        );

        Self {
            profiles,
            records,
            recycle_bin,
            requests,
            audit,
            access_service,
            permission_request_service,
            recycle_bin_service,
            record_service,
            user_admin_service,
        }
    }

    /// Stores a profile and returns the matching session identity.
    pub async fn add_profile(&self, profile: UserProfile) -> UserIdentity {
        let identity = UserIdentity::new(
            profile.subject(),
            profile.display_name(),
            profile.email().map(str::to_owned),
        );
        self.profiles
            .profiles
            .lock()
            .await
            .insert(profile.subject().to_owned(), profile);
        identity
    }

    pub async fn add_user(&self, subject: &str, role: Role) -> UserIdentity {
        let profile = UserProfile::new(subject, subject, None, role)
            .unwrap_or_else(|_| unreachable!());
        self.add_profile(profile).await
    }

    /// Inserts a record directly into the fake store.
    pub async fn seed_record(
        &self,
        entity_type: EntityType,
        data: Value,
        created_by: &str,
    ) -> ChurchRecord {
        self.records
            .insert_record(NewRecord {
                entity_type,
                record_id: None,
                data,
                created_by: created_by.to_owned(),
                created_at: Utc::now(),
            })
            .await
            .unwrap_or_else(|_| unreachable!())
    }

    pub async fn seed_members(&self, count: usize) -> Vec<ChurchRecord> {
        let mut members = Vec::with_capacity(count);
        for index in 1..=count {
            members.push(
                self.seed_record(
                    EntityType::Member,
                    json!({ "first_name": "Member", "last_name": format!("No{index}") }),
                    "seed",
                )
                .await,
            );
        }
        members
    }
}

