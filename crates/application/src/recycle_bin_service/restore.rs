use chrono::Utc;
use ecclesia_core::{AppError, AppResult};
use ecclesia_domain::{
    AttendanceStatus, ChurchRecord, EntityType, RecycleBinItem, UserProfile,
    parse_attendance_date,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::RecycleBinService;
use crate::{AttendanceEntry, NewRecord, RestoredEntity};

/// Outcome of writing a snapshot back to its origin store.
pub(super) struct Reinserted {
    pub restored: RestoredEntity,
    /// The attendance row the restore overwrote, if the mark already existed.
    pub replaced: Option<ChurchRecord>,
}

impl RecycleBinService {
    /// Dispatches on the envelope type to the origin store's add operation.
    pub(super) async fn reinsert(&self, item: &RecycleBinItem) -> AppResult<Reinserted> {
        match item.entity_type()? {
            EntityType::User => {
                let profile: UserProfile = decode_snapshot(item)?;
                if self.profiles.find_profile(profile.subject()).await?.is_some() {
                    return Err(AppError::Conflict(format!(
                        "user '{}' already exists",
                        profile.subject()
                    )));
                }
                self.profiles.save_profile(profile.clone()).await?;
                Ok(Reinserted {
                    restored: RestoredEntity::User(profile),
                    replaced: None,
                })
            }
            EntityType::AttendanceRecord => {
                let snapshot = decode_record(item, EntityType::AttendanceRecord)?;
                let text = |field: &str| {
                    snapshot
                        .data()
                        .get(field)
                        .and_then(Value::as_str)
                        .ok_or_else(|| {
                            AppError::Validation(format!(
                                "attendance snapshot '{}' is missing '{field}'",
                                item.id()
                            ))
                        })
                };

                let date = parse_attendance_date(text("date")?)?;
                let entry = AttendanceEntry {
                    member_id: text("member_id")?.to_owned(),
                    status: text("status")?.parse::<AttendanceStatus>()?,
                };
                let replaced = self.records.find_attendance(&entry.member_id, date).await?;
                let record = self
                    .records
                    .upsert_attendance(date, entry, snapshot.created_by(), Utc::now())
                    .await?;
                Ok(Reinserted {
                    restored: RestoredEntity::Record(record),
                    replaced,
                })
            }
            entity_type => {
                let snapshot = decode_record(item, entity_type)?;
                let record_id = entity_type
                    .preserves_identity_on_restore()
                    .then(|| item.original_id().to_owned());
                let record = self
                    .records
                    .insert_record(NewRecord {
                        entity_type,
                        record_id,
                        data: snapshot.data().clone(),
                        created_by: snapshot.created_by().to_owned(),
                        created_at: snapshot.created_at(),
                    })
                    .await?;
                Ok(Reinserted {
                    restored: RestoredEntity::Record(record),
                    replaced: None,
                })
            }
        }
    }

    /// Undoes a reinsert: a replaced attendance row gets its prior data back,
    /// anything else is deleted.
    pub(super) async fn undo_reinsert(&self, reinserted: &Reinserted) -> AppResult<()> {
        if let Some(prior) = &reinserted.replaced {
            return self
                .records
                .update_record(
                    prior.entity_type(),
                    prior.record_id(),
                    prior.data().clone(),
                    prior.updated_at(),
                )
                .await
                .map(|_| ());
        }

        match &reinserted.restored {
            RestoredEntity::User(profile) => self.profiles.delete_profile(profile.subject()).await,
            RestoredEntity::Record(record) => {
                self.records
                    .delete_record(record.entity_type(), record.record_id())
                    .await
            }
        }
    }
}

fn decode_snapshot<T: DeserializeOwned>(item: &RecycleBinItem) -> AppResult<T> {
    serde_json::from_value(item.data().clone()).map_err(|error| {
        AppError::Validation(format!(
            "recycle bin item '{}' holds an unreadable snapshot: {error}",
            item.id()
        ))
    })
}

fn decode_record(item: &RecycleBinItem, expected: EntityType) -> AppResult<ChurchRecord> {
    let record: ChurchRecord = decode_snapshot(item)?;
    if record.entity_type() != expected {
        return Err(AppError::Validation(format!(
            "recycle bin item '{}' is tagged '{}' but holds a '{}' snapshot",
            item.id(),
            expected.as_str(),
            record.entity_type().as_str()
        )));
    }

    Ok(record)
}
