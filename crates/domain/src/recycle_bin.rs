//! Recycle bin envelopes that hold snapshots of deleted entities.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use ecclesia_core::{AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::EntityType;

/// Soft-delete envelope holding a full snapshot of a removed entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecycleBinItem {
    id: NonEmptyString,
    original_id: NonEmptyString,
    entity_type: String,
    data: Value,
    deleted_by: String,
    deleted_at: DateTime<Utc>,
    reason: Option<String>,
}

impl RecycleBinItem {
    /// Wraps a snapshot in a new envelope.
    ///
    /// The envelope id follows `{type}_{original_id}_{unix_millis}`.
    pub fn wrap(
        entity_type: EntityType,
        original_id: &str,
        data: Value,
        deleted_by: &str,
        reason: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        let original_id = NonEmptyString::for_field("original_id", original_id)?;
        let id = format!(
            "{}_{}_{}",
            entity_type.as_str(),
            original_id.as_str(),
            now.timestamp_millis()
        );

        Ok(Self {
            id: NonEmptyString::new(id)?,
            original_id,
            entity_type: entity_type.as_str().to_owned(),
            data,
            deleted_by: deleted_by.to_owned(),
            deleted_at: now,
            reason: reason
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_owned),
        })
    }

    /// Rebuilds an envelope from storage without interpreting its type tag.
    pub fn from_storage(
        id: impl Into<String>,
        original_id: impl Into<String>,
        entity_type: impl Into<String>,
        data: Value,
        deleted_by: impl Into<String>,
        deleted_at: DateTime<Utc>,
        reason: Option<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            id: NonEmptyString::for_field("id", id)?,
            original_id: NonEmptyString::for_field("original_id", original_id)?,
            entity_type: entity_type.into(),
            data,
            deleted_by: deleted_by.into(),
            deleted_at,
            reason,
        })
    }

    /// Returns the envelope identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Returns the identifier the entity had before deletion.
    #[must_use]
    pub fn original_id(&self) -> &str {
        self.original_id.as_str()
    }

    /// Returns the raw stored type tag.
    #[must_use]
    pub fn type_tag(&self) -> &str {
        self.entity_type.as_str()
    }

    /// Interprets the stored type tag.
    pub fn entity_type(&self) -> AppResult<EntityType> {
        EntityType::from_str(self.entity_type.as_str())
    }

    /// Returns the entity snapshot.
    #[must_use]
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Returns the deleting subject.
    #[must_use]
    pub fn deleted_by(&self) -> &str {
        self.deleted_by.as_str()
    }

    /// Returns the deletion time.
    #[must_use]
    pub fn deleted_at(&self) -> DateTime<Utc> {
        self.deleted_at
    }

    /// Returns the deletion reason, when given.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use ecclesia_core::AppError;
    use serde_json::json;

    use super::RecycleBinItem;
    use crate::EntityType;

    #[test]
    fn envelope_id_combines_type_original_id_and_time() {
        let deleted_at = Utc
            .timestamp_millis_opt(1_767_225_600_123)
            .single()
            .unwrap_or_default();
        let item = RecycleBinItem::wrap(
            EntityType::Member,
            "HKM-003",
            json!({"first_name": "Esi"}),
            "pastor",
            Some("  "),
            deleted_at,
        )
        .unwrap_or_else(|_| unreachable!());

        assert_eq!(item.id(), "Member_HKM-003_1767225600123");
        assert_eq!(item.type_tag(), "Member");
        assert_eq!(item.reason(), None);
        assert_eq!(item.entity_type().ok(), Some(EntityType::Member));
    }

    #[test]
    fn unknown_stored_tag_surfaces_typed_error() {
        let item = RecycleBinItem::from_storage(
            "Sermon_1_1",
            "1",
            "Sermon",
            json!({}),
            "pastor",
            Utc::now(),
            None,
        )
        .unwrap_or_else(|_| unreachable!());

        assert!(matches!(item.entity_type(), Err(AppError::UnknownEntityType(_))));
    }
}
