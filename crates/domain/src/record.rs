//! Section-governed record types and their payload rules.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use ecclesia_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Section;

/// Prefix used for human-facing member numbers.
pub const MEMBER_ID_PREFIX: &str = "HKM";

/// Entity types that can be stored, soft-deleted, and restored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    /// Congregation member.
    Member,
    /// Income or expense entry.
    Transaction,
    /// Inventory item.
    Equipment,
    /// Visitor registration.
    Visitor,
    /// Fellowship or ministry group.
    Group,
    /// Church branch.
    Branch,
    /// Application account.
    User,
    /// One member's attendance on one date.
    AttendanceRecord,
    /// Maintenance entry for an equipment item.
    MaintenanceRecord,
}

/// How identifiers are allocated for newly stored records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordIdStrategy {
    /// Zero-padded sequence behind a fixed prefix, e.g. `HKM-003`.
    Prefixed(&'static str),
    /// Random UUID.
    Uuid,
    /// Monotonic integer sequence.
    Serial,
    /// Identity-provider subject.
    Subject,
}

impl EntityType {
    /// Returns a stable storage value for this entity type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "Member",
            Self::Transaction => "Transaction",
            Self::Equipment => "Equipment",
            Self::Visitor => "Visitor",
            Self::Group => "Group",
            Self::Branch => "Branch",
            Self::User => "User",
            Self::AttendanceRecord => "AttendanceRecord",
            Self::MaintenanceRecord => "MaintenanceRecord",
        }
    }

    /// Returns all known entity types.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[EntityType] = &[
            EntityType::Member,
            EntityType::Transaction,
            EntityType::Equipment,
            EntityType::Visitor,
            EntityType::Group,
            EntityType::Branch,
            EntityType::User,
            EntityType::AttendanceRecord,
            EntityType::MaintenanceRecord,
        ];

        ALL
    }

    /// Section that governs reading and changing records of this type.
    ///
    /// Accounts are administered outside the section model.
    #[must_use]
    pub fn view_section(&self) -> Option<Section> {
        match self {
            Self::Member => Some(Section::Members),
            Self::Transaction => Some(Section::Finance),
            Self::Equipment => Some(Section::Equipment),
            Self::Visitor => Some(Section::Visitors),
            Self::Group => Some(Section::Groups),
            Self::Branch => Some(Section::Branches),
            Self::AttendanceRecord => Some(Section::Attendance),
            Self::MaintenanceRecord => Some(Section::Maintenance),
            Self::User => None,
        }
    }

    /// Section whose edit right allows creating records of this type.
    #[must_use]
    pub fn create_section(&self) -> Option<Section> {
        match self {
            Self::Member => Some(Section::AddMember),
            Self::Transaction => Some(Section::AddTransaction),
            Self::Equipment => Some(Section::AddEquipment),
            Self::Visitor => Some(Section::AddVisitor),
            other => other.view_section(),
        }
    }

    /// Returns the identifier allocation strategy.
    #[must_use]
    pub fn id_strategy(&self) -> RecordIdStrategy {
        match self {
            Self::Member => RecordIdStrategy::Prefixed(MEMBER_ID_PREFIX),
            Self::AttendanceRecord | Self::MaintenanceRecord => RecordIdStrategy::Serial,
            Self::User => RecordIdStrategy::Subject,
            Self::Transaction | Self::Equipment | Self::Visitor | Self::Group | Self::Branch => {
                RecordIdStrategy::Uuid
            }
        }
    }

    /// Whether a restored record keeps its original identifier.
    #[must_use]
    pub fn preserves_identity_on_restore(&self) -> bool {
        self.id_strategy() != RecordIdStrategy::Serial
    }

    /// Validates a record payload and returns its object form.
    pub fn validate_payload(&self, data: &Value) -> AppResult<Map<String, Value>> {
        let Some(object) = data.as_object() else {
            return Err(AppError::Validation(format!(
                "{} data must be a JSON object",
                self.as_str()
            )));
        };

        match self {
            Self::Member | Self::Visitor => {
                require_text(object, self, "first_name")?;
                require_text(object, self, "last_name")?;
            }
            Self::Transaction => {
                let amount = object.get("amount").and_then(Value::as_f64);
                if !amount.is_some_and(|value| value.is_finite() && value > 0.0) {
                    return Err(AppError::Validation(
                        "Transaction.amount must be a positive number".to_owned(),
                    ));
                }
                let kind = require_text(object, self, "transaction_type")?;
                if kind != "income" && kind != "expense" {
                    return Err(AppError::Validation(format!(
                        "Transaction.transaction_type must be 'income' or 'expense', got '{kind}'"
                    )));
                }
            }
            Self::Equipment | Self::Group | Self::Branch => {
                require_text(object, self, "name")?;
            }
            Self::MaintenanceRecord => {
                require_text(object, self, "equipment_id")?;
                require_text(object, self, "description")?;
            }
            Self::AttendanceRecord => {
                require_text(object, self, "member_id")?;
                parse_attendance_date(require_text(object, self, "date")?)?;
                AttendanceStatus::from_str(require_text(object, self, "status")?)?;
            }
            Self::User => {
                return Err(AppError::Validation(
                    "user accounts are not stored as records".to_owned(),
                ));
            }
        }

        Ok(object.clone())
    }

    /// Parses a transport value into an entity type.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }
}

impl FromStr for EntityType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .find(|entity_type| entity_type.as_str() == value)
            .copied()
            .ok_or_else(|| AppError::UnknownEntityType(value.to_owned()))
    }
}

fn require_text<'a>(
    object: &'a Map<String, Value>,
    entity_type: &EntityType,
    field: &str,
) -> AppResult<&'a str> {
    object
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            AppError::Validation(format!(
                "{}.{field} is required",
                entity_type.as_str()
            ))
        })
}

/// Attendance mark for one member on one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// Attended.
    Present,
    /// Did not attend.
    Absent,
}

impl AttendanceStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
        }
    }
}

impl FromStr for AttendanceStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "present" => Ok(Self::Present),
            "absent" => Ok(Self::Absent),
            _ => Err(AppError::Validation(format!(
                "unknown attendance status '{value}'"
            ))),
        }
    }
}

/// Parses an attendance date in `YYYY-MM-DD` form.
pub fn parse_attendance_date(value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("invalid attendance date '{value}'")))
}

/// Formats the `sequence`-th identifier behind a prefix.
#[must_use]
pub fn format_prefixed_id(prefix: &str, sequence: u64) -> String {
    format!("{prefix}-{sequence:03}")
}

/// Stored church record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChurchRecord {
    record_id: NonEmptyString,
    entity_type: EntityType,
    data: Value,
    created_by: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ChurchRecord {
    /// Creates a validated record projection.
    pub fn new(
        record_id: impl Into<String>,
        entity_type: EntityType,
        data: Value,
        created_by: impl Into<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        if entity_type == EntityType::User {
            return Err(AppError::Validation(
                "user accounts are not stored as records".to_owned(),
            ));
        }

        if !data.is_object() {
            return Err(AppError::Validation(
                "record data must be a JSON object".to_owned(),
            ));
        }

        Ok(Self {
            record_id: NonEmptyString::for_field("record_id", record_id)?,
            entity_type,
            data,
            created_by: created_by.into(),
            created_at,
            updated_at,
        })
    }

    /// Returns the record identifier.
    #[must_use]
    pub fn record_id(&self) -> &str {
        self.record_id.as_str()
    }

    /// Returns the entity type.
    #[must_use]
    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    /// Returns the record JSON object.
    #[must_use]
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Returns the subject that created the record.
    #[must_use]
    pub fn created_by(&self) -> &str {
        self.created_by.as_str()
    }

    /// Returns the creation time.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last update time.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns a short human-readable label for listings and requests.
    #[must_use]
    pub fn display_name(&self) -> String {
        let text = |field: &str| self.data.get(field).and_then(Value::as_str);

        match (text("first_name"), text("last_name"), text("name")) {
            (Some(first), Some(last), _) => format!("{first} {last}"),
            (_, _, Some(name)) => name.to_owned(),
            _ => format!("{} {}", self.entity_type.as_str(), self.record_id()),
        }
    }
}
