use chrono::NaiveDate;
use ecclesia_application::AttendanceEntry;
use ecclesia_core::AppResult;
use ecclesia_domain::{AttendanceStatus, ChurchRecord, parse_attendance_date};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

/// Incoming payload for record creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/create-record-request.ts"
)]
pub struct CreateRecordRequest {
    #[ts(type = "Record<string, unknown>")]
    pub data: Value,
}

/// Incoming payload for record replacement.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/update-record-request.ts"
)]
pub struct UpdateRecordRequest {
    #[ts(type = "Record<string, unknown>")]
    pub data: Value,
}

/// API representation of a stored record.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/record-response.ts"
)]
pub struct RecordResponse {
    pub entity_type: &'static str,
    pub record_id: String,
    #[ts(type = "Record<string, unknown>")]
    pub data: Value,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ChurchRecord> for RecordResponse {
    fn from(value: ChurchRecord) -> Self {
        Self {
            entity_type: value.entity_type().as_str(),
            record_id: value.record_id().to_owned(),
            data: value.data().clone(),
            created_by: value.created_by().to_owned(),
            created_at: value.created_at().to_rfc3339(),
            updated_at: value.updated_at().to_rfc3339(),
        }
    }
}

/// One member's mark in a batch attendance save.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/attendance-entry-request.ts"
)]
pub struct AttendanceEntryRequest {
    pub member_id: String,
    #[ts(type = "\"present\" | \"absent\"")]
    pub status: String,
}

/// Incoming payload for saving a day's attendance.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/save-attendance-request.ts"
)]
pub struct SaveAttendanceRequest {
    pub date: String,
    pub entries: Vec<AttendanceEntryRequest>,
}

impl SaveAttendanceRequest {
    /// Parses the date and statuses into service input.
    pub fn into_parts(self) -> AppResult<(NaiveDate, Vec<AttendanceEntry>)> {
        let date = parse_attendance_date(self.date.trim())?;
        let entries = self
            .entries
            .into_iter()
            .map(|entry| -> AppResult<AttendanceEntry> {
                Ok(AttendanceEntry {
                    member_id: entry.member_id,
                    status: entry.status.parse::<AttendanceStatus>()?,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok((date, entries))
    }
}
