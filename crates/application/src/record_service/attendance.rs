use chrono::{NaiveDate, Utc};
use ecclesia_core::{AppError, AppResult, UserIdentity};
use ecclesia_domain::{
    AttendanceStatus, AuditAction, ChurchRecord, EntityType, Section, parse_attendance_date,
};
use serde_json::{Map, Value};

use super::RecordService;
use crate::AttendanceEntry;

impl RecordService {
    /// Saves attendance marks for one date, one row per member.
    ///
    /// Every member must exist; nothing is written otherwise. Repeated marks
    /// for the same member and date overwrite the earlier one.
    pub async fn save_attendance(
        &self,
        actor: &UserIdentity,
        date: NaiveDate,
        entries: Vec<AttendanceEntry>,
    ) -> AppResult<Vec<ChurchRecord>> {
        let profile = self
            .access_service
            .require_section_edit(actor, Section::Attendance)
            .await?;

        for entry in &entries {
            self.require_member(&entry.member_id).await?;
        }

        let now = Utc::now();
        let mut saved = Vec::with_capacity(entries.len());
        for entry in entries {
            let record = self
                .records
                .upsert_attendance(date, entry, profile.subject(), now)
                .await?;
            self.append_event(profile.subject(), AuditAction::RecordCreated, &record)
                .await?;
            saved.push(record);
        }

        Ok(saved)
    }

    pub(super) async fn upsert_attendance_object(
        &self,
        recorded_by: &str,
        object: &Map<String, Value>,
    ) -> AppResult<ChurchRecord> {
        let text = |field: &str| object.get(field).and_then(Value::as_str).unwrap_or_default();

        let member_id = text("member_id").trim();
        self.require_member(member_id).await?;

        let date = parse_attendance_date(text("date"))?;
        let entry = AttendanceEntry {
            member_id: member_id.to_owned(),
            status: text("status").parse::<AttendanceStatus>()?,
        };

        self.records
            .upsert_attendance(date, entry, recorded_by, Utc::now())
            .await
    }

    /// Checks an edited attendance row the way a new mark is checked, and
    /// refuses to move it onto a member and date another row already holds.
    pub(super) async fn prepare_attendance_update(
        &self,
        record_id: &str,
        object: &mut Map<String, Value>,
    ) -> AppResult<()> {
        let text = |field: &str| object.get(field).and_then(Value::as_str).unwrap_or_default();

        let member_id = text("member_id").trim().to_owned();
        let date = parse_attendance_date(text("date"))?;
        self.require_member(&member_id).await?;

        if let Some(existing) = self.records.find_attendance(&member_id, date).await?
            && existing.record_id() != record_id
        {
            return Err(AppError::Conflict(format!(
                "attendance for member '{member_id}' on {date} is already recorded as '{}'",
                existing.record_id()
            )));
        }

        object.insert("member_id".to_owned(), Value::String(member_id));
        object.insert(
            "date".to_owned(),
            Value::String(date.format("%Y-%m-%d").to_string()),
        );
        Ok(())
    }

    async fn require_member(&self, member_id: &str) -> AppResult<()> {
        if self
            .records
            .find_record(EntityType::Member, member_id)
            .await?
            .is_none()
        {
            return Err(AppError::Validation(format!(
                "member '{member_id}' does not exist"
            )));
        }

        Ok(())
    }
}
