mod access;
mod auth;
mod common;
mod permission_requests;
mod records;
mod recycle_bin;
mod users;

pub use access::{MenuItemResponse, SectionAccessResponse};
pub use auth::{CreateSessionRequest, SessionResponse};
pub use common::{HealthResponse, UserIdentityResponse};
pub use permission_requests::{
    ApprovePermissionRequestRequest, DenyPermissionRequestRequest, PermissionRequestResponse,
    SubmitPermissionRequestRequest,
};
pub use records::{
    AttendanceEntryRequest, CreateRecordRequest, RecordResponse, SaveAttendanceRequest,
    UpdateRecordRequest,
};
pub use recycle_bin::{
    EmptyBinFailureResponse, EmptyBinResponse, RecycleBinItemResponse, RestoredEntityResponse,
};
pub use users::{AuditLogEntryResponse, UpdateUserAccessRequest, UserProfileResponse};

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use ecclesia_core::AppError;
    use ecclesia_domain::{
        AttendanceStatus, EntityType, MenuItem, RecycleBinItem, RequestType, Role, Section,
    };
    use serde_json::json;

    use super::{
        ApprovePermissionRequestRequest, AttendanceEntryRequest, AuditLogEntryResponse,
        CreateRecordRequest, CreateSessionRequest, DenyPermissionRequestRequest,
        EmptyBinFailureResponse, EmptyBinResponse, HealthResponse, MenuItemResponse,
        PermissionRequestResponse, RecordResponse, RecycleBinItemResponse,
        RestoredEntityResponse, SaveAttendanceRequest, SectionAccessResponse, SessionResponse,
        SubmitPermissionRequestRequest, UpdateRecordRequest, UpdateUserAccessRequest,
        UserIdentityResponse, UserProfileResponse,
    };

    use crate::error::ErrorResponse;
    use ts_rs::Config;
    use ts_rs::TS;

    #[test]
    fn export_ts_bindings() -> Result<(), ts_rs::ExportError> {
        let config = Config::default();

        HealthResponse::export(&config)?;
        ErrorResponse::export(&config)?;
        UserIdentityResponse::export(&config)?;
        CreateSessionRequest::export(&config)?;
        SessionResponse::export(&config)?;
        MenuItemResponse::export(&config)?;
        SectionAccessResponse::export(&config)?;
        CreateRecordRequest::export(&config)?;
        UpdateRecordRequest::export(&config)?;
        RecordResponse::export(&config)?;
        AttendanceEntryRequest::export(&config)?;
        SaveAttendanceRequest::export(&config)?;
        SubmitPermissionRequestRequest::export(&config)?;
        ApprovePermissionRequestRequest::export(&config)?;
        DenyPermissionRequestRequest::export(&config)?;
        PermissionRequestResponse::export(&config)?;
        RecycleBinItemResponse::export(&config)?;
        RestoredEntityResponse::export(&config)?;
        EmptyBinFailureResponse::export(&config)?;
        EmptyBinResponse::export(&config)?;
        UserProfileResponse::export(&config)?;
        UpdateUserAccessRequest::export(&config)?;
        AuditLogEntryResponse::export(&config)?;

        Ok(())
    }

    #[test]
    fn section_menu_items_carry_their_section() {
        let response = MenuItemResponse::from(MenuItem::Section(Section::FollowUps));

        assert_eq!(response.kind, "section");
        assert_eq!(response.label, "Follow-ups");
        assert_eq!(response.section, Some("Follow-ups"));
    }

    #[test]
    fn update_user_access_parses_transport_values() {
        let request = UpdateUserAccessRequest {
            role: "data_personnel".to_owned(),
            permission_level: Some("viewer".to_owned()),
            assigned_sections: vec!["Members".to_owned(), "Finance".to_owned()],
        };

        let input = request.into_input().unwrap_or_else(|_| unreachable!());
        assert_eq!(input.role, Role::DataPersonnel);
        assert!(input.assigned_sections.contains(&Section::Finance));
        assert_eq!(input.assigned_sections.len(), 2);
    }

    #[test]
    fn update_user_access_rejects_unknown_sections() {
        let request = UpdateUserAccessRequest {
            role: "data_personnel".to_owned(),
            permission_level: None,
            assigned_sections: vec!["Sermons".to_owned()],
        };

        assert!(matches!(request.into_input(), Err(AppError::Validation(_))));
    }

    #[test]
    fn submit_request_with_unknown_type_is_reported_as_such() {
        let request = SubmitPermissionRequestRequest {
            request_type: "delete".to_owned(),
            data_type: "Sermon".to_owned(),
            data_id: "S-1".to_owned(),
            reason: "duplicate".to_owned(),
        };

        assert!(matches!(
            request.into_input(),
            Err(AppError::UnknownEntityType(_))
        ));
    }

    #[test]
    fn submit_request_parses_request_type_and_data_type() {
        let request = SubmitPermissionRequestRequest {
            request_type: "edit".to_owned(),
            data_type: "Member".to_owned(),
            data_id: "HKM-003".to_owned(),
            reason: "typo in phone".to_owned(),
        };

        let input = request.into_input().unwrap_or_else(|_| unreachable!());
        assert_eq!(input.request_type, RequestType::Edit);
        assert_eq!(input.data_type, EntityType::Member);
    }

    #[test]
    fn attendance_batch_parses_date_and_statuses() {
        let request = SaveAttendanceRequest {
            date: "2026-03-01".to_owned(),
            entries: vec![AttendanceEntryRequest {
                member_id: "HKM-001".to_owned(),
                status: "present".to_owned(),
            }],
        };

        let (date, entries) = request.into_parts().unwrap_or_else(|_| unreachable!());
        assert_eq!(date.to_string(), "2026-03-01");
        assert_eq!(entries[0].status, AttendanceStatus::Present);
    }

    #[test]
    fn attendance_batch_rejects_bad_status() {
        let request = SaveAttendanceRequest {
            date: "2026-03-01".to_owned(),
            entries: vec![AttendanceEntryRequest {
                member_id: "HKM-001".to_owned(),
                status: "late".to_owned(),
            }],
        };

        assert!(matches!(request.into_parts(), Err(AppError::Validation(_))));
    }

    #[test]
    fn recycle_bin_item_serializes_type_field() {
        let deleted_at = Utc
            .with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
            .single()
            .unwrap_or_default();
        let item = RecycleBinItem::from_storage(
            "bin-1",
            "HKM-003",
            "Member",
            json!({"name": "Ama"}),
            "admin-1",
            deleted_at,
            None,
        )
        .unwrap_or_else(|_| unreachable!());

        let value = serde_json::to_value(RecycleBinItemResponse::from(item)).unwrap_or_default();
        assert_eq!(value["type"], "Member");
        assert_eq!(value["original_id"], "HKM-003");
    }
}
