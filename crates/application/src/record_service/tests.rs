use chrono::NaiveDate;
use ecclesia_core::AppError;
use ecclesia_domain::{
    AttendanceStatus, EntityType, PermissionLevel, RequestType, Role, Section, UserProfile,
};
use serde_json::json;

use crate::test_fakes::Harness;
use crate::{
    AttendanceEntry, RecordListQuery, RecordRepository, RecycleBinQuery,
    SubmitPermissionRequestInput,
};

fn sunday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 1).unwrap_or_default()
}

#[tokio::test]
async fn create_member_allocates_prefixed_ids() {
    let harness = Harness::new();
    let admin = harness.add_user("admin", Role::Admin).await;

    let mut ids = Vec::new();
    for first_name in ["Ama", "Kofi"] {
        let record = harness
            .record_service
            .create_record(
                &admin,
                EntityType::Member,
                json!({ "first_name": first_name, "last_name": "Mensah" }),
            )
            .await
            .unwrap_or_else(|_| unreachable!());
        ids.push(record.record_id().to_owned());
    }

    assert_eq!(ids, vec!["HKM-001", "HKM-002"]);
    assert_eq!(
        harness.audit.actions().await,
        vec!["record.created", "record.created"]
    );
}

#[tokio::test]
async fn create_rejects_invalid_payloads() {
    let harness = Harness::new();
    let admin = harness.add_user("admin", Role::Admin).await;

    let missing_name = harness
        .record_service
        .create_record(&admin, EntityType::Member, json!({ "first_name": "Ama" }))
        .await;
    let bad_amount = harness
        .record_service
        .create_record(
            &admin,
            EntityType::Transaction,
            json!({ "amount": -5, "transaction_type": "income" }),
        )
        .await;
    let users = harness
        .record_service
        .create_record(&admin, EntityType::User, json!({}))
        .await;

    assert!(matches!(missing_name, Err(AppError::Validation(_))));
    assert!(matches!(bad_amount, Err(AppError::Validation(_))));
    assert!(matches!(users, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn data_personnel_create_only_in_assigned_sections() {
    let harness = Harness::new();
    let profile = UserProfile::new("dp", "Clerk", None, Role::DataPersonnel)
        .unwrap_or_else(|_| unreachable!())
        .with_assigned_sections([Section::Members, Section::AddMember]);
    let actor = harness.add_profile(profile).await;

    let member = harness
        .record_service
        .create_record(
            &actor,
            EntityType::Member,
            json!({ "first_name": "Ama", "last_name": "Mensah" }),
        )
        .await;
    let transaction = harness
        .record_service
        .create_record(
            &actor,
            EntityType::Transaction,
            json!({ "amount": 20, "transaction_type": "income" }),
        )
        .await;
    let finance = harness
        .record_service
        .list_records(&actor, EntityType::Transaction, RecordListQuery::default())
        .await;

    assert!(member.is_ok());
    assert!(matches!(transaction, Err(AppError::Forbidden(_))));
    assert!(matches!(finance, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn deleting_a_member_leaves_exactly_one_envelope() {
    let harness = Harness::new();
    let admin = harness.add_user("admin", Role::Admin).await;
    harness.seed_members(3).await;

    let result = harness
        .record_service
        .delete_record(&admin, EntityType::Member, "HKM-003", Some("moved away"))
        .await;
    let members = harness
        .record_service
        .list_records(&admin, EntityType::Member, RecordListQuery::default())
        .await
        .unwrap_or_default();
    let envelopes = harness
        .recycle_bin_service
        .list_items(&admin, RecycleBinQuery::default())
        .await
        .unwrap_or_default();

    assert!(result.is_ok());
    assert!(members.iter().all(|member| member.record_id() != "HKM-003"));
    assert_eq!(members.len(), 2);
    assert_eq!(envelopes.len(), 1);
    assert_eq!(envelopes[0].type_tag(), "Member");
    assert_eq!(envelopes[0].original_id(), "HKM-003");
}

#[tokio::test]
async fn delete_then_restore_returns_field_equal_record() {
    let harness = Harness::new();
    let admin = harness.add_user("admin", Role::Admin).await;
    let created = harness
        .record_service
        .create_record(
            &admin,
            EntityType::Visitor,
            json!({ "first_name": "Yaw", "last_name": "Owusu", "phone": "024" }),
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    harness
        .record_service
        .delete_record(&admin, EntityType::Visitor, created.record_id(), None)
        .await
        .unwrap_or_else(|_| unreachable!());
    let envelope = harness
        .recycle_bin_service
        .list_items(&admin, RecycleBinQuery::default())
        .await
        .unwrap_or_default()
        .remove(0);
    harness
        .recycle_bin_service
        .restore(&admin, envelope.id())
        .await
        .unwrap_or_else(|_| unreachable!());

    let restored = harness
        .record_service
        .get_record(&admin, EntityType::Visitor, created.record_id())
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(restored.data(), created.data());
}

#[tokio::test]
async fn member_editor_updates_own_record_but_needs_grant_for_others() {
    let harness = Harness::new();
    let profile = UserProfile::new("member-1", "Esi", None, Role::Member)
        .unwrap_or_else(|_| unreachable!())
        .with_permission_level(Some(PermissionLevel::Editor));
    let actor = harness.add_profile(profile).await;
    let admin = harness.add_user("admin", Role::Admin).await;

    let own = harness
        .record_service
        .create_record(
            &actor,
            EntityType::Visitor,
            json!({ "first_name": "Yaw", "last_name": "Owusu" }),
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    let others = harness
        .seed_record(EntityType::Group, json!({ "name": "Choir" }), "admin")
        .await;

    let own_update = harness
        .record_service
        .update_record(
            &actor,
            EntityType::Visitor,
            own.record_id(),
            json!({ "first_name": "Yaw", "last_name": "Owusu-Ansah" }),
        )
        .await;
    let blocked = harness
        .record_service
        .update_record(
            &actor,
            EntityType::Group,
            others.record_id(),
            json!({ "name": "Mass Choir" }),
        )
        .await;
    assert!(own_update.is_ok());
    assert!(matches!(blocked, Err(AppError::Forbidden(_))));

    let request = harness
        .permission_request_service
        .submit(
            &actor,
            SubmitPermissionRequestInput {
                request_type: RequestType::Edit,
                data_type: EntityType::Group,
                data_id: others.record_id().to_owned(),
                reason: "rename".to_owned(),
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    harness
        .permission_request_service
        .approve(&admin, &request.id, None)
        .await
        .unwrap_or_else(|_| unreachable!());

    let granted = harness
        .record_service
        .update_record(
            &actor,
            EntityType::Group,
            others.record_id(),
            json!({ "name": "Mass Choir" }),
        )
        .await;
    assert_eq!(
        granted.ok().map(|record| record.data().clone()),
        Some(json!({ "name": "Mass Choir" }))
    );
}

#[tokio::test]
async fn attendance_batch_overwrites_marks_for_the_same_date() {
    let harness = Harness::new();
    let admin = harness.add_user("admin", Role::Admin).await;
    let members = harness.seed_members(2).await;
    let entries = |status| {
        members
            .iter()
            .map(|member| AttendanceEntry {
                member_id: member.record_id().to_owned(),
                status,
            })
            .collect::<Vec<_>>()
    };

    harness
        .record_service
        .save_attendance(&admin, sunday(), entries(AttendanceStatus::Present))
        .await
        .unwrap_or_else(|_| unreachable!());
    harness
        .record_service
        .save_attendance(&admin, sunday(), entries(AttendanceStatus::Absent))
        .await
        .unwrap_or_else(|_| unreachable!());

    let rows = harness
        .record_service
        .list_records(&admin, EntityType::AttendanceRecord, RecordListQuery::default())
        .await
        .unwrap_or_default();
    assert_eq!(rows.len(), 2);
    assert!(rows
        .iter()
        .all(|row| row.data().get("status") == Some(&json!("absent"))));
}

#[tokio::test]
async fn attendance_batch_rejects_unknown_members() {
    let harness = Harness::new();
    let admin = harness.add_user("admin", Role::Admin).await;
    harness.seed_members(1).await;

    let result = harness
        .record_service
        .save_attendance(
            &admin,
            sunday(),
            vec![
                AttendanceEntry {
                    member_id: "HKM-001".to_owned(),
                    status: AttendanceStatus::Present,
                },
                AttendanceEntry {
                    member_id: "HKM-404".to_owned(),
                    status: AttendanceStatus::Present,
                },
            ],
        )
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(harness
        .records
        .records
        .lock()
        .await
        .iter()
        .all(|record| record.entity_type() == EntityType::Member));
}

#[tokio::test]
async fn attendance_update_cannot_take_another_rows_member_and_date() {
    let harness = Harness::new();
    let admin = harness.add_user("admin", Role::Admin).await;
    let members = harness.seed_members(2).await;
    let saved = harness
        .record_service
        .save_attendance(
            &admin,
            sunday(),
            members
                .iter()
                .map(|member| AttendanceEntry {
                    member_id: member.record_id().to_owned(),
                    status: AttendanceStatus::Present,
                })
                .collect(),
        )
        .await
        .unwrap_or_default();
    assert_eq!(saved.len(), 2);

    let moved = harness
        .record_service
        .update_record(
            &admin,
            EntityType::AttendanceRecord,
            saved[1].record_id(),
            json!({
                "member_id": members[0].record_id(),
                "date": "2026-03-01",
                "status": "absent",
            }),
        )
        .await;
    let restated = harness
        .record_service
        .update_record(
            &admin,
            EntityType::AttendanceRecord,
            saved[0].record_id(),
            json!({
                "member_id": members[0].record_id(),
                "date": "2026-03-01",
                "status": "absent",
            }),
        )
        .await;

    assert!(matches!(moved, Err(AppError::Conflict(_))));
    assert!(restated.is_ok());
}

#[tokio::test]
async fn attendance_update_rejects_unknown_members() {
    let harness = Harness::new();
    let admin = harness.add_user("admin", Role::Admin).await;
    let members = harness.seed_members(1).await;
    let saved = harness
        .record_service
        .save_attendance(
            &admin,
            sunday(),
            vec![AttendanceEntry {
                member_id: members[0].record_id().to_owned(),
                status: AttendanceStatus::Present,
            }],
        )
        .await
        .unwrap_or_default();

    let result = harness
        .record_service
        .update_record(
            &admin,
            EntityType::AttendanceRecord,
            saved[0].record_id(),
            json!({ "member_id": "HKM-999", "date": "2026-03-01", "status": "absent" }),
        )
        .await;
    let stored = harness
        .records
        .find_record(EntityType::AttendanceRecord, saved[0].record_id())
        .await
        .unwrap_or_default();

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(
        stored.and_then(|record| record.data().get("status").cloned()),
        Some(json!("present"))
    );
}
