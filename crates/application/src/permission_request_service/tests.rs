use chrono::{Duration, Utc};
use ecclesia_core::AppError;
use ecclesia_domain::{EntityType, RequestStatus, RequestType, Role, Section, UserProfile};
use serde_json::json;

use crate::SubmitPermissionRequestInput;
use crate::test_fakes::Harness;

fn edit_input(data_type: EntityType, data_id: &str) -> SubmitPermissionRequestInput {
    SubmitPermissionRequestInput {
        request_type: RequestType::Edit,
        data_type,
        data_id: data_id.to_owned(),
        reason: "phone number changed".to_owned(),
    }
}

#[tokio::test]
async fn submit_captures_target_label_and_requester() {
    let harness = Harness::new();
    let actor = harness.add_user("member-1", Role::Member).await;
    let member = harness
        .seed_record(
            EntityType::Member,
            json!({ "first_name": "Ama", "last_name": "Mensah" }),
            "admin",
        )
        .await;

    let request = harness
        .permission_request_service
        .submit(&actor, edit_input(EntityType::Member, member.record_id()))
        .await;

    let request = request.unwrap_or_else(|_| unreachable!());
    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(request.requester_id, "member-1");
    assert_eq!(request.target.data_name, "Ama Mensah");
    assert_eq!(harness.requests.requests.lock().await.len(), 1);
    assert_eq!(harness.audit.actions().await, vec!["permission.requested"]);
}

#[tokio::test]
async fn submit_rejects_roles_without_request_workflow() {
    let harness = Harness::new();
    let actor = harness.add_user("admin", Role::Admin).await;
    let branch = harness
        .seed_record(EntityType::Branch, json!({ "name": "Accra" }), "admin")
        .await;

    let result = harness
        .permission_request_service
        .submit(&actor, edit_input(EntityType::Branch, branch.record_id()))
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn submit_requires_existing_record_and_reason() {
    let harness = Harness::new();
    let actor = harness.add_user("member-1", Role::Member).await;
    let group = harness
        .seed_record(EntityType::Group, json!({ "name": "Ushers" }), "admin")
        .await;

    let missing = harness
        .permission_request_service
        .submit(&actor, edit_input(EntityType::Group, "nope"))
        .await;
    let blank_reason = harness
        .permission_request_service
        .submit(
            &actor,
            SubmitPermissionRequestInput {
                reason: "   ".to_owned(),
                ..edit_input(EntityType::Group, group.record_id())
            },
        )
        .await;
    let user_target = harness
        .permission_request_service
        .submit(&actor, edit_input(EntityType::User, "someone"))
        .await;

    assert!(matches!(missing, Err(AppError::NotFound(_))));
    assert!(matches!(blank_reason, Err(AppError::Validation(_))));
    assert!(matches!(user_target, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn approve_opens_a_day_long_window_and_blocks_second_review() {
    let harness = Harness::new();
    let requester = harness.add_user("member-1", Role::Member).await;
    let admin = harness.add_user("admin", Role::Admin).await;
    let group = harness
        .seed_record(EntityType::Group, json!({ "name": "Ushers" }), "admin")
        .await;
    let request = harness
        .permission_request_service
        .submit(&requester, edit_input(EntityType::Group, group.record_id()))
        .await
        .unwrap_or_else(|_| unreachable!());

    let approved = harness
        .permission_request_service
        .approve(&admin, &request.id, Some("ok"))
        .await
        .unwrap_or_else(|_| unreachable!());
    let second = harness
        .permission_request_service
        .deny(&admin, &request.id, "changed my mind")
        .await;

    assert_eq!(approved.status, RequestStatus::Approved);
    assert_eq!(approved.reviewed_by.as_deref(), Some("admin"));
    let window = approved
        .expires_at
        .zip(approved.reviewed_at)
        .map(|(expires_at, reviewed_at)| expires_at - reviewed_at);
    assert_eq!(window, Some(Duration::hours(24)));
    assert!(matches!(second, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn deny_requires_notes_and_clears_expiry() {
    let harness = Harness::new();
    let requester = harness.add_user("member-1", Role::Member).await;
    let admin = harness.add_user("admin", Role::SuperAdmin).await;
    let group = harness
        .seed_record(EntityType::Group, json!({ "name": "Ushers" }), "admin")
        .await;
    let request = harness
        .permission_request_service
        .submit(&requester, edit_input(EntityType::Group, group.record_id()))
        .await
        .unwrap_or_else(|_| unreachable!());

    let without_notes = harness
        .permission_request_service
        .deny(&admin, &request.id, " ")
        .await;
    let denied = harness
        .permission_request_service
        .deny(&admin, &request.id, "not your group")
        .await
        .unwrap_or_else(|_| unreachable!());

    assert!(matches!(without_notes, Err(AppError::Validation(_))));
    assert_eq!(denied.status, RequestStatus::Denied);
    assert_eq!(denied.expires_at, None);
    assert_eq!(denied.review_notes.as_deref(), Some("not your group"));
}

#[tokio::test]
async fn non_admins_cannot_review() {
    let harness = Harness::new();
    let requester = harness.add_user("member-1", Role::Member).await;
    let peer = harness.add_user("member-2", Role::Member).await;
    let group = harness
        .seed_record(EntityType::Group, json!({ "name": "Ushers" }), "admin")
        .await;
    let request = harness
        .permission_request_service
        .submit(&requester, edit_input(EntityType::Group, group.record_id()))
        .await
        .unwrap_or_else(|_| unreachable!());

    let result = harness
        .permission_request_service
        .approve(&peer, &request.id, None)
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn listing_scopes_non_admins_to_their_own_requests() {
    let harness = Harness::new();
    let first = harness.add_user("member-1", Role::Member).await;
    let dp_profile = UserProfile::new("dp", "Data Clerk", None, Role::DataPersonnel)
        .unwrap_or_else(|_| unreachable!())
        .with_assigned_sections([Section::Groups]);
    let second = harness.add_profile(dp_profile).await;
    let admin = harness.add_user("admin", Role::Admin).await;
    let group = harness
        .seed_record(EntityType::Group, json!({ "name": "Ushers" }), "admin")
        .await;

    for actor in [&first, &second] {
        harness
            .permission_request_service
            .submit(actor, edit_input(EntityType::Group, group.record_id()))
            .await
            .unwrap_or_else(|_| unreachable!());
    }

    let own = harness
        .permission_request_service
        .list_requests(&first, None, 50, 0)
        .await
        .unwrap_or_default();
    let all = harness
        .permission_request_service
        .list_requests(&admin, Some(RequestStatus::Pending), 50, 0)
        .await
        .unwrap_or_default();

    assert_eq!(own.len(), 1);
    assert_eq!(own[0].requester_id, "member-1");
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn expiry_sweep_marks_elapsed_approvals() {
    let harness = Harness::new();
    let requester = harness.add_user("member-1", Role::Member).await;
    let admin = harness.add_user("admin", Role::Admin).await;
    let group = harness
        .seed_record(EntityType::Group, json!({ "name": "Ushers" }), "admin")
        .await;
    let request = harness
        .permission_request_service
        .submit(&requester, edit_input(EntityType::Group, group.record_id()))
        .await
        .unwrap_or_else(|_| unreachable!());
    harness
        .permission_request_service
        .approve(&admin, &request.id, None)
        .await
        .unwrap_or_else(|_| unreachable!());

    let untouched = harness
        .permission_request_service
        .expire_elapsed_grants()
        .await;
    assert_eq!(untouched.ok(), Some(0));

    for stored in harness.requests.requests.lock().await.iter_mut() {
        stored.expires_at = Some(Utc::now() - Duration::minutes(1));
    }

    let expired = harness
        .permission_request_service
        .expire_elapsed_grants()
        .await;
    let listed = harness
        .permission_request_service
        .list_requests(&requester, Some(RequestStatus::Expired), 50, 0)
        .await
        .unwrap_or_default();

    assert_eq!(expired.ok(), Some(1));
    assert_eq!(listed.len(), 1);
}
