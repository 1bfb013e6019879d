//! Time-boxed elevation requests for changing data a user did not originate.

use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use ecclesia_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EntityType, UserProfile};

/// Hours an approved request stays usable after review.
pub const GRANT_WINDOW_HOURS: i64 = 24;

/// Kind of change a request asks permission for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    /// Update an existing record.
    Edit,
    /// Move an existing record to the recycle bin.
    Delete,
}

impl RequestType {
    /// Returns a stable storage value for this request type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Edit => "edit",
            Self::Delete => "delete",
        }
    }
}

impl FromStr for RequestType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "edit" => Ok(Self::Edit),
            "delete" => Ok(Self::Delete),
            _ => Err(AppError::Validation(format!(
                "unknown request type '{value}'"
            ))),
        }
    }
}

/// Lifecycle state of a permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Awaiting review.
    Pending,
    /// Granted until `expires_at`.
    Approved,
    /// Refused by a reviewer.
    Denied,
    /// Granted, but the window has elapsed.
    Expired,
}

impl RequestStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Denied => "denied",
            Self::Expired => "expired",
        }
    }
}

impl FromStr for RequestStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "denied" => Ok(Self::Denied),
            "expired" => Ok(Self::Expired),
            _ => Err(AppError::Validation(format!(
                "unknown request status '{value}'"
            ))),
        }
    }
}

/// Record a permission request is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestTarget {
    /// Entity type of the record.
    pub data_type: EntityType,
    /// Record identifier.
    pub data_id: String,
    /// Human-readable record label.
    pub data_name: String,
}

/// Permission request row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRequest {
    /// Stable request identifier.
    pub id: String,
    /// Requesting subject.
    pub requester_id: String,
    /// Requester display name at submission time.
    pub requester_name: String,
    /// Requester email at submission time.
    pub requester_email: Option<String>,
    /// Requested change.
    pub request_type: RequestType,
    /// Record the change applies to.
    pub target: RequestTarget,
    /// Justification supplied by the requester.
    pub reason: String,
    /// Submission time.
    pub requested_at: DateTime<Utc>,
    /// Current lifecycle state.
    pub status: RequestStatus,
    /// Reviewing subject.
    pub reviewed_by: Option<String>,
    /// Review time.
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Reviewer notes.
    pub review_notes: Option<String>,
    /// End of the grant window for approved requests.
    pub expires_at: Option<DateTime<Utc>>,
}

impl PermissionRequest {
    /// Creates a pending request on behalf of a limited-privilege user.
    pub fn submit(
        requester: &UserProfile,
        request_type: RequestType,
        target: RequestTarget,
        reason: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        if !requester.role().capabilities().needs_permission_request {
            return Err(AppError::Forbidden(format!(
                "role '{}' does not submit permission requests",
                requester.role().display_name()
            )));
        }

        let reason = NonEmptyString::for_field("reason", reason.trim())?;
        let data_id = NonEmptyString::for_field("data_id", target.data_id.trim())?;

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            requester_id: requester.subject().to_owned(),
            requester_name: requester.display_name().to_owned(),
            requester_email: requester.email().map(str::to_owned),
            request_type,
            target: RequestTarget {
                data_id: data_id.into(),
                ..target
            },
            reason: reason.into(),
            requested_at: now,
            status: RequestStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
            review_notes: None,
            expires_at: None,
        })
    }

    /// Approves the request and opens the grant window.
    pub fn approve(
        &mut self,
        reviewer: &UserProfile,
        notes: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        self.ensure_reviewable(reviewer)?;

        self.status = RequestStatus::Approved;
        self.reviewed_by = Some(reviewer.subject().to_owned());
        self.reviewed_at = Some(now);
        self.review_notes = notes
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_owned);
        self.expires_at = Some(now + Duration::hours(GRANT_WINDOW_HOURS));
        Ok(())
    }

    /// Denies the request. Notes are mandatory.
    pub fn deny(&mut self, reviewer: &UserProfile, notes: &str, now: DateTime<Utc>) -> AppResult<()> {
        let notes = NonEmptyString::for_field("review_notes", notes.trim())?;
        self.ensure_reviewable(reviewer)?;

        self.status = RequestStatus::Denied;
        self.reviewed_by = Some(reviewer.subject().to_owned());
        self.reviewed_at = Some(now);
        self.review_notes = Some(notes.into());
        self.expires_at = None;
        Ok(())
    }

    /// Marks an approved request expired once its window has elapsed.
    ///
    /// Returns whether the status changed.
    pub fn expire_if_elapsed(&mut self, now: DateTime<Utc>) -> bool {
        if self.status == RequestStatus::Approved && self.expires_at.is_some_and(|at| at <= now) {
            self.status = RequestStatus::Expired;
            return true;
        }
        false
    }

    /// Status as observed at `now`, treating elapsed approvals as expired.
    #[must_use]
    pub fn effective_status(&self, now: DateTime<Utc>) -> RequestStatus {
        if self.status == RequestStatus::Approved && self.expires_at.is_some_and(|at| at <= now) {
            return RequestStatus::Expired;
        }
        self.status
    }

    /// Returns whether this request currently grants the given change.
    #[must_use]
    pub fn grants(
        &self,
        requester_id: &str,
        request_type: RequestType,
        data_type: EntityType,
        data_id: &str,
        now: DateTime<Utc>,
    ) -> bool {
        self.effective_status(now) == RequestStatus::Approved
            && self.requester_id == requester_id
            && self.request_type == request_type
            && self.target.data_type == data_type
            && self.target.data_id == data_id
    }

    fn ensure_reviewable(&self, reviewer: &UserProfile) -> AppResult<()> {
        if !reviewer.role().capabilities().can_access_all {
            return Err(AppError::Forbidden(format!(
                "subject '{}' may not review permission requests",
                reviewer.subject()
            )));
        }

        if self.status != RequestStatus::Pending {
            return Err(AppError::Conflict(format!(
                "permission request '{}' is already {}",
                self.id,
                self.status.as_str()
            )));
        }

        Ok(())
    }
}
