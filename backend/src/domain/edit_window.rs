//! Edit-window policy: who may still modify a request's core fields, and for
//! how long.
//!
//! One unified rule replaces the historical per-screen variants: managers and
//! processing agents edit anything at any time, frontdesk clerks edit only
//! their own filings inside a rolling fifteen-minute window. The calendar-day
//! variant that once lived on the list screen was a defect and is gone.

use chrono::{DateTime, Duration, Utc};

use super::account::AccountId;
use super::request::RequestRecord;
use super::role::Role;

/// Length of the frontdesk edit window, in minutes.
pub const EDIT_WINDOW_MINUTES: i64 = 15;

/// Fine-grained outcome of an edit-rights evaluation.
///
/// [`can_edit`] collapses this to a boolean; the access engine keeps the
/// distinction so callers can tell "not yours" from "too late".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditAccess {
    /// Editing is permitted right now.
    Granted,
    /// The role never edits requests.
    RoleForbidden,
    /// Frontdesk clerks only edit their own filings.
    NotOwner,
    /// The rolling window has elapsed.
    WindowExpired,
}

/// Evaluate edit rights for one request instance at one instant.
///
/// Pure; safe to call once per rendered list row. The window comparison is
/// strict: editing is allowed while `now - created_at` is less than fifteen
/// minutes and denied from the boundary onwards.
pub fn evaluate(
    role: Role,
    current_user: AccountId,
    request: &RequestRecord,
    now: DateTime<Utc>,
) -> EditAccess {
    match role {
        Role::Manager | Role::Processing => EditAccess::Granted,
        Role::Admin => EditAccess::RoleForbidden,
        Role::Frontdesk => {
            if request.creator_id != current_user {
                return EditAccess::NotOwner;
            }
            if now - request.created_at < Duration::minutes(EDIT_WINDOW_MINUTES) {
                EditAccess::Granted
            } else {
                EditAccess::WindowExpired
            }
        }
    }
}

/// Boolean contract over [`evaluate`].
///
/// # Examples
/// ```
/// use backend::domain::{AccountId, Role, can_edit};
/// # use backend::domain::{RequestId, RequestRecord, RequestStatus};
/// use chrono::{Duration, Utc};
///
/// # let request = RequestRecord {
/// #     id: RequestId(1),
/// #     applicant_name: "ACME".into(),
/// #     national_id: None,
/// #     tax_id: Some("42".into()),
/// #     common_enterprise_id: None,
/// #     subject: "clearance".into(),
/// #     sector: None,
/// #     email: None,
/// #     phone: None,
/// #     status: RequestStatus::New,
/// #     created_at: Utc::now() - Duration::minutes(10),
/// #     creator_id: AccountId(7),
/// #     agent_id: None,
/// #     processed_at: None,
/// #     rejection_reason: None,
/// # };
/// assert!(can_edit(Role::Frontdesk, AccountId(7), &request, Utc::now()));
/// assert!(can_edit(Role::Manager, AccountId(999), &request, Utc::now()));
/// ```
pub fn can_edit(
    role: Role,
    current_user: AccountId,
    request: &RequestRecord,
    now: DateTime<Utc>,
) -> bool {
    evaluate(role, current_user, request, now) == EditAccess::Granted
}

/// Whole minutes left in the frontdesk window, clamped to the window bounds.
///
/// Surfaced on the detail screen and on each list row so clerks see how
/// long they have left. A `created_at` ahead of `now` (clock skew between
/// this service and the records API) reads as a full window, never more.
pub fn minutes_remaining(created_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (EDIT_WINDOW_MINUTES - (now - created_at).num_minutes()).clamp(0, EDIT_WINDOW_MINUTES)
}
