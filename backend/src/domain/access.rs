//! Access decision engine: the single gate every UI action passes through.
//!
//! Composes the role catalog, the state machines, and the edit-window policy
//! into one pure entry point. A denial is a value, never an exception; the
//! services fold it into the API error envelope so the caller can drive
//! messaging from the stable denial code.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::attestation::Attestation;
use super::edit_window::{self, EditAccess};
use super::error::Error;
use super::request::RequestRecord;
use super::role::{Action, Resource, can_attempt};
use super::session::Session;

/// Stable denial taxonomy, serialized kebab-case in error details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum DenialReason {
    /// The role (or an anonymous session) may never attempt this action.
    RoleForbidden,
    /// The frontdesk edit window has elapsed.
    WindowExpired,
    /// Frontdesk clerks only edit their own filings.
    NotOwner,
    /// The requested status move violates the state machine.
    InvalidTransition,
    /// The target user is referenced by existing requests.
    HasDependents,
    /// The instance no longer matches the state that made the action
    /// meaningful (e.g. already delivered).
    StaleState,
}

impl DenialReason {
    /// Kebab-case code carried back to the UI.
    pub fn as_code(self) -> &'static str {
        match self {
            Self::RoleForbidden => "role-forbidden",
            Self::WindowExpired => "window-expired",
            Self::NotOwner => "not-owner",
            Self::InvalidTransition => "invalid-transition",
            Self::HasDependents => "has-dependents",
            Self::StaleState => "stale-state",
        }
    }

    /// Fold the denial into the API error envelope.
    pub fn into_error(self) -> Error {
        let error = match self {
            Self::RoleForbidden => Error::forbidden("role may not attempt this action"),
            Self::WindowExpired => Error::forbidden("the edit window for this request has expired"),
            Self::NotOwner => Error::forbidden("only the creator may edit this request"),
            Self::InvalidTransition => Error::conflict("the requested status change is not legal"),
            Self::HasDependents => {
                Error::conflict("user is referenced by existing requests; reassign them first")
            }
            Self::StaleState => Error::conflict("the record changed since it was loaded"),
        };
        error.with_details(serde_json::json!({ "denial": self.as_code() }))
    }
}

/// Outcome of an access decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The action may proceed to the upstream API.
    Allow,
    /// The action is refused for the given reason.
    Deny(DenialReason),
}

impl Decision {
    /// Turn the decision into a `Result`, folding denials into the error
    /// envelope.
    pub fn into_result(self) -> Result<(), Error> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny(reason) => Err(reason.into_error()),
        }
    }
}

/// Instance context for decisions that need more than the role table.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    /// No instance involved (listings, creations).
    None,
    /// A loaded request, for edit-window evaluation.
    Request(&'a RequestRecord),
    /// A loaded attestation, for stale-delivery detection.
    Attestation(&'a Attestation),
    /// A user account slated for deletion, with its dependent request count.
    UserAccount {
        /// Requests referencing the account as creator or agent.
        dependent_requests: u64,
    },
}

/// Decide whether `session` may perform `action` on `resource` now.
///
/// Pure and cache-free: callers re-evaluate with freshly loaded state
/// immediately before every mutation, because `now` advances and another
/// actor may have changed the instance since it was fetched.
///
/// # Examples
/// ```
/// use backend::domain::{
///     Action, Decision, DenialReason, Resource, Session, Target, decide,
/// };
/// use chrono::Utc;
///
/// let decision = decide(
///     &Session::Anonymous,
///     Resource::Request,
///     Action::ViewList,
///     Target::None,
///     Utc::now(),
/// );
/// assert_eq!(decision, Decision::Deny(DenialReason::RoleForbidden));
/// ```
pub fn decide(
    session: &Session,
    resource: Resource,
    action: Action,
    target: Target<'_>,
    now: DateTime<Utc>,
) -> Decision {
    let Some(claims) = session.claims() else {
        return Decision::Deny(DenialReason::RoleForbidden);
    };

    if !can_attempt(claims.role, resource, action) {
        return Decision::Deny(DenialReason::RoleForbidden);
    }

    match (resource, action, target) {
        (Resource::Request, Action::Edit, Target::Request(request)) => {
            match edit_window::evaluate(claims.role, claims.account, request, now) {
                EditAccess::Granted => Decision::Allow,
                EditAccess::NotOwner => Decision::Deny(DenialReason::NotOwner),
                EditAccess::WindowExpired => Decision::Deny(DenialReason::WindowExpired),
                EditAccess::RoleForbidden => Decision::Deny(DenialReason::RoleForbidden),
            }
        }
        (Resource::Request, Action::Transition, Target::Request(request)) => {
            // Target-state legality is the state machine's call; the engine
            // only refuses touching records that are already terminal.
            if request.status.is_terminal() {
                Decision::Deny(DenialReason::InvalidTransition)
            } else {
                Decision::Allow
            }
        }
        (Resource::Attestation, Action::Deliver, Target::Attestation(attestation)) => {
            match attestation.status.deliver() {
                Ok(_) => Decision::Allow,
                Err(_) => Decision::Deny(DenialReason::StaleState),
            }
        }
        (Resource::User, Action::Delete, Target::UserAccount { dependent_requests }) => {
            if dependent_requests > 0 {
                Decision::Deny(DenialReason::HasDependents)
            } else {
                Decision::Allow
            }
        }
        _ => Decision::Allow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::AccountId;
    use crate::domain::attestation::{AttestationId, AttestationStatus};
    use crate::domain::request::{RequestId, RequestStatus};
    use crate::domain::role::Role;
    use crate::domain::session::Claims;
    use chrono::{Duration, TimeZone};
    use rstest::rstest;

    fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).single().expect("valid instant")
    }

    fn session(role: Role, account: i64) -> Session {
        Session::Authenticated(Claims {
            account: AccountId(account),
            username: "someone".to_owned(),
            role,
            expires_at: None,
        })
    }

    fn request(creator: i64, minutes_ago: i64, status: RequestStatus) -> RequestRecord {
        RequestRecord {
            id: RequestId(1),
            applicant_name: "ACME SARL".to_owned(),
            national_id: Some("K1234".to_owned()),
            tax_id: None,
            common_enterprise_id: None,
            subject: "tax clearance".to_owned(),
            sector: None,
            email: None,
            phone: None,
            status,
            created_at: instant() - Duration::minutes(minutes_ago),
            creator_id: AccountId(creator),
            agent_id: None,
            processed_at: None,
            rejection_reason: None,
        }
    }

    fn attestation(status: AttestationStatus) -> Attestation {
        Attestation {
            id: AttestationId(3),
            type_code: "revenu_global".to_owned(),
            status,
            creator_id: AccountId(2),
            created_at: instant() - Duration::days(1),
            updated_at: instant() - Duration::hours(1),
        }
    }

    #[rstest]
    fn anonymous_sessions_are_denied_everything() {
        let decision = decide(
            &Session::Anonymous,
            Resource::Attestation,
            Action::ViewList,
            Target::None,
            instant(),
        );
        assert_eq!(decision, Decision::Deny(DenialReason::RoleForbidden));
    }

    #[rstest]
    // Pairs outside the role table are uniformly role-forbidden.
    #[case(Role::Admin, Resource::Request, Action::ViewList)]
    #[case(Role::Admin, Resource::Attestation, Action::Create)]
    #[case(Role::Admin, Resource::Type, Action::Delete)]
    #[case(Role::Admin, Resource::Dashboard, Action::ViewList)]
    #[case(Role::Manager, Resource::User, Action::Delete)]
    #[case(Role::Frontdesk, Resource::Type, Action::Create)]
    #[case(Role::Frontdesk, Resource::User, Action::ViewList)]
    #[case(Role::Frontdesk, Resource::Request, Action::Transition)]
    #[case(Role::Frontdesk, Resource::Dashboard, Action::ViewList)]
    #[case(Role::Processing, Resource::Type, Action::Edit)]
    #[case(Role::Processing, Resource::User, Action::Delete)]
    #[case(Role::Processing, Resource::Dashboard, Action::ViewList)]
    fn off_table_pairs_are_role_forbidden(
        #[case] role: Role,
        #[case] resource: Resource,
        #[case] action: Action,
    ) {
        let decision = decide(&session(role, 1), resource, action, Target::None, instant());
        assert_eq!(decision, Decision::Deny(DenialReason::RoleForbidden));
    }

    #[rstest]
    fn frontdesk_owner_inside_window_may_edit() {
        let request = request(7, 10, RequestStatus::New);
        let decision = decide(
            &session(Role::Frontdesk, 7),
            Resource::Request,
            Action::Edit,
            Target::Request(&request),
            instant(),
        );
        assert_eq!(decision, Decision::Allow);
    }

    #[rstest]
    fn frontdesk_owner_outside_window_is_window_expired() {
        let request = request(7, 20, RequestStatus::New);
        let decision = decide(
            &session(Role::Frontdesk, 7),
            Resource::Request,
            Action::Edit,
            Target::Request(&request),
            instant(),
        );
        assert_eq!(decision, Decision::Deny(DenialReason::WindowExpired));
    }

    #[rstest]
    fn frontdesk_non_owner_is_not_owner() {
        let request = request(8, 1, RequestStatus::New);
        let decision = decide(
            &session(Role::Frontdesk, 7),
            Resource::Request,
            Action::Edit,
            Target::Request(&request),
            instant(),
        );
        assert_eq!(decision, Decision::Deny(DenialReason::NotOwner));
    }

    #[rstest]
    fn manager_edits_regardless_of_window() {
        let request = request(8, 60 * 24, RequestStatus::InProgress);
        let decision = decide(
            &session(Role::Manager, 1),
            Resource::Request,
            Action::Edit,
            Target::Request(&request),
            instant(),
        );
        assert_eq!(decision, Decision::Allow);
    }

    #[rstest]
    #[case(RequestStatus::Processed)]
    #[case(RequestStatus::Rejected)]
    fn terminal_requests_refuse_transitions(#[case] status: RequestStatus) {
        let request = request(8, 60, status);
        let decision = decide(
            &session(Role::Processing, 2),
            Resource::Request,
            Action::Transition,
            Target::Request(&request),
            instant(),
        );
        assert_eq!(decision, Decision::Deny(DenialReason::InvalidTransition));
    }

    #[rstest]
    fn delivering_a_filed_attestation_is_allowed() {
        let attestation = attestation(AttestationStatus::Filed);
        let decision = decide(
            &session(Role::Frontdesk, 2),
            Resource::Attestation,
            Action::Deliver,
            Target::Attestation(&attestation),
            instant(),
        );
        assert_eq!(decision, Decision::Allow);
    }

    #[rstest]
    fn redelivering_is_stale_state() {
        let attestation = attestation(AttestationStatus::Delivered);
        let decision = decide(
            &session(Role::Manager, 2),
            Resource::Attestation,
            Action::Deliver,
            Target::Attestation(&attestation),
            instant(),
        );
        assert_eq!(decision, Decision::Deny(DenialReason::StaleState));
    }

    #[rstest]
    fn deleting_a_referenced_user_has_dependents() {
        let decision = decide(
            &session(Role::Admin, 1),
            Resource::User,
            Action::Delete,
            Target::UserAccount {
                dependent_requests: 3,
            },
            instant(),
        );
        assert_eq!(decision, Decision::Deny(DenialReason::HasDependents));
    }

    #[rstest]
    fn deleting_an_unreferenced_user_is_allowed() {
        let decision = decide(
            &session(Role::Admin, 1),
            Resource::User,
            Action::Delete,
            Target::UserAccount {
                dependent_requests: 0,
            },
            instant(),
        );
        assert_eq!(decision, Decision::Allow);
    }

    #[rstest]
    fn denial_errors_carry_the_kebab_code() {
        let error = DenialReason::WindowExpired.into_error();
        let details = error.details().expect("details present");
        assert_eq!(details["denial"], "window-expired");
    }
}
