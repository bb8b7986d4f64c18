//! Role catalog: the fixed set of staff roles and what each may attempt.
//!
//! This is a pure lookup table. It answers "may this role ever attempt this
//! resource/action pair"; instance-level constraints such as ownership or the
//! edit window are layered on top by [`crate::domain::access`].

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Staff role carried by the session token. Exactly one per account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Account administration only.
    Admin,
    /// Supervises the whole document lifecycle.
    Manager,
    /// Registers filings at the counter.
    Frontdesk,
    /// Works filings through the processing pipeline.
    Processing,
}

impl Role {
    /// Parse the upstream wire form (`ROLE_MANAGER`, ...).
    ///
    /// Unknown strings yield `None`; callers treat that as "no role".
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "ROLE_ADMIN" => Some(Self::Admin),
            "ROLE_MANAGER" => Some(Self::Manager),
            "ROLE_FRONTDESK" => Some(Self::Frontdesk),
            "ROLE_PROCESSING" => Some(Self::Processing),
            _ => None,
        }
    }

    /// Upstream wire form with the `ROLE_` prefix.
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Admin => "ROLE_ADMIN",
            Self::Manager => "ROLE_MANAGER",
            Self::Frontdesk => "ROLE_FRONTDESK",
            Self::Processing => "ROLE_PROCESSING",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// Resource kinds the policy knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Resource {
    /// Administrative filings.
    Request,
    /// Issued certificates.
    Attestation,
    /// Attestation type catalog entries.
    Type,
    /// Staff accounts.
    User,
    /// Aggregate statistics screen.
    Dashboard,
}

/// Actions a session may attempt against a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// Render a listing.
    ViewList,
    /// Open a single record.
    ViewDetail,
    /// Submit the create form.
    Create,
    /// Modify the core fields of an existing record.
    Edit,
    /// Move a request through its processing statuses.
    Transition,
    /// Mark an attestation as delivered.
    Deliver,
    /// Remove a record.
    Delete,
}

/// Whether `role` may ever attempt `action` on `resource`.
///
/// Pure and side-effect free; safe to call once per rendered list row.
/// Frontdesk request edits pass this gate but remain subject to the
/// edit-window policy.
///
/// # Examples
/// ```
/// use backend::domain::{Action, Resource, Role, can_attempt};
///
/// assert!(can_attempt(Role::Manager, Resource::Type, Action::Delete));
/// assert!(!can_attempt(Role::Admin, Resource::Request, Action::ViewList));
/// ```
pub fn can_attempt(role: Role, resource: Resource, action: Action) -> bool {
    use Action::{Create, Delete, Deliver, Edit, Transition, ViewDetail, ViewList};
    use Resource::{Attestation, Dashboard, Request, Type, User};

    match (role, resource) {
        (Role::Admin, User) => matches!(action, Create | Edit | Delete | ViewList | ViewDetail),
        (Role::Admin, _) => false,
        (Role::Manager, Request) => {
            matches!(action, ViewList | ViewDetail | Create | Edit | Transition)
        }
        (Role::Manager, Attestation) => matches!(action, ViewList | ViewDetail | Create | Deliver),
        (Role::Manager, Type) => {
            matches!(action, ViewList | ViewDetail | Create | Edit | Delete)
        }
        (Role::Manager, Dashboard) => matches!(action, ViewList | ViewDetail),
        (Role::Manager, User) => false,
        (Role::Frontdesk, Request) => matches!(action, ViewList | ViewDetail | Create | Edit),
        (Role::Frontdesk, Attestation) => {
            matches!(action, ViewList | ViewDetail | Create | Deliver)
        }
        (Role::Frontdesk, _) => false,
        // Processing edits uniformly; the historical UI granted it on the
        // detail page only, which the unified policy resolves in favour of.
        (Role::Processing, Request) => {
            matches!(action, ViewList | ViewDetail | Create | Edit | Transition)
        }
        (Role::Processing, Attestation) => {
            matches!(action, ViewList | ViewDetail | Create | Deliver)
        }
        (Role::Processing, _) => false,
    }
}
