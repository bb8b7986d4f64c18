//! Request aggregate: the administrative filing and its status machine.
//!
//! Statuses are a closed enum with an explicit transition function; the wire
//! never carries a status the machine has not sanctioned. Transitions are
//! forward-only: a filing may skip `IN_PROGRESS`, but `PROCESSED` and
//! `REJECTED` are terminal and nothing moves backwards.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use super::account::AccountId;

/// Numeric request identifier assigned by the upstream records API.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct RequestId(pub i64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Processing status of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    /// Registered at the counter, untouched by processing.
    New,
    /// Picked up by a processing agent.
    InProgress,
    /// Completed successfully.
    Processed,
    /// Refused, with a mandatory reason.
    Rejected,
}

impl RequestStatus {
    /// Whether this status accepts no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Processed | Self::Rejected)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::New => "NEW",
            Self::InProgress => "IN_PROGRESS",
            Self::Processed => "PROCESSED",
            Self::Rejected => "REJECTED",
        };
        f.write_str(label)
    }
}

/// Why a requested status change is illegal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// Rejecting a filing requires a non-empty reason.
    #[error("a rejection reason is required when rejecting a request")]
    ReasonRequired,
    /// The move is not part of the forward-only machine.
    #[error("cannot move a request from {from} to {to}")]
    IllegalMove {
        from: RequestStatus,
        to: RequestStatus,
    },
}

impl RequestStatus {
    /// Validate a move to `target`, returning the new status.
    ///
    /// `rejection_reason` is consulted only when `target` is
    /// [`RequestStatus::Rejected`]; blank reasons are rejected before any
    /// network call happens.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::{RequestStatus, TransitionError};
    ///
    /// let next = RequestStatus::New
    ///     .transition(RequestStatus::Processed, None)
    ///     .expect("legal move");
    /// assert_eq!(next, RequestStatus::Processed);
    ///
    /// let err = RequestStatus::Processed
    ///     .transition(RequestStatus::New, None)
    ///     .expect_err("terminal state");
    /// assert!(matches!(err, TransitionError::IllegalMove { .. }));
    /// ```
    pub fn transition(
        self,
        target: Self,
        rejection_reason: Option<&str>,
    ) -> Result<Self, TransitionError> {
        let legal = match (self, target) {
            (Self::New, Self::InProgress | Self::Processed | Self::Rejected) => true,
            (Self::InProgress, Self::Processed | Self::Rejected) => true,
            _ => false,
        };
        if !legal {
            return Err(TransitionError::IllegalMove { from: self, to: target });
        }
        if target == Self::Rejected && rejection_reason.is_none_or(|r| r.trim().is_empty()) {
            return Err(TransitionError::ReasonRequired);
        }
        Ok(target)
    }
}

/// A request as returned by the upstream records API.
///
/// ## Invariants
/// - At least one of `national_id`, `tax_id`, `common_enterprise_id` is
///   non-empty (enforced on every inbound form, see [`RequestForm::validate`]).
/// - `rejection_reason` is present iff `status` is `REJECTED`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestRecord {
    pub id: RequestId,
    /// Corporate name or the full name of a natural person.
    pub applicant_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub national_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub common_enterprise_id: Option<String>,
    /// Free-text purpose of the filing.
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub status: RequestStatus,
    /// Server-assigned creation instant; anchors the edit window.
    pub created_at: DateTime<Utc>,
    /// Weak reference to the registering account.
    pub creator_id: AccountId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<AccountId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

/// Validation errors for [`RequestForm`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestValidationError {
    BlankApplicantName,
    MissingIdentification,
    BlankSubject,
}

impl fmt::Display for RequestValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BlankApplicantName => write!(f, "applicant name must not be blank"),
            Self::MissingIdentification => write!(
                f,
                "at least one of nationalId, taxId, or commonEnterpriseId is required",
            ),
            Self::BlankSubject => write!(f, "subject must not be blank"),
        }
    }
}

impl std::error::Error for RequestValidationError {}

/// Core fields submitted by the create and edit forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestForm {
    pub applicant_name: String,
    #[serde(default)]
    pub national_id: Option<String>,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub common_enterprise_id: Option<String>,
    pub subject: String,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

fn has_text(value: Option<&String>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

impl RequestForm {
    /// Enforce the cross-field identification invariant before any network
    /// call.
    pub fn validate(&self) -> Result<(), RequestValidationError> {
        if self.applicant_name.trim().is_empty() {
            return Err(RequestValidationError::BlankApplicantName);
        }
        if !(has_text(self.national_id.as_ref())
            || has_text(self.tax_id.as_ref())
            || has_text(self.common_enterprise_id.as_ref()))
        {
            return Err(RequestValidationError::MissingIdentification);
        }
        if self.subject.trim().is_empty() {
            return Err(RequestValidationError::BlankSubject);
        }
        Ok(())
    }
}

/// Context carried by a processing transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransitionCommand {
    /// Target status the agent selected.
    pub target: RequestStatus,
    /// Day the filing was worked, as recorded by the agent.
    #[serde(default)]
    pub processed_on: Option<NaiveDate>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    /// Mandatory when `target` is `REJECTED`.
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(RequestStatus::New, RequestStatus::InProgress, true)]
    #[case(RequestStatus::New, RequestStatus::Processed, true)]
    #[case(RequestStatus::InProgress, RequestStatus::Processed, true)]
    #[case(RequestStatus::InProgress, RequestStatus::New, false)]
    #[case(RequestStatus::Processed, RequestStatus::InProgress, false)]
    #[case(RequestStatus::Processed, RequestStatus::New, false)]
    #[case(RequestStatus::Rejected, RequestStatus::InProgress, false)]
    #[case(RequestStatus::New, RequestStatus::New, false)]
    fn forward_only_moves(
        #[case] from: RequestStatus,
        #[case] to: RequestStatus,
        #[case] legal: bool,
    ) {
        let outcome = from.transition(to, Some("because"));
        assert_eq!(outcome.is_ok(), legal, "{from} -> {to}");
    }

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some("   "))]
    fn rejection_requires_reason(#[case] reason: Option<&str>) {
        let err = RequestStatus::New
            .transition(RequestStatus::Rejected, reason)
            .expect_err("reason required");
        assert_eq!(err, TransitionError::ReasonRequired);
    }

    #[rstest]
    fn rejection_with_reason_is_legal() {
        let next = RequestStatus::InProgress
            .transition(RequestStatus::Rejected, Some("incomplete dossier"))
            .expect("legal move");
        assert_eq!(next, RequestStatus::Rejected);
    }

    #[rstest]
    fn processing_without_reason_is_legal() {
        let next = RequestStatus::New
            .transition(RequestStatus::Processed, None)
            .expect("reason only required for rejection");
        assert_eq!(next, RequestStatus::Processed);
    }

    fn form() -> RequestForm {
        RequestForm {
            applicant_name: "ACME SARL".to_owned(),
            national_id: None,
            tax_id: Some("1048576".to_owned()),
            common_enterprise_id: None,
            subject: "tax clearance".to_owned(),
            sector: None,
            email: None,
            phone: None,
        }
    }

    #[rstest]
    fn form_with_one_identifier_is_valid() {
        form().validate().expect("valid form");
    }

    #[rstest]
    fn form_without_identifiers_is_rejected() {
        let mut f = form();
        f.tax_id = Some("   ".to_owned());
        let err = f.validate().expect_err("identification required");
        assert_eq!(err, RequestValidationError::MissingIdentification);
    }

    #[rstest]
    fn form_with_blank_applicant_is_rejected() {
        let mut f = form();
        f.applicant_name = " ".to_owned();
        let err = f.validate().expect_err("applicant required");
        assert_eq!(err, RequestValidationError::BlankApplicantName);
    }
}
