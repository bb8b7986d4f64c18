//! Attestation aggregate: issued certificates and their one-way delivery
//! transition.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use super::account::AccountId;

/// Numeric attestation identifier assigned by the upstream records API.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct AttestationId(pub i64);

impl fmt::Display for AttestationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Delivery status of an attestation. Strictly one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttestationStatus {
    /// Issued and waiting for the applicant to collect it.
    Filed,
    /// Handed over; terminal.
    Delivered,
}

impl fmt::Display for AttestationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Filed => "FILED",
            Self::Delivered => "DELIVERED",
        };
        f.write_str(label)
    }
}

/// Error raised when delivering a record that is no longer deliverable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("attestation is already delivered")]
pub struct AlreadyDelivered;

impl AttestationStatus {
    /// Validate the single `FILED -> DELIVERED` move.
    ///
    /// Re-delivering is rejected rather than silently succeeding; the
    /// caller maps this onto a stale-state denial.
    pub const fn deliver(self) -> Result<Self, AlreadyDelivered> {
        match self {
            Self::Filed => Ok(Self::Delivered),
            Self::Delivered => Err(AlreadyDelivered),
        }
    }
}

/// An attestation as returned by the upstream records API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Attestation {
    pub id: AttestationId,
    /// Derived machine code of a catalog entry (see
    /// [`crate::domain::TypeLabel::derived_code`]).
    pub type_code: String,
    pub status: AttestationStatus,
    pub creator_id: AccountId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validation errors for [`AttestationDraft`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttestationValidationError {
    BlankTypeCode,
    MalformedTypeCode,
}

impl fmt::Display for AttestationValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BlankTypeCode => write!(f, "attestation type code must not be blank"),
            Self::MalformedTypeCode => write!(
                f,
                "attestation type code must be lowercase alphanumerics and underscores",
            ),
        }
    }
}

impl std::error::Error for AttestationValidationError {}

/// Payload submitted by the create-attestation form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttestationDraft {
    /// Derived code of the selected catalog entry.
    pub type_code: String,
}

impl AttestationDraft {
    /// Check the code shape before any network call. Whether the code names
    /// an existing catalog entry is the upstream's decision.
    pub fn validate(&self) -> Result<(), AttestationValidationError> {
        if self.type_code.trim().is_empty() {
            return Err(AttestationValidationError::BlankTypeCode);
        }
        let well_formed = self
            .type_code
            .chars()
            .all(|c| c == '_' || c.is_ascii_lowercase() || c.is_ascii_digit());
        if !well_formed {
            return Err(AttestationValidationError::MalformedTypeCode);
        }
        Ok(())
    }
}
