//! Domain ports defining the edges of the hexagon.
//!
//! The upstream records API is the only driven collaborator. Each resource
//! gets its own gateway trait so adapters and mocks stay small, and every
//! trait surfaces the same strongly typed [`UpstreamError`] instead of an
//! `anyhow::Result`.

use async_trait::async_trait;
use thiserror::Error;

use super::account::{AccountId, AccountUpdate, NewAccount, UserAccount};
use super::attestation::{Attestation, AttestationDraft, AttestationId};
use super::catalogue::{TypeCatalogEntry, TypeId, TypeLabel};
use super::request::{RequestForm, RequestId, RequestRecord, RequestStatus};
use super::session::AccessToken;

/// Failures surfaced by the upstream records API adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    /// The upstream could not be reached at the transport level.
    #[error("upstream records API unreachable: {message}")]
    Transport { message: String },
    /// The upstream rejected the call with a non-success status.
    #[error("upstream records API returned {status}: {message}")]
    Status { status: u16, message: String },
    /// The addressed record does not exist.
    #[error("record not found upstream")]
    NotFound,
    /// The upstream refused a user delete because requests still reference
    /// the account.
    #[error("user is still referenced by existing requests")]
    DependentRecords,
    /// The upstream payload could not be decoded.
    #[error("upstream payload could not be decoded: {message}")]
    Decode { message: String },
}

impl UpstreamError {
    /// Helper for transport-level failures.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Helper for non-success statuses.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Helper for payload decoding failures.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

impl From<UpstreamError> for super::error::Error {
    fn from(value: UpstreamError) -> Self {
        use super::access::DenialReason;
        use super::error::Error;
        match value {
            UpstreamError::Transport { message } => {
                Error::service_unavailable(format!("upstream records API unreachable: {message}"))
            }
            UpstreamError::Status { status, message } => {
                Error::internal(format!("upstream records API returned {status}: {message}"))
            }
            UpstreamError::NotFound => Error::not_found("record not found"),
            UpstreamError::DependentRecords => DenialReason::HasDependents.into_error(),
            UpstreamError::Decode { message } => {
                Error::internal(format!("upstream payload could not be decoded: {message}"))
            }
        }
    }
}

/// An opaque downloadable document proxied from the upstream (receipts,
/// spreadsheet exports). The gateway never inspects the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    /// MIME type reported by the upstream.
    pub content_type: String,
    /// Raw document bytes.
    pub bytes: Vec<u8>,
}

/// Wire payload for a request mutation. Edits and transitions share the
/// upstream `PUT /requests/{id}` endpoint; unset fields are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestPatch {
    /// Core form fields, present for edits.
    pub form: Option<RequestForm>,
    /// New status, present for transitions.
    pub status: Option<RequestStatus>,
    /// Processing context stamped by transitions.
    pub processed_on: Option<chrono::NaiveDate>,
    pub sector: Option<String>,
    pub contact: Option<String>,
    pub rejection_reason: Option<String>,
    /// Acting agent, stamped when a processing role transitions.
    pub agent_id: Option<AccountId>,
    /// Replacement creator reference, used only by reassign-then-delete.
    pub creator_id: Option<AccountId>,
}

/// Gateway for the `/requests` resource.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RequestsGateway: Send + Sync {
    /// Fetch the tracking list.
    async fn track(&self, token: &AccessToken) -> Result<Vec<RequestRecord>, UpstreamError>;

    /// Fetch one request.
    async fn fetch(
        &self,
        token: &AccessToken,
        id: RequestId,
    ) -> Result<RequestRecord, UpstreamError>;

    /// Create a request from the validated form.
    async fn create(
        &self,
        token: &AccessToken,
        form: &RequestForm,
    ) -> Result<RequestRecord, UpstreamError>;

    /// Apply an edit or transition patch.
    async fn update(
        &self,
        token: &AccessToken,
        id: RequestId,
        patch: &RequestPatch,
    ) -> Result<RequestRecord, UpstreamError>;

    /// Download the spreadsheet export as opaque bytes.
    async fn export_excel(&self, token: &AccessToken) -> Result<ExportDocument, UpstreamError>;
}

/// Gateway for the `/attestations` resource.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttestationsGateway: Send + Sync {
    /// Fetch the tracking list.
    async fn track(&self, token: &AccessToken) -> Result<Vec<Attestation>, UpstreamError>;

    /// Fetch one attestation.
    async fn fetch(
        &self,
        token: &AccessToken,
        id: AttestationId,
    ) -> Result<Attestation, UpstreamError>;

    /// Create an attestation from the validated draft.
    async fn create(
        &self,
        token: &AccessToken,
        draft: &AttestationDraft,
    ) -> Result<Attestation, UpstreamError>;

    /// Mark an attestation delivered.
    async fn deliver(
        &self,
        token: &AccessToken,
        id: AttestationId,
    ) -> Result<Attestation, UpstreamError>;

    /// Download the delivery receipt as opaque bytes.
    async fn receipt(
        &self,
        token: &AccessToken,
        id: AttestationId,
    ) -> Result<ExportDocument, UpstreamError>;

    /// Download the spreadsheet export as opaque bytes.
    async fn export_excel(&self, token: &AccessToken) -> Result<ExportDocument, UpstreamError>;
}

/// Gateway for the `/type-attestations` resource.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogueGateway: Send + Sync {
    /// Fetch all catalog entries.
    async fn list(&self, token: &AccessToken) -> Result<Vec<TypeCatalogEntry>, UpstreamError>;

    /// Create an entry from a validated label.
    async fn create(
        &self,
        token: &AccessToken,
        label: &TypeLabel,
    ) -> Result<TypeCatalogEntry, UpstreamError>;

    /// Relabel an existing entry.
    async fn update(
        &self,
        token: &AccessToken,
        id: TypeId,
        label: &TypeLabel,
    ) -> Result<TypeCatalogEntry, UpstreamError>;

    /// Delete an entry.
    async fn delete(&self, token: &AccessToken, id: TypeId) -> Result<(), UpstreamError>;
}

/// Gateway for the `/users` resource.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectoryGateway: Send + Sync {
    /// Fetch all staff accounts.
    async fn list(&self, token: &AccessToken) -> Result<Vec<UserAccount>, UpstreamError>;

    /// Provision a new staff account.
    async fn create(
        &self,
        token: &AccessToken,
        account: &NewAccount,
    ) -> Result<UserAccount, UpstreamError>;

    /// Update an existing staff account.
    async fn update(
        &self,
        token: &AccessToken,
        id: AccountId,
        update: &AccountUpdate,
    ) -> Result<UserAccount, UpstreamError>;

    /// Delete a staff account. Surfaces [`UpstreamError::DependentRecords`]
    /// when requests still reference the account.
    async fn delete(&self, token: &AccessToken, id: AccountId) -> Result<(), UpstreamError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn status_errors_render_their_code() {
        let err = UpstreamError::status(502, "bad gateway");
        assert_eq!(
            err.to_string(),
            "upstream records API returned 502: bad gateway",
        );
    }

    #[rstest]
    fn patches_default_to_untouched_fields() {
        let patch = RequestPatch::default();
        assert!(patch.form.is_none());
        assert!(patch.status.is_none());
        assert!(patch.agent_id.is_none());
    }
}
