//! Attestation workflow service.
//!
//! Delivery is the only transition and it is one-way; the service re-fetches
//! the record before delivering so a stale UI cannot re-deliver silently.

use std::sync::Arc;

use mockable::Clock;

use super::access::{Target, decide};
use super::attestation::{Attestation, AttestationDraft, AttestationId};
use super::error::Error;
use super::ports::{AttestationsGateway, ExportDocument};
use super::request_service::require_token;
use super::role::{Action, Resource};
use super::session::{AccessToken, decode_optional};

/// Driving service for the `/attestations` resource.
pub struct AttestationWorkflow<G: ?Sized> {
    gateway: Arc<G>,
    clock: Arc<dyn Clock>,
}

impl<G: ?Sized> Clone for AttestationWorkflow<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<G: ?Sized> AttestationWorkflow<G> {
    /// Create a new workflow over the given gateway.
    pub fn new(gateway: Arc<G>, clock: Arc<dyn Clock>) -> Self {
        Self { gateway, clock }
    }
}

impl<G: AttestationsGateway + ?Sized> AttestationWorkflow<G> {
    /// List all tracked attestations.
    pub async fn list(&self, token: Option<&AccessToken>) -> Result<Vec<Attestation>, Error> {
        let now = self.clock.utc();
        let session = decode_optional(token, now);
        decide(
            &session,
            Resource::Attestation,
            Action::ViewList,
            Target::None,
            now,
        )
        .into_result()?;
        let token = require_token(token)?;

        Ok(self.gateway.track(token).await?)
    }

    /// Fetch one attestation.
    pub async fn detail(
        &self,
        token: Option<&AccessToken>,
        id: AttestationId,
    ) -> Result<Attestation, Error> {
        let now = self.clock.utc();
        let session = decode_optional(token, now);
        decide(
            &session,
            Resource::Attestation,
            Action::ViewDetail,
            Target::None,
            now,
        )
        .into_result()?;
        let token = require_token(token)?;

        Ok(self.gateway.fetch(token, id).await?)
    }

    /// File a new attestation.
    pub async fn create(
        &self,
        token: Option<&AccessToken>,
        draft: AttestationDraft,
    ) -> Result<Attestation, Error> {
        let now = self.clock.utc();
        let session = decode_optional(token, now);
        decide(
            &session,
            Resource::Attestation,
            Action::Create,
            Target::None,
            now,
        )
        .into_result()?;
        draft
            .validate()
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let token = require_token(token)?;

        Ok(self.gateway.create(token, &draft).await?)
    }

    /// Hand the certificate over, exactly once.
    ///
    /// Re-fetches the record first: another clerk may have delivered it
    /// since the caller's screen was rendered, and that must surface as a
    /// stale-state conflict rather than a silent second delivery.
    pub async fn deliver(
        &self,
        token: Option<&AccessToken>,
        id: AttestationId,
    ) -> Result<Attestation, Error> {
        let token_ref = require_token(token)?;
        let current = self.gateway.fetch(token_ref, id).await?;

        let now = self.clock.utc();
        let session = decode_optional(token, now);
        decide(
            &session,
            Resource::Attestation,
            Action::Deliver,
            Target::Attestation(&current),
            now,
        )
        .into_result()?;

        Ok(self.gateway.deliver(token_ref, id).await?)
    }

    /// Proxy the delivery receipt.
    pub async fn receipt(
        &self,
        token: Option<&AccessToken>,
        id: AttestationId,
    ) -> Result<ExportDocument, Error> {
        let now = self.clock.utc();
        let session = decode_optional(token, now);
        decide(
            &session,
            Resource::Attestation,
            Action::ViewDetail,
            Target::None,
            now,
        )
        .into_result()?;
        let token = require_token(token)?;

        Ok(self.gateway.receipt(token, id).await?)
    }

    /// Proxy the spreadsheet export.
    pub async fn export(&self, token: Option<&AccessToken>) -> Result<ExportDocument, Error> {
        let now = self.clock.utc();
        let session = decode_optional(token, now);
        decide(
            &session,
            Resource::Attestation,
            Action::ViewList,
            Target::None,
            now,
        )
        .into_result()?;
        let token = require_token(token)?;

        Ok(self.gateway.export_excel(token).await?)
    }
}
