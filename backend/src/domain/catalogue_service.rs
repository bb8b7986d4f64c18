//! Attestation type catalogue service.
//!
//! The catalogue is manager-only territory; labels are validated and their
//! machine codes derived locally before anything touches the upstream.

use std::sync::Arc;

use mockable::Clock;

use super::access::{Target, decide};
use super::catalogue::{TypeCatalogEntry, TypeId, TypeLabel, TypeLabelValidationError};
use super::error::Error;
use super::ports::CatalogueGateway;
use super::request_service::require_token;
use super::role::{Action, Resource};
use super::session::{AccessToken, decode_optional};

/// Driving service for the `/type-attestations` resource.
pub struct CatalogueWorkflow<G: ?Sized> {
    gateway: Arc<G>,
    clock: Arc<dyn Clock>,
}

impl<G: ?Sized> Clone for CatalogueWorkflow<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<G: ?Sized> CatalogueWorkflow<G> {
    /// Create a new workflow over the given gateway.
    pub fn new(gateway: Arc<G>, clock: Arc<dyn Clock>) -> Self {
        Self { gateway, clock }
    }
}

impl<G: CatalogueGateway + ?Sized> CatalogueWorkflow<G> {
    /// List the catalogue entries.
    pub async fn list(&self, token: Option<&AccessToken>) -> Result<Vec<TypeCatalogEntry>, Error> {
        self.authorise(token, Action::ViewList)?;
        let token = require_token(token)?;

        Ok(self.gateway.list(token).await?)
    }

    /// Add a catalogue entry from a raw label.
    pub async fn create(
        &self,
        token: Option<&AccessToken>,
        label: &str,
    ) -> Result<TypeCatalogEntry, Error> {
        self.authorise(token, Action::Create)?;
        let label = parse_label(label)?;
        let token = require_token(token)?;

        Ok(self.gateway.create(token, &label).await?)
    }

    /// Relabel an existing entry. The derived code changes with the label.
    pub async fn update(
        &self,
        token: Option<&AccessToken>,
        id: TypeId,
        label: &str,
    ) -> Result<TypeCatalogEntry, Error> {
        self.authorise(token, Action::Edit)?;
        let label = parse_label(label)?;
        let token = require_token(token)?;

        Ok(self.gateway.update(token, id, &label).await?)
    }

    /// Remove an entry from the catalogue.
    pub async fn delete(&self, token: Option<&AccessToken>, id: TypeId) -> Result<(), Error> {
        self.authorise(token, Action::Delete)?;
        let token = require_token(token)?;

        Ok(self.gateway.delete(token, id).await?)
    }

    fn authorise(&self, token: Option<&AccessToken>, action: Action) -> Result<(), Error> {
        let now = self.clock.utc();
        let session = decode_optional(token, now);
        decide(&session, Resource::Type, action, Target::None, now).into_result()
    }
}

fn parse_label(raw: &str) -> Result<TypeLabel, Error> {
    TypeLabel::new(raw)
        .map_err(|err: TypeLabelValidationError| Error::invalid_request(err.to_string()))
}
