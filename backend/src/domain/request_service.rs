//! Request workflow service.
//!
//! Every operation decodes the caller's session, asks the access engine, and
//! only then touches the upstream gateway. Mutations re-fetch the instance so
//! the decision is made against current state, not whatever the UI loaded.

use std::sync::Arc;

use mockable::Clock;
use serde::Serialize;
use utoipa::ToSchema;

use super::access::{DenialReason, Target, decide};
use super::edit_window::{can_edit, minutes_remaining};
use super::error::Error;
use super::ports::{ExportDocument, RequestPatch, RequestsGateway};
use super::request::{
    RequestForm, RequestId, RequestRecord, RequestValidationError, TransitionCommand,
};
use super::role::{Action, Resource};
use super::session::{AccessToken, Session, decode_optional};

/// A request annotated with the caller's edit rights, as rendered per list
/// row and on the detail screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedRequest {
    #[serde(flatten)]
    pub record: RequestRecord,
    /// Whether the caller may edit this request right now.
    pub editable: bool,
    /// Whole minutes left in the frontdesk window, clamped to zero.
    pub minutes_remaining: i64,
}

fn map_validation(err: RequestValidationError) -> Error {
    Error::invalid_request(err.to_string())
}

/// Driving service for the `/requests` resource.
pub struct RequestWorkflow<G: ?Sized> {
    gateway: Arc<G>,
    clock: Arc<dyn Clock>,
}

impl<G: ?Sized> Clone for RequestWorkflow<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<G: ?Sized> RequestWorkflow<G> {
    /// Create a new workflow over the given gateway.
    pub fn new(gateway: Arc<G>, clock: Arc<dyn Clock>) -> Self {
        Self { gateway, clock }
    }
}

impl<G: RequestsGateway + ?Sized> RequestWorkflow<G> {
    fn annotate(&self, session: &Session, record: RequestRecord) -> AnnotatedRequest {
        let now = self.clock.utc();
        let editable = session
            .claims()
            .is_some_and(|claims| can_edit(claims.role, claims.account, &record, now));
        let remaining = minutes_remaining(record.created_at, now);
        AnnotatedRequest {
            record,
            editable,
            minutes_remaining: remaining,
        }
    }

    /// List all tracked requests, annotated with the caller's edit rights.
    pub async fn list(&self, token: Option<&AccessToken>) -> Result<Vec<AnnotatedRequest>, Error> {
        let session = decode_optional(token, self.clock.utc());
        decide(
            &session,
            Resource::Request,
            Action::ViewList,
            Target::None,
            self.clock.utc(),
        )
        .into_result()?;
        let token = require_token(token)?;

        let records = self.gateway.track(token).await?;
        Ok(records
            .into_iter()
            .map(|record| self.annotate(&session, record))
            .collect())
    }

    /// Fetch one request with edit-rights annotation.
    pub async fn detail(
        &self,
        token: Option<&AccessToken>,
        id: RequestId,
    ) -> Result<AnnotatedRequest, Error> {
        let session = decode_optional(token, self.clock.utc());
        decide(
            &session,
            Resource::Request,
            Action::ViewDetail,
            Target::None,
            self.clock.utc(),
        )
        .into_result()?;
        let token = require_token(token)?;

        let record = self.gateway.fetch(token, id).await?;
        Ok(self.annotate(&session, record))
    }

    /// Register a new filing.
    pub async fn create(
        &self,
        token: Option<&AccessToken>,
        form: RequestForm,
    ) -> Result<RequestRecord, Error> {
        let session = decode_optional(token, self.clock.utc());
        decide(
            &session,
            Resource::Request,
            Action::Create,
            Target::None,
            self.clock.utc(),
        )
        .into_result()?;
        form.validate().map_err(map_validation)?;
        let token = require_token(token)?;

        Ok(self.gateway.create(token, &form).await?)
    }

    /// Edit the core fields of an existing filing.
    ///
    /// The instance is re-fetched so the edit-window decision runs against
    /// current state; another actor may have transitioned the request since
    /// the caller loaded it.
    pub async fn edit(
        &self,
        token: Option<&AccessToken>,
        id: RequestId,
        form: RequestForm,
    ) -> Result<RequestRecord, Error> {
        let token_ref = require_token(token)?;
        let current = self.gateway.fetch(token_ref, id).await?;

        let now = self.clock.utc();
        let session = decode_optional(token, now);
        decide(
            &session,
            Resource::Request,
            Action::Edit,
            Target::Request(&current),
            now,
        )
        .into_result()?;
        form.validate().map_err(map_validation)?;

        let patch = RequestPatch {
            form: Some(form),
            ..RequestPatch::default()
        };
        Ok(self.gateway.update(token_ref, id, &patch).await?)
    }

    /// Move a filing through its processing statuses.
    pub async fn transition(
        &self,
        token: Option<&AccessToken>,
        id: RequestId,
        command: TransitionCommand,
    ) -> Result<RequestRecord, Error> {
        let token_ref = require_token(token)?;
        let current = self.gateway.fetch(token_ref, id).await?;

        let now = self.clock.utc();
        let session = decode_optional(token, now);
        decide(
            &session,
            Resource::Request,
            Action::Transition,
            Target::Request(&current),
            now,
        )
        .into_result()?;

        let next = current
            .status
            .transition(command.target, command.rejection_reason.as_deref())
            .map_err(|err| {
                DenialReason::InvalidTransition
                    .into_error()
                    .with_details(serde_json::json!({
                        "denial": DenialReason::InvalidTransition.as_code(),
                        "message": err.to_string(),
                        "from": current.status,
                        "to": command.target,
                    }))
            })?;

        let claims = session
            .claims()
            .ok_or_else(|| Error::unauthorized("login required"))?;
        let patch = RequestPatch {
            status: Some(next),
            processed_on: command.processed_on.or_else(|| {
                next.is_terminal().then(|| now.date_naive())
            }),
            sector: command.sector,
            contact: command.contact,
            rejection_reason: command.rejection_reason,
            agent_id: Some(claims.account),
            ..RequestPatch::default()
        };
        Ok(self.gateway.update(token_ref, id, &patch).await?)
    }

    /// Proxy the spreadsheet export.
    pub async fn export(&self, token: Option<&AccessToken>) -> Result<ExportDocument, Error> {
        let session = decode_optional(token, self.clock.utc());
        decide(
            &session,
            Resource::Request,
            Action::ViewList,
            Target::None,
            self.clock.utc(),
        )
        .into_result()?;
        let token = require_token(token)?;

        Ok(self.gateway.export_excel(token).await?)
    }
}

/// The access engine denies anonymous sessions before any port call, so a
/// missing token past that point is a programming error surfaced as 401.
pub(crate) fn require_token(token: Option<&AccessToken>) -> Result<&AccessToken, Error> {
    token.ok_or_else(|| Error::unauthorized("login required"))
}
