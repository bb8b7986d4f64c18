//! Domain model for the records gateway.
//!
//! The policy core (roles, state machines, edit window, access engine) is
//! pure and synchronous; the workflow services wrap it around the upstream
//! gateway ports. Nothing in this module knows about HTTP.

pub mod access;
pub mod account;
pub mod attestation;
pub mod attestation_service;
pub mod catalogue;
pub mod catalogue_service;
pub mod directory_service;
pub mod edit_window;
pub mod error;
pub mod ports;
pub mod request;
pub mod request_service;
pub mod role;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use access::{Decision, DenialReason, Target, decide};
pub use account::{
    AccountId, AccountUpdate, AccountValidationError, NewAccount, USERNAME_MIN, UserAccount,
};
pub use attestation::{
    AlreadyDelivered, Attestation, AttestationDraft, AttestationId, AttestationStatus,
    AttestationValidationError,
};
pub use attestation_service::AttestationWorkflow;
pub use catalogue::{TYPE_LABEL_MIN, TypeCatalogEntry, TypeId, TypeLabel, TypeLabelValidationError};
pub use catalogue_service::CatalogueWorkflow;
pub use directory_service::{DeleteReport, DeleteUserError, DirectoryWorkflow};
pub use edit_window::{EDIT_WINDOW_MINUTES, EditAccess, can_edit, evaluate, minutes_remaining};
pub use error::{Error, ErrorCode, ErrorValidationError};
pub use ports::{
    AttestationsGateway, CatalogueGateway, DirectoryGateway, ExportDocument, RequestPatch,
    RequestsGateway, UpstreamError,
};
pub use request::{
    RequestForm, RequestId, RequestRecord, RequestStatus, RequestValidationError,
    TransitionCommand, TransitionError,
};
pub use request_service::{AnnotatedRequest, RequestWorkflow};
pub use role::{Action, Resource, Role, can_attempt};
pub use session::{AccessToken, Claims, Session, decode_optional};
