//! Records gateway backend.
//!
//! A policy-enforcing HTTP gateway in front of the agency records API. The
//! domain layer holds the pure access policy (role catalogue, document state
//! machines, the frontdesk edit window, and the access decision engine); the
//! inbound layer exposes it over REST; the outbound layer forwards approved
//! calls upstream with the caller's own bearer token.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod server;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
