//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on the domain workflows and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    AttestationsGateway, CatalogueGateway, DirectoryGateway, RequestsGateway,
};
use crate::domain::{
    AttestationWorkflow, CatalogueWorkflow, DirectoryWorkflow, RequestWorkflow,
};

/// Parameter object bundling the gateway implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub requests: Arc<dyn RequestsGateway>,
    pub attestations: Arc<dyn AttestationsGateway>,
    pub catalogue: Arc<dyn CatalogueGateway>,
    pub directory: Arc<dyn DirectoryGateway>,
    pub clock: Arc<dyn Clock>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub requests: RequestWorkflow<dyn RequestsGateway>,
    pub attestations: AttestationWorkflow<dyn AttestationsGateway>,
    pub catalogue: CatalogueWorkflow<dyn CatalogueGateway>,
    pub directory: DirectoryWorkflow<dyn DirectoryGateway, dyn RequestsGateway>,
}

impl HttpState {
    /// Wire the workflows over a gateway bundle.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            requests,
            attestations,
            catalogue,
            directory,
            clock,
        } = ports;
        Self {
            requests: RequestWorkflow::new(Arc::clone(&requests), Arc::clone(&clock)),
            attestations: AttestationWorkflow::new(attestations, Arc::clone(&clock)),
            catalogue: CatalogueWorkflow::new(catalogue, Arc::clone(&clock)),
            directory: DirectoryWorkflow::new(directory, requests, clock),
        }
    }
}
