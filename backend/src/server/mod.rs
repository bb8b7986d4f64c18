//! Server construction and wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use mockable::DefaultClock;
use tracing::info;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http::attestations::{
    attestation_receipt, create_attestation, deliver_attestation, export_attestations,
    get_attestation, list_attestations,
};
use crate::inbound::http::catalogue::{create_type, delete_type, list_types, update_type};
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::requests::{
    create_request, edit_request, export_requests, get_request, list_requests, transition_request,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::inbound::http::users::{create_user, delete_user, list_users, update_user};
use crate::outbound::upstream::UpstreamClient;

/// Shared application state handed to every worker.
#[derive(Clone)]
pub struct AppDependencies {
    pub health_state: web::Data<HealthState>,
    pub http_state: web::Data<HttpState>,
}

/// Assemble the Actix application: all handlers under `/api/v1`, health
/// probes at the root, and Swagger UI in debug builds.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
    } = deps;

    let api = web::scope("/api/v1")
        .app_data(http_state)
        .service(list_requests)
        .service(export_requests)
        .service(create_request)
        .service(transition_request)
        .service(get_request)
        .service(edit_request)
        .service(list_attestations)
        .service(export_attestations)
        .service(create_attestation)
        .service(deliver_attestation)
        .service(attestation_receipt)
        .service(get_attestation)
        .service(list_types)
        .service(create_type)
        .service(update_type)
        .service(delete_type)
        .service(list_users)
        .service(create_user)
        .service(update_user)
        .service(delete_user);

    let app = App::new()
        .app_data(health_state)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app =
        app.service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Bind and run the gateway until shutdown.
///
/// # Errors
/// Returns an error when the upstream client cannot be constructed or the
/// listen address cannot be bound.
pub async fn run(config: ServerConfig) -> std::io::Result<()> {
    let client = Arc::new(
        UpstreamClient::with_timeout(config.upstream_base.clone(), config.upstream_timeout)
            .map_err(|err| std::io::Error::other(format!("upstream client: {err}")))?,
    );
    let http_state = web::Data::new(HttpState::new(HttpStatePorts {
        requests: client.clone(),
        attestations: client.clone(),
        catalogue: client.clone(),
        directory: client,
        clock: Arc::new(DefaultClock),
    }));
    let health_state = web::Data::new(HealthState::new());

    let deps = AppDependencies {
        health_state: health_state.clone(),
        http_state,
    };
    let server = HttpServer::new(move || build_app(deps.clone())).bind(config.bind_addr)?;

    health_state.mark_ready();
    info!(addr = %config.bind_addr, upstream = %config.upstream_base, "gateway listening");
    server.run().await
}
