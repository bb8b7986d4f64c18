//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct which generates the OpenAPI specification
//! for the REST surface. The generated document backs Swagger UI in debug
//! builds.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    AnnotatedRequest, Attestation, AttestationDraft, Error, ErrorCode, RequestForm, RequestRecord,
    TransitionCommand, TypeCatalogEntry, UserAccount,
};
use crate::domain::{AccountUpdate, NewAccount};
use crate::inbound::http::catalogue::LabelPayload;
use crate::inbound::http::users::DeleteResponse;

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Token issued by the upstream records API."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Records gateway API",
        description = "Policy-enforcing gateway over the agency records API."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::requests::list_requests,
        crate::inbound::http::requests::export_requests,
        crate::inbound::http::requests::get_request,
        crate::inbound::http::requests::create_request,
        crate::inbound::http::requests::edit_request,
        crate::inbound::http::requests::transition_request,
        crate::inbound::http::attestations::list_attestations,
        crate::inbound::http::attestations::export_attestations,
        crate::inbound::http::attestations::get_attestation,
        crate::inbound::http::attestations::create_attestation,
        crate::inbound::http::attestations::deliver_attestation,
        crate::inbound::http::attestations::attestation_receipt,
        crate::inbound::http::catalogue::list_types,
        crate::inbound::http::catalogue::create_type,
        crate::inbound::http::catalogue::update_type,
        crate::inbound::http::catalogue::delete_type,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        AnnotatedRequest,
        RequestRecord,
        RequestForm,
        TransitionCommand,
        Attestation,
        AttestationDraft,
        TypeCatalogEntry,
        UserAccount,
        NewAccount,
        AccountUpdate,
        LabelPayload,
        DeleteResponse,
    )),
    tags(
        (name = "requests", description = "Request lifecycle operations"),
        (name = "attestations", description = "Attestation filing and delivery"),
        (name = "catalogue", description = "Attestation type catalogue administration"),
        (name = "users", description = "Staff directory administration"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get("Error").expect("Error schema");
        let utoipa::openapi::RefOr::T(utoipa::openapi::schema::Schema::Object(object)) =
            error_schema
        else {
            panic!("expected Object schema");
        };
        assert!(object.properties.contains_key("code"));
        assert!(object.properties.contains_key("message"));
    }

    #[test]
    fn every_resource_tag_is_documented() {
        let doc = ApiDoc::openapi();
        let tags: Vec<String> = doc
            .tags
            .unwrap_or_default()
            .into_iter()
            .map(|tag| tag.name)
            .collect();
        for expected in ["requests", "attestations", "catalogue", "users", "health"] {
            assert!(tags.iter().any(|name| name == expected), "missing {expected}");
        }
    }
}
