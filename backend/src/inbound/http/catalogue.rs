//! Attestation type catalogue HTTP handlers.
//!
//! ```text
//! GET    /api/v1/type-attestations
//! POST   /api/v1/type-attestations
//! PUT    /api/v1/type-attestations/{id}
//! DELETE /api/v1/type-attestations/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::{Error, TypeCatalogEntry, TypeId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::BearerAuth;
use crate::inbound::http::state::HttpState;

/// Request payload carrying a raw catalogue label.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LabelPayload {
    pub label: String,
}

/// List the catalogue entries.
#[utoipa::path(
    get,
    path = "/api/v1/type-attestations",
    responses(
        (status = 200, description = "Catalogue entries", body = [TypeCatalogEntry]),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["catalogue"],
    operation_id = "listAttestationTypes"
)]
#[get("/type-attestations")]
pub async fn list_types(
    state: web::Data<HttpState>,
    auth: BearerAuth,
) -> ApiResult<web::Json<Vec<TypeCatalogEntry>>> {
    Ok(web::Json(state.catalogue.list(auth.token()).await?))
}

/// Add a catalogue entry.
#[utoipa::path(
    post,
    path = "/api/v1/type-attestations",
    request_body = LabelPayload,
    responses(
        (status = 201, description = "Created entry", body = TypeCatalogEntry),
        (status = 400, description = "Invalid label", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["catalogue"],
    operation_id = "createAttestationType"
)]
#[post("/type-attestations")]
pub async fn create_type(
    state: web::Data<HttpState>,
    auth: BearerAuth,
    payload: web::Json<LabelPayload>,
) -> ApiResult<HttpResponse> {
    let entry = state
        .catalogue
        .create(auth.token(), &payload.label)
        .await?;
    Ok(HttpResponse::Created().json(entry))
}

/// Relabel an existing entry.
#[utoipa::path(
    put,
    path = "/api/v1/type-attestations/{id}",
    params(("id" = i64, Path, description = "Catalogue entry identifier")),
    request_body = LabelPayload,
    responses(
        (status = 200, description = "Updated entry", body = TypeCatalogEntry),
        (status = 400, description = "Invalid label", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown entry", body = Error)
    ),
    tags = ["catalogue"],
    operation_id = "updateAttestationType"
)]
#[put("/type-attestations/{id}")]
pub async fn update_type(
    state: web::Data<HttpState>,
    auth: BearerAuth,
    path: web::Path<i64>,
    payload: web::Json<LabelPayload>,
) -> ApiResult<web::Json<TypeCatalogEntry>> {
    let id = TypeId(path.into_inner());
    let entry = state
        .catalogue
        .update(auth.token(), id, &payload.label)
        .await?;
    Ok(web::Json(entry))
}

/// Remove an entry from the catalogue.
#[utoipa::path(
    delete,
    path = "/api/v1/type-attestations/{id}",
    params(("id" = i64, Path, description = "Catalogue entry identifier")),
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown entry", body = Error)
    ),
    tags = ["catalogue"],
    operation_id = "deleteAttestationType"
)]
#[delete("/type-attestations/{id}")]
pub async fn delete_type(
    state: web::Data<HttpState>,
    auth: BearerAuth,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let id = TypeId(path.into_inner());
    state.catalogue.delete(auth.token(), id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        MockAttestationsGateway, MockCatalogueGateway, MockDirectoryGateway, MockRequestsGateway,
    };
    use crate::domain::role::Role;
    use crate::domain::test_support::{frozen_clock, token_for};
    use crate::inbound::http::state::HttpStatePorts;
    use actix_web::http::{StatusCode, header};
    use actix_web::{App, test};
    use std::sync::Arc;

    fn state_with(catalogue: MockCatalogueGateway) -> web::Data<HttpState> {
        web::Data::new(HttpState::new(HttpStatePorts {
            requests: Arc::new(MockRequestsGateway::new()),
            attestations: Arc::new(MockAttestationsGateway::new()),
            catalogue: Arc::new(catalogue),
            directory: Arc::new(MockDirectoryGateway::new()),
            clock: frozen_clock(),
        }))
    }

    #[actix_rt::test]
    async fn frontdesk_cannot_create_catalogue_entries() {
        let mut gateway = MockCatalogueGateway::new();
        gateway.expect_create().times(0);
        let app = test::init_service(
            App::new().app_data(state_with(gateway)).service(create_type),
        )
        .await;

        let token = token_for(Role::Frontdesk, 5);
        let request = test::TestRequest::post()
            .uri("/type-attestations")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token.as_str())))
            .set_json(serde_json::json!({ "label": "Revenu Global" }))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[actix_rt::test]
    async fn deleting_an_entry_returns_no_content() {
        let mut gateway = MockCatalogueGateway::new();
        gateway
            .expect_delete()
            .times(1)
            .return_once(|_, _| Ok(()));
        let app = test::init_service(
            App::new().app_data(state_with(gateway)).service(delete_type),
        )
        .await;

        let token = token_for(Role::Manager, 1);
        let request = test::TestRequest::delete()
            .uri("/type-attestations/4")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token.as_str())))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
