//! Attestation HTTP handlers.
//!
//! ```text
//! GET  /api/v1/attestations
//! GET  /api/v1/attestations/export
//! GET  /api/v1/attestations/{id}
//! POST /api/v1/attestations
//! POST /api/v1/attestations/{id}/deliver
//! GET  /api/v1/attestations/{id}/receipt
//! ```

use actix_web::{HttpResponse, get, post, web};

use crate::domain::{Attestation, AttestationDraft, AttestationId, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::BearerAuth;
use crate::inbound::http::requests::export_response;
use crate::inbound::http::state::HttpState;

/// List tracked attestations.
#[utoipa::path(
    get,
    path = "/api/v1/attestations",
    responses(
        (status = 200, description = "Tracked attestations", body = [Attestation]),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["attestations"],
    operation_id = "listAttestations"
)]
#[get("/attestations")]
pub async fn list_attestations(
    state: web::Data<HttpState>,
    auth: BearerAuth,
) -> ApiResult<web::Json<Vec<Attestation>>> {
    Ok(web::Json(state.attestations.list(auth.token()).await?))
}

/// Download the attestation book as a spreadsheet.
#[utoipa::path(
    get,
    path = "/api/v1/attestations/export",
    responses(
        (status = 200, description = "Spreadsheet export"),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["attestations"],
    operation_id = "exportAttestations"
)]
#[get("/attestations/export")]
pub async fn export_attestations(
    state: web::Data<HttpState>,
    auth: BearerAuth,
) -> ApiResult<HttpResponse> {
    let document = state.attestations.export(auth.token()).await?;
    Ok(export_response(document))
}

/// Fetch one attestation.
#[utoipa::path(
    get,
    path = "/api/v1/attestations/{id}",
    params(("id" = i64, Path, description = "Attestation identifier")),
    responses(
        (status = 200, description = "Attestation detail", body = Attestation),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown attestation", body = Error)
    ),
    tags = ["attestations"],
    operation_id = "getAttestation"
)]
#[get("/attestations/{id}")]
pub async fn get_attestation(
    state: web::Data<HttpState>,
    auth: BearerAuth,
    path: web::Path<i64>,
) -> ApiResult<web::Json<Attestation>> {
    let id = AttestationId(path.into_inner());
    Ok(web::Json(state.attestations.detail(auth.token(), id).await?))
}

/// File a new attestation.
#[utoipa::path(
    post,
    path = "/api/v1/attestations",
    request_body = AttestationDraft,
    responses(
        (status = 201, description = "Filed attestation", body = Attestation),
        (status = 400, description = "Invalid draft", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["attestations"],
    operation_id = "createAttestation"
)]
#[post("/attestations")]
pub async fn create_attestation(
    state: web::Data<HttpState>,
    auth: BearerAuth,
    draft: web::Json<AttestationDraft>,
) -> ApiResult<HttpResponse> {
    let attestation = state
        .attestations
        .create(auth.token(), draft.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(attestation))
}

/// Mark an attestation delivered.
#[utoipa::path(
    post,
    path = "/api/v1/attestations/{id}/deliver",
    params(("id" = i64, Path, description = "Attestation identifier")),
    responses(
        (status = 200, description = "Delivered attestation", body = Attestation),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown attestation", body = Error),
        (status = 409, description = "Already delivered", body = Error)
    ),
    tags = ["attestations"],
    operation_id = "deliverAttestation"
)]
#[post("/attestations/{id}/deliver")]
pub async fn deliver_attestation(
    state: web::Data<HttpState>,
    auth: BearerAuth,
    path: web::Path<i64>,
) -> ApiResult<web::Json<Attestation>> {
    let id = AttestationId(path.into_inner());
    Ok(web::Json(state.attestations.deliver(auth.token(), id).await?))
}

/// Download the delivery receipt.
#[utoipa::path(
    get,
    path = "/api/v1/attestations/{id}/receipt",
    params(("id" = i64, Path, description = "Attestation identifier")),
    responses(
        (status = 200, description = "Delivery receipt"),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown attestation", body = Error)
    ),
    tags = ["attestations"],
    operation_id = "attestationReceipt"
)]
#[get("/attestations/{id}/receipt")]
pub async fn attestation_receipt(
    state: web::Data<HttpState>,
    auth: BearerAuth,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let id = AttestationId(path.into_inner());
    let document = state.attestations.receipt(auth.token(), id).await?;
    Ok(export_response(document))
}
