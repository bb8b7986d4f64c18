//! Request HTTP handlers.
//!
//! ```text
//! GET  /api/v1/requests
//! GET  /api/v1/requests/export
//! GET  /api/v1/requests/{id}
//! POST /api/v1/requests
//! PUT  /api/v1/requests/{id}
//! POST /api/v1/requests/{id}/transition
//! ```

use actix_web::{HttpResponse, get, post, put, web};

use crate::domain::{
    AnnotatedRequest, Error, ExportDocument, RequestForm, RequestId, RequestRecord,
    TransitionCommand,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::BearerAuth;
use crate::inbound::http::state::HttpState;

pub(crate) fn export_response(document: ExportDocument) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(document.content_type)
        .body(document.bytes)
}

/// List tracked requests with the caller's edit rights per row.
#[utoipa::path(
    get,
    path = "/api/v1/requests",
    responses(
        (status = 200, description = "Tracked requests", body = [AnnotatedRequest]),
        (status = 403, description = "Forbidden", body = Error),
        (status = 503, description = "Upstream unavailable", body = Error)
    ),
    tags = ["requests"],
    operation_id = "listRequests"
)]
#[get("/requests")]
pub async fn list_requests(
    state: web::Data<HttpState>,
    auth: BearerAuth,
) -> ApiResult<web::Json<Vec<AnnotatedRequest>>> {
    Ok(web::Json(state.requests.list(auth.token()).await?))
}

/// Download the request book as a spreadsheet.
#[utoipa::path(
    get,
    path = "/api/v1/requests/export",
    responses(
        (status = 200, description = "Spreadsheet export"),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["requests"],
    operation_id = "exportRequests"
)]
#[get("/requests/export")]
pub async fn export_requests(
    state: web::Data<HttpState>,
    auth: BearerAuth,
) -> ApiResult<HttpResponse> {
    let document = state.requests.export(auth.token()).await?;
    Ok(export_response(document))
}

/// Fetch one request with edit-rights annotation.
#[utoipa::path(
    get,
    path = "/api/v1/requests/{id}",
    params(("id" = i64, Path, description = "Request identifier")),
    responses(
        (status = 200, description = "Request detail", body = AnnotatedRequest),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown request", body = Error)
    ),
    tags = ["requests"],
    operation_id = "getRequest"
)]
#[get("/requests/{id}")]
pub async fn get_request(
    state: web::Data<HttpState>,
    auth: BearerAuth,
    path: web::Path<i64>,
) -> ApiResult<web::Json<AnnotatedRequest>> {
    let id = RequestId(path.into_inner());
    Ok(web::Json(state.requests.detail(auth.token(), id).await?))
}

/// Register a new filing.
#[utoipa::path(
    post,
    path = "/api/v1/requests",
    request_body = RequestForm,
    responses(
        (status = 201, description = "Created request", body = RequestRecord),
        (status = 400, description = "Invalid form", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["requests"],
    operation_id = "createRequest"
)]
#[post("/requests")]
pub async fn create_request(
    state: web::Data<HttpState>,
    auth: BearerAuth,
    form: web::Json<RequestForm>,
) -> ApiResult<HttpResponse> {
    let record = state
        .requests
        .create(auth.token(), form.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(record))
}

/// Edit the core fields of an existing filing.
#[utoipa::path(
    put,
    path = "/api/v1/requests/{id}",
    params(("id" = i64, Path, description = "Request identifier")),
    request_body = RequestForm,
    responses(
        (status = 200, description = "Updated request", body = RequestRecord),
        (status = 400, description = "Invalid form", body = Error),
        (status = 403, description = "Forbidden or window expired", body = Error),
        (status = 404, description = "Unknown request", body = Error)
    ),
    tags = ["requests"],
    operation_id = "editRequest"
)]
#[put("/requests/{id}")]
pub async fn edit_request(
    state: web::Data<HttpState>,
    auth: BearerAuth,
    path: web::Path<i64>,
    form: web::Json<RequestForm>,
) -> ApiResult<web::Json<RequestRecord>> {
    let id = RequestId(path.into_inner());
    let record = state
        .requests
        .edit(auth.token(), id, form.into_inner())
        .await?;
    Ok(web::Json(record))
}

/// Move a filing through its processing statuses.
#[utoipa::path(
    post,
    path = "/api/v1/requests/{id}/transition",
    params(("id" = i64, Path, description = "Request identifier")),
    request_body = TransitionCommand,
    responses(
        (status = 200, description = "Transitioned request", body = RequestRecord),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown request", body = Error),
        (status = 409, description = "Illegal status move", body = Error)
    ),
    tags = ["requests"],
    operation_id = "transitionRequest"
)]
#[post("/requests/{id}/transition")]
pub async fn transition_request(
    state: web::Data<HttpState>,
    auth: BearerAuth,
    path: web::Path<i64>,
    command: web::Json<TransitionCommand>,
) -> ApiResult<web::Json<RequestRecord>> {
    let id = RequestId(path.into_inner());
    let record = state
        .requests
        .transition(auth.token(), id, command.into_inner())
        .await?;
    Ok(web::Json(record))
}
