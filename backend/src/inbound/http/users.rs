//! Staff directory HTTP handlers.
//!
//! ```text
//! GET    /api/v1/users
//! POST   /api/v1/users
//! PUT    /api/v1/users/{id}
//! DELETE /api/v1/users/{id}?reassignTo={accountId}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{AccountId, AccountUpdate, Error, NewAccount, UserAccount};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::BearerAuth;
use crate::inbound::http::state::HttpState;

/// Optional replacement account for the compound delete.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct DeleteQuery {
    /// Account that inherits the deleted account's requests.
    #[serde(default)]
    pub reassign_to: Option<i64>,
}

/// Response payload for a successful compound delete.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub reassigned: usize,
}

/// List all staff accounts.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Staff accounts", body = [UserAccount]),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    auth: BearerAuth,
) -> ApiResult<web::Json<Vec<UserAccount>>> {
    Ok(web::Json(state.directory.list(auth.token()).await?))
}

/// Provision a new staff account.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = NewAccount,
    responses(
        (status = 201, description = "Created account", body = UserAccount),
        (status = 400, description = "Invalid payload", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    auth: BearerAuth,
    account: web::Json<NewAccount>,
) -> ApiResult<HttpResponse> {
    let created = state
        .directory
        .create(auth.token(), account.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(created))
}

/// Update an existing staff account.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = i64, Path, description = "Account identifier")),
    request_body = AccountUpdate,
    responses(
        (status = 200, description = "Updated account", body = UserAccount),
        (status = 400, description = "Invalid payload", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown account", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    auth: BearerAuth,
    path: web::Path<i64>,
    update: web::Json<AccountUpdate>,
) -> ApiResult<web::Json<UserAccount>> {
    let id = AccountId(path.into_inner());
    let updated = state
        .directory
        .update(auth.token(), id, update.into_inner())
        .await?;
    Ok(web::Json(updated))
}

/// Delete a staff account, optionally reassigning its requests first.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(
        ("id" = i64, Path, description = "Account identifier"),
        DeleteQuery
    ),
    responses(
        (status = 200, description = "Account deleted", body = DeleteResponse),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown account", body = Error),
        (status = 409, description = "Requests still reference the account", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    auth: BearerAuth,
    path: web::Path<i64>,
    query: web::Query<DeleteQuery>,
) -> ApiResult<web::Json<DeleteResponse>> {
    let id = AccountId(path.into_inner());
    let reassign_to = query.into_inner().reassign_to.map(AccountId);
    let report = state
        .directory
        .delete(auth.token(), id, reassign_to)
        .await
        .map_err(Error::from)?;
    Ok(web::Json(DeleteResponse {
        reassigned: report.reassigned,
    }))
}
