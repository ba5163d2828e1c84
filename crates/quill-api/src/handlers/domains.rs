//! Domain handlers
//!
//! Author: hephaex@gmail.com

use super::{found, IdResponse, ListQuery};
use crate::error::AppError;
use crate::extract::{IdPath, ValidatedJson, ValidatedQuery};
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use quill_core::{Domain, DomainPage, DomainPatch, NewDomain, NoFilter, Resource};
use std::sync::Arc;
use uuid::Uuid;

/// Create a domain
#[utoipa::path(
    post,
    path = "/domains",
    tag = "domains",
    request_body = NewDomain,
    responses(
        (status = 201, description = "Domain created", body = IdResponse),
        (status = 400, description = "Invalid input or duplicate url", body = crate::error::ApiError),
        (status = 401, description = "Unauthorized", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_domain(
    State(state): State<Arc<AppState>>,
    ValidatedJson(input): ValidatedJson<NewDomain>,
) -> Result<impl IntoResponse, AppError> {
    let id = state.domains.create(input).await?;
    Ok((StatusCode::CREATED, Json(IdResponse { id })))
}

/// List domains, oldest first
#[utoipa::path(
    get,
    path = "/domains",
    tag = "domains",
    params(ListQuery),
    responses(
        (status = 200, description = "Page of domains", body = DomainPage),
        (status = 400, description = "Invalid pagination", body = crate::error::ApiError),
    )
)]
pub async fn list_domains(
    State(state): State<Arc<AppState>>,
    ValidatedQuery(query): ValidatedQuery<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = state
        .domains
        .find_all(NoFilter, query.pagination())
        .await?;
    Ok(Json(page))
}

/// Get a domain by id
#[utoipa::path(
    get,
    path = "/domains/{id}",
    tag = "domains",
    params(("id" = Uuid, Path, description = "Domain id")),
    responses(
        (status = 200, description = "Domain", body = Domain),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    )
)]
pub async fn get_domain(
    State(state): State<Arc<AppState>>,
    IdPath(id): IdPath,
) -> Result<impl IntoResponse, AppError> {
    let domain = found(state.domains.find_one(id).await?, Domain::NAME)?;
    Ok(Json(domain))
}

/// Update a domain; absent fields are left unchanged
#[utoipa::path(
    put,
    path = "/domains/{id}",
    tag = "domains",
    params(("id" = Uuid, Path, description = "Domain id")),
    request_body = DomainPatch,
    responses(
        (status = 200, description = "Domain updated", body = IdResponse),
        (status = 400, description = "Invalid input", body = crate::error::ApiError),
        (status = 401, description = "Unauthorized", body = crate::error::ApiError),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_domain(
    State(state): State<Arc<AppState>>,
    IdPath(id): IdPath,
    ValidatedJson(patch): ValidatedJson<DomainPatch>,
) -> Result<impl IntoResponse, AppError> {
    let id = found(state.domains.update(id, patch).await?, Domain::NAME)?;
    Ok(Json(IdResponse { id }))
}

/// Delete a domain
#[utoipa::path(
    delete,
    path = "/domains/{id}",
    tag = "domains",
    params(("id" = Uuid, Path, description = "Domain id")),
    responses(
        (status = 200, description = "Domain deleted", body = IdResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ApiError),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_domain(
    State(state): State<Arc<AppState>>,
    IdPath(id): IdPath,
) -> Result<impl IntoResponse, AppError> {
    let id = found(state.domains.remove(id).await?, Domain::NAME)?;
    Ok(Json(IdResponse { id }))
}
