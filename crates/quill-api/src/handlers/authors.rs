//! Author handlers
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
use quill_core::{Author, AuthorPage, AuthorPatch, NewAuthor, NoFilter, Resource};
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/authors",
    tag = "authors",
    request_body = NewAuthor,
    responses(
        (status = 201, description = "Author created", body = IdResponse),
        (status = 400, description = "Invalid input", body = crate::error::ApiError),
        (status = 401, description = "Unauthorized", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_author(
    State(state): State<Arc<AppState>>,
    ValidatedJson(input): ValidatedJson<NewAuthor>,
) -> Result<impl IntoResponse, AppError> {
    let id = state.authors.create(input).await?;
    Ok((StatusCode::CREATED, Json(IdResponse { id })))
}

#[utoipa::path(
    get,
    path = "/authors",
    tag = "authors",
    params(ListQuery),
    responses(
        (status = 200, description = "Page of authors", body = AuthorPage),
        (status = 400, description = "Invalid pagination", body = crate::error::ApiError),
    )
)]
pub async fn list_authors(
    State(state): State<Arc<AppState>>,
    ValidatedQuery(query): ValidatedQuery<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = state
        .authors
        .find_all(NoFilter, query.pagination())
        .await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = Uuid, Path, description = "Author id")),
    responses(
        (status = 200, description = "Author", body = Author),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    )
)]
pub async fn get_author(
    State(state): State<Arc<AppState>>,
    IdPath(id): IdPath,
) -> Result<impl IntoResponse, AppError> {
    let author = found(state.authors.find_one(id).await?, Author::NAME)?;
    Ok(Json(author))
}

#[utoipa::path(
    put,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = Uuid, Path, description = "Author id")),
    request_body = AuthorPatch,
    responses(
        (status = 200, description = "Author updated", body = IdResponse),
        (status = 400, description = "Invalid input", body = crate::error::ApiError),
        (status = 401, description = "Unauthorized", body = crate::error::ApiError),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_author(
    State(state): State<Arc<AppState>>,
    IdPath(id): IdPath,
    ValidatedJson(patch): ValidatedJson<AuthorPatch>,
) -> Result<impl IntoResponse, AppError> {
    let id = found(state.authors.update(id, patch).await?, Author::NAME)?;
    Ok(Json(IdResponse { id }))
}

#[utoipa::path(
    delete,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = Uuid, Path, description = "Author id")),
    responses(
        (status = 200, description = "Author deleted", body = IdResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ApiError),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_author(
    State(state): State<Arc<AppState>>,
    IdPath(id): IdPath,
) -> Result<impl IntoResponse, AppError> {
    let id = found(state.authors.remove(id).await?, Author::NAME)?;
    Ok(Json(IdResponse { id }))
}
