//! Blog category handlers
//!
//! Author: hephaex@gmail.com

use super::{found, CategoryListQuery, IdResponse};
use crate::error::AppError;
use crate::extract::{IdPath, ValidatedJson, ValidatedQuery};
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use quill_core::{BlogCategory, BlogCategoryPage, BlogCategoryPatch, NewBlogCategory, Resource};
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/blog-categories",
    tag = "blog-categories",
    request_body = NewBlogCategory,
    responses(
        (status = 201, description = "Category created", body = IdResponse),
        (status = 400, description = "Invalid input or duplicate name", body = crate::error::ApiError),
        (status = 401, description = "Unauthorized", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    ValidatedJson(input): ValidatedJson<NewBlogCategory>,
) -> Result<impl IntoResponse, AppError> {
    let id = state.categories.create(input).await?;
    Ok((StatusCode::CREATED, Json(IdResponse { id })))
}

/// List categories, optionally restricted to one domain
#[utoipa::path(
    get,
    path = "/blog-categories",
    tag = "blog-categories",
    params(CategoryListQuery),
    responses(
        (status = 200, description = "Page of categories", body = BlogCategoryPage),
        (status = 400, description = "Invalid query", body = crate::error::ApiError),
    )
)]
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    ValidatedQuery(query): ValidatedQuery<CategoryListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (filter, pagination) = query.split();
    let page = state.categories.find_all(filter, pagination).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/blog-categories/{id}",
    tag = "blog-categories",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category", body = BlogCategory),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    )
)]
pub async fn get_category(
    State(state): State<Arc<AppState>>,
    IdPath(id): IdPath,
) -> Result<impl IntoResponse, AppError> {
    let category = found(state.categories.find_one(id).await?, BlogCategory::NAME)?;
    Ok(Json(category))
}

#[utoipa::path(
    put,
    path = "/blog-categories/{id}",
    tag = "blog-categories",
    params(("id" = Uuid, Path, description = "Category id")),
    request_body = BlogCategoryPatch,
    responses(
        (status = 200, description = "Category updated", body = IdResponse),
        (status = 400, description = "Invalid input", body = crate::error::ApiError),
        (status = 401, description = "Unauthorized", body = crate::error::ApiError),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_category(
    State(state): State<Arc<AppState>>,
    IdPath(id): IdPath,
    ValidatedJson(patch): ValidatedJson<BlogCategoryPatch>,
) -> Result<impl IntoResponse, AppError> {
    let id = found(
        state.categories.update(id, patch).await?,
        BlogCategory::NAME,
    )?;
    Ok(Json(IdResponse { id }))
}

#[utoipa::path(
    delete,
    path = "/blog-categories/{id}",
    tag = "blog-categories",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category deleted", body = IdResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ApiError),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    IdPath(id): IdPath,
) -> Result<impl IntoResponse, AppError> {
    let id = found(state.categories.remove(id).await?, BlogCategory::NAME)?;
    Ok(Json(IdResponse { id }))
}
