//! Blog post handlers
//!
//! Listing supports category, activity and featured filters plus a
//! case-insensitive keyword over title and content. `/blogs/lookups`
//! returns the same listing without content or tags.
//!
//! Author: hephaex@gmail.com

use super::{found, BlogListQuery, IdResponse};
use crate::error::AppError;
use crate::extract::{IdPath, ValidatedJson, ValidatedQuery};
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use quill_core::{Blog, BlogLookupPage, BlogPage, BlogPatch, NewBlog, Resource};
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/blogs",
    tag = "blogs",
    request_body = NewBlog,
    responses(
        (status = 201, description = "Blog created", body = IdResponse),
        (status = 400, description = "Invalid input", body = crate::error::ApiError),
        (status = 401, description = "Unauthorized", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_blog(
    State(state): State<Arc<AppState>>,
    ValidatedJson(input): ValidatedJson<NewBlog>,
) -> Result<impl IntoResponse, AppError> {
    let id = state.blogs.create(input).await?;
    Ok((StatusCode::CREATED, Json(IdResponse { id })))
}

#[utoipa::path(
    get,
    path = "/blogs",
    tag = "blogs",
    params(BlogListQuery),
    responses(
        (status = 200, description = "Page of blogs", body = BlogPage),
        (status = 400, description = "Invalid query", body = crate::error::ApiError),
    )
)]
pub async fn list_blogs(
    State(state): State<Arc<AppState>>,
    ValidatedQuery(query): ValidatedQuery<BlogListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (filter, pagination) = query.split();
    let page = state.blogs.find_all(filter, pagination).await?;
    Ok(Json(page))
}

/// Listing without content or tags; the keyword matches titles only
#[utoipa::path(
    get,
    path = "/blogs/lookups",
    tag = "blogs",
    params(BlogListQuery),
    responses(
        (status = 200, description = "Page of blog lookups", body = BlogLookupPage),
        (status = 400, description = "Invalid query", body = crate::error::ApiError),
    )
)]
pub async fn blog_lookups(
    State(state): State<Arc<AppState>>,
    ValidatedQuery(query): ValidatedQuery<BlogListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (filter, pagination) = query.split();
    let page = state.blogs.lookups(filter, pagination).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/blogs/{id}",
    tag = "blogs",
    params(("id" = Uuid, Path, description = "Blog id")),
    responses(
        (status = 200, description = "Blog", body = Blog),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    )
)]
pub async fn get_blog(
    State(state): State<Arc<AppState>>,
    IdPath(id): IdPath,
) -> Result<impl IntoResponse, AppError> {
    let blog = found(state.blogs.find_one(id).await?, Blog::NAME)?;
    Ok(Json(blog))
}

#[utoipa::path(
    put,
    path = "/blogs/{id}",
    tag = "blogs",
    params(("id" = Uuid, Path, description = "Blog id")),
    request_body = BlogPatch,
    responses(
        (status = 200, description = "Blog updated", body = IdResponse),
        (status = 400, description = "Invalid input", body = crate::error::ApiError),
        (status = 401, description = "Unauthorized", body = crate::error::ApiError),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_blog(
    State(state): State<Arc<AppState>>,
    IdPath(id): IdPath,
    ValidatedJson(patch): ValidatedJson<BlogPatch>,
) -> Result<impl IntoResponse, AppError> {
    let id = found(state.blogs.update(id, patch).await?, Blog::NAME)?;
    Ok(Json(IdResponse { id }))
}

#[utoipa::path(
    delete,
    path = "/blogs/{id}",
    tag = "blogs",
    params(("id" = Uuid, Path, description = "Blog id")),
    responses(
        (status = 200, description = "Blog deleted", body = IdResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ApiError),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_blog(
    State(state): State<Arc<AppState>>,
    IdPath(id): IdPath,
) -> Result<impl IntoResponse, AppError> {
    let id = found(state.blogs.remove(id).await?, Blog::NAME)?;
    Ok(Json(IdResponse { id }))
}
