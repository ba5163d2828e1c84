//! OpenAPI document served by Swagger UI
//!
//! Author: hephaex@gmail.com

use crate::error::ApiError;
use crate::handlers::{self, auth, health, upload, IdResponse};
use quill_core::{
    AccountPublic, Author, AuthorPage, AuthorPatch, Blog, BlogCategory, BlogCategoryPage,
    BlogCategoryPatch, BlogLookup, BlogLookupPage, BlogPage, BlogPatch, Domain, DomainPage,
    DomainPatch, NewAuthor, NewBlog, NewBlogCategory, NewDomain,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Quill API",
        description = "Multi-tenant blog backend: domains, authors, categories, posts and uploads"
    ),
    paths(
        health::health_check,
        auth::signup_handler,
        auth::signin_handler,
        auth::refresh_handler,
        auth::logout_handler,
        handlers::domains::create_domain,
        handlers::domains::list_domains,
        handlers::domains::get_domain,
        handlers::domains::update_domain,
        handlers::domains::delete_domain,
        handlers::authors::create_author,
        handlers::authors::list_authors,
        handlers::authors::get_author,
        handlers::authors::update_author,
        handlers::authors::delete_author,
        handlers::blog_categories::create_category,
        handlers::blog_categories::list_categories,
        handlers::blog_categories::get_category,
        handlers::blog_categories::update_category,
        handlers::blog_categories::delete_category,
        handlers::blogs::create_blog,
        handlers::blogs::list_blogs,
        handlers::blogs::blog_lookups,
        handlers::blogs::get_blog,
        handlers::blogs::update_blog,
        handlers::blogs::delete_blog,
        upload::upload_file,
        upload::upload_from_url,
    ),
    components(schemas(
        ApiError,
        IdResponse,
        health::HealthResponse,
        auth::SignUpRequest,
        auth::SignInRequest,
        auth::RefreshRequest,
        auth::LogoutRequest,
        auth::TokenResponse,
        auth::LogoutResponse,
        AccountPublic,
        Domain,
        NewDomain,
        DomainPatch,
        DomainPage,
        Author,
        NewAuthor,
        AuthorPatch,
        AuthorPage,
        BlogCategory,
        NewBlogCategory,
        BlogCategoryPatch,
        BlogCategoryPage,
        Blog,
        NewBlog,
        BlogPatch,
        BlogPage,
        BlogLookup,
        BlogLookupPage,
        upload::UploadForm,
        upload::FetchUrlRequest,
        upload::UploadedFile,
        upload::UploadResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Liveness"),
        (name = "auth", description = "Sign-up, sign-in and token rotation"),
        (name = "domains", description = "Tenant sites"),
        (name = "authors", description = "Post authors"),
        (name = "blog-categories", description = "Per-domain categories"),
        (name = "blogs", description = "Blog posts"),
        (name = "upload", description = "Object storage proxy"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected operations
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
