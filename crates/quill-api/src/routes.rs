//! API route definitions
//!
//! Every route sits behind the visibility gate; the gate lets public
//! routes through and requires a bearer token everywhere else.
//!
//! Author: hephaex@gmail.com

use crate::auth::authorize;
use crate::handlers::{auth, authors, blog_categories, blogs, domains, health, upload};
use crate::openapi::ApiDoc;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use quill_core::config::ServerConfig;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Room for multipart boundaries and headers on top of the file limit
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Create API routes
pub fn api_routes(max_upload_bytes: usize) -> Router<Arc<AppState>> {
    let upload_routes = Router::new()
        .route("/upload/file", post(upload::upload_file))
        .route("/upload/fetchUrl", post(upload::upload_from_url))
        .layer(DefaultBodyLimit::max(max_upload_bytes + MULTIPART_OVERHEAD));

    Router::new()
        .route("/health", get(health::health_check))
        // Auth
        .route("/auth/signup", post(auth::signup_handler))
        .route("/auth/signin", post(auth::signin_handler))
        .route("/auth/refresh", post(auth::refresh_handler))
        .route("/auth/logout", post(auth::logout_handler))
        // Domains
        .route(
            "/domains",
            get(domains::list_domains).post(domains::create_domain),
        )
        .route(
            "/domains/:id",
            get(domains::get_domain)
                .put(domains::update_domain)
                .delete(domains::delete_domain),
        )
        // Authors
        .route(
            "/authors",
            get(authors::list_authors).post(authors::create_author),
        )
        .route(
            "/authors/:id",
            get(authors::get_author)
                .put(authors::update_author)
                .delete(authors::delete_author),
        )
        // Blog categories
        .route(
            "/blog-categories",
            get(blog_categories::list_categories).post(blog_categories::create_category),
        )
        .route(
            "/blog-categories/:id",
            get(blog_categories::get_category)
                .put(blog_categories::update_category)
                .delete(blog_categories::delete_category),
        )
        // Blogs
        .route("/blogs", get(blogs::list_blogs).post(blogs::create_blog))
        .route("/blogs/lookups", get(blogs::blog_lookups))
        .route(
            "/blogs/:id",
            get(blogs::get_blog)
                .put(blogs::update_blog)
                .delete(blogs::delete_blog),
        )
        .merge(upload_routes)
}

/// CORS: the configured client origin with credentials, otherwise any origin
fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let Some(origin) = server.client_url.as_deref() else {
        return CorsLayer::permissive();
    };

    match origin.trim_end_matches('/').parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
            .allow_credentials(true),
        Err(_) => {
            tracing::warn!(origin, "CLIENT_URL is not a valid origin; allowing any origin");
            CorsLayer::permissive()
        }
    }
}

/// Build the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let api = api_routes(state.config.storage.max_upload_bytes)
        .route_layer(middleware::from_fn_with_state(
            state.tokens.clone(),
            authorize,
        ))
        .with_state(state.clone());

    Router::new()
        .merge(api)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors_layer(&state.config.server))
        .layer(TraceLayer::new_for_http())
}
