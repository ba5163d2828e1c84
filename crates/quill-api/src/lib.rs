//! Quill API - REST server for the blog backend
//!
//! Provides HTTP endpoints for authentication, the blog resources
//! (domains, authors, categories, posts) and file uploads.
//!
//! Author: hephaex@gmail.com

pub mod auth;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod storage;
pub mod upload;

pub use routes::create_router;

#[cfg(any(test, feature = "test-utils"))]
use std::sync::Arc;

/// Router over in-memory stores, returning the storage for inspection
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_app() -> (axum::Router, Arc<storage::MemoryStorage>) {
    let config = quill_core::AppConfig::default();
    let storage = Arc::new(storage::MemoryStorage::new(
        config.storage.public_domain.clone(),
    ));
    let state = state::AppState::new(
        config,
        state::Stores::memory(),
        storage.clone(),
        auth::PasswordConfig::light(),
    );
    (create_router(Arc::new(state)), storage)
}

/// Router over in-memory stores with fast password hashing
#[cfg(any(test, feature = "test-utils"))]
pub fn create_router_for_testing() -> axum::Router {
    create_test_app().0
}
