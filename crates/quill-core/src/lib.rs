//! Quill Core - Domain models, storage traits, and shared types
//!
//! This crate defines the core abstractions used by the Quill API:
//! - Blog resources (domains, authors, categories, posts) and accounts
//! - Repository traits with PostgreSQL and in-memory implementations
//! - The generic resource service (create / list / get / update / remove)
//! - Configuration management
//!
//! Author: hephaex@gmail.com

pub mod config;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use config::{AppConfig, ConfigError, Environment, StoreBackend};
pub use memory::{MemoryAccountStore, MemoryRepository};
pub use models::*;
pub use postgres::PgStore;
pub use repository::{AccountRepository, Resource, ResourceRepository};
pub use service::ResourceService;

use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Storage error types
#[derive(Error, Debug)]
pub enum StoreError {
    /// A unique field already holds this value
    #[error("{0} already exists")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Migration error: {0}")]
    Migration(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
