//! Application state management
//!
//! Author: hephaex@gmail.com

use crate::auth::{PasswordConfig, RefreshCookie, SessionService, TokenIssuer};
use crate::storage::ObjectStorage;
use crate::upload::UploadService;
use quill_core::config::{AppConfig, Environment};
use quill_core::{
    AccountRepository, Author, Blog, BlogCategory, Domain, MemoryAccountStore, MemoryRepository,
    PgStore, ResourceRepository, ResourceService,
};
use std::sync::Arc;
use std::time::Instant;

/// Repository handles for every persisted entity
#[derive(Clone)]
pub struct Stores {
    pub accounts: Arc<dyn AccountRepository>,
    pub domains: Arc<dyn ResourceRepository<Domain>>,
    pub authors: Arc<dyn ResourceRepository<Author>>,
    pub categories: Arc<dyn ResourceRepository<BlogCategory>>,
    pub blogs: Arc<dyn ResourceRepository<Blog>>,
}

impl Stores {
    /// Process-local stores; contents are lost on restart
    pub fn memory() -> Self {
        Self {
            accounts: Arc::new(MemoryAccountStore::new()),
            domains: Arc::new(MemoryRepository::<Domain>::new()),
            authors: Arc::new(MemoryRepository::<Author>::new()),
            categories: Arc::new(MemoryRepository::<BlogCategory>::new()),
            blogs: Arc::new(MemoryRepository::<Blog>::new()),
        }
    }

    /// All entities backed by one PostgreSQL pool
    pub fn postgres(store: PgStore) -> Self {
        let store = Arc::new(store);
        Self {
            accounts: store.clone(),
            domains: store.clone(),
            authors: store.clone(),
            categories: store.clone(),
            blogs: store,
        }
    }
}

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Server start time
    pub start_time: Instant,
    pub tokens: TokenIssuer,
    pub sessions: SessionService,
    pub domains: ResourceService<Domain>,
    pub authors: ResourceService<Author>,
    pub categories: ResourceService<BlogCategory>,
    pub blogs: ResourceService<Blog>,
    pub uploads: UploadService,
    /// Builds the `Set-Cookie` value for refresh tokens
    pub refresh_cookie: RefreshCookie,
}

impl AppState {
    /// Wire services from config, repositories and object storage
    pub fn new(
        config: AppConfig,
        stores: Stores,
        storage: Arc<dyn ObjectStorage>,
        password: PasswordConfig,
    ) -> Self {
        let tokens = TokenIssuer::new(&config.auth);
        let sessions = SessionService::new(stores.accounts, tokens.clone(), password);
        let refresh_cookie = RefreshCookie::new(
            config.server.environment == Environment::Production,
            tokens.refresh_ttl_secs(),
        );
        let uploads = UploadService::new(
            storage,
            reqwest::Client::new(),
            config.storage.max_upload_bytes,
        );

        Self {
            start_time: Instant::now(),
            tokens,
            sessions,
            domains: ResourceService::new(stores.domains),
            authors: ResourceService::new(stores.authors),
            categories: ResourceService::new(stores.categories),
            blogs: ResourceService::new(stores.blogs),
            uploads,
            refresh_cookie,
            config,
        }
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
