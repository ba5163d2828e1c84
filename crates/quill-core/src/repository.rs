//! Storage contracts
//!
//! Each blog resource implements [`Resource`], which lets one generic
//! repository and one generic service handle all four of them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::Account;
use crate::Result;

/// A stored, paginated blog resource
pub trait Resource: Clone + Send + Sync + 'static {
    /// Validated create input
    type Create: Send + Sync + 'static;
    /// Partial update; absent fields stay unchanged
    type Patch: Send + Sync + 'static;
    /// Listing filter
    type Filter: Default + Send + Sync + 'static;

    /// Human readable name used in logs and error messages
    const NAME: &'static str;

    fn id(&self) -> Uuid;

    fn created_at(&self) -> DateTime<Utc>;

    /// Materialize a new record with defaults applied
    fn build(id: Uuid, input: Self::Create, now: DateTime<Utc>) -> Self;

    /// Apply a patch and bump `updated_at`
    fn apply(&mut self, patch: Self::Patch, now: DateTime<Utc>);

    fn matches(&self, filter: &Self::Filter) -> bool;

    /// Field that must be unique across all records, with its value
    fn unique_key(&self) -> Option<(&'static str, String)> {
        None
    }
}

/// Persistence operations for a blog resource
///
/// Listing order is `created_at` ascending, ties broken by `id`.
#[async_trait]
pub trait ResourceRepository<R: Resource>: Send + Sync {
    /// Insert a new record and return its id
    async fn insert(&self, input: R::Create) -> Result<Uuid>;

    /// Fetch one window of the filtered set
    async fn find_page(&self, filter: &R::Filter, skip: u64, limit: u64) -> Result<Vec<R>>;

    /// Size of the filtered set
    async fn count(&self, filter: &R::Filter) -> Result<u64>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<R>>;

    /// Returns `None` when no record has this id
    async fn update(&self, id: Uuid, patch: R::Patch) -> Result<Option<Uuid>>;

    /// Returns `None` when no record has this id
    async fn delete(&self, id: Uuid) -> Result<Option<Uuid>>;
}

/// Credential store
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Fails with [`crate::StoreError::Duplicate`] when the email is taken
    async fn create_account(&self, email: &str, password_hash: &str) -> Result<Account>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>>;

    /// Replace the single refresh-token slot (`None` clears it).
    /// Returns false when the account does not exist.
    async fn set_refresh_token_hash(&self, id: Uuid, digest: Option<&str>) -> Result<bool>;

    /// Replace the slot with `next` only while it still holds `expected`.
    /// Returns false when the slot changed or the account does not exist.
    async fn rotate_refresh_token_hash(
        &self,
        id: Uuid,
        expected: &str,
        next: &str,
    ) -> Result<bool>;
}
