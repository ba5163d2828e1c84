//! In-memory store
//!
//! Used by the test suite and for running the API without a database
//! (`STORE=memory`). Uniqueness checks run under the write lock.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::Account;
use crate::repository::{AccountRepository, Resource, ResourceRepository};
use crate::{Result, StoreError};

/// In-memory repository for any [`Resource`]
pub struct MemoryRepository<R> {
    records: RwLock<Vec<R>>,
}

impl<R> Default for MemoryRepository<R> {
    fn default() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }
}

impl<R: Resource> MemoryRepository<R> {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_unique(records: &[R], candidate: &R) -> Result<()> {
        let Some((field, value)) = candidate.unique_key() else {
            return Ok(());
        };
        let taken = records.iter().any(|r| {
            r.id() != candidate.id() && r.unique_key().is_some_and(|(_, v)| v == value)
        });
        if taken {
            return Err(StoreError::Duplicate(format!("{} {field}", R::NAME)));
        }
        Ok(())
    }

    fn sorted(records: &[R], filter: &R::Filter) -> Vec<R> {
        let mut matched: Vec<R> = records
            .iter()
            .filter(|r| r.matches(filter))
            .cloned()
            .collect();
        matched.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(&b.id()))
        });
        matched
    }
}

#[async_trait]
impl<R: Resource> ResourceRepository<R> for MemoryRepository<R> {
    async fn insert(&self, input: R::Create) -> Result<Uuid> {
        let record = R::build(Uuid::new_v4(), input, Utc::now());
        let mut records = self.records.write().await;
        Self::check_unique(&records, &record)?;
        let id = record.id();
        records.push(record);
        Ok(id)
    }

    async fn find_page(&self, filter: &R::Filter, skip: u64, limit: u64) -> Result<Vec<R>> {
        let records = self.records.read().await;
        Ok(Self::sorted(&records, filter)
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count(&self, filter: &R::Filter) -> Result<u64> {
        let records = self.records.read().await;
        Ok(records.iter().filter(|r| r.matches(filter)).count() as u64)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<R>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id() == id).cloned())
    }

    async fn update(&self, id: Uuid, patch: R::Patch) -> Result<Option<Uuid>> {
        let mut records = self.records.write().await;
        let Some(pos) = records.iter().position(|r| r.id() == id) else {
            return Ok(None);
        };

        let mut updated = records[pos].clone();
        updated.apply(patch, Utc::now());
        Self::check_unique(&records, &updated)?;
        records[pos] = updated;
        Ok(Some(id))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Uuid>> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.id() != id);
        Ok((records.len() < before).then_some(id))
    }
}

/// In-memory credential store
#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: RwLock<Vec<Account>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRepository for MemoryAccountStore {
    async fn create_account(&self, email: &str, password_hash: &str) -> Result<Account> {
        let mut accounts = self.accounts.write().await;
        if accounts.iter().any(|a| a.email == email) {
            return Err(StoreError::Duplicate("email".to_string()));
        }

        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            refresh_token_hash: None,
            created_at: now,
            updated_at: now,
        };
        accounts.push(account.clone());
        Ok(account)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.iter().find(|a| a.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.iter().find(|a| a.id == id).cloned())
    }

    async fn set_refresh_token_hash(&self, id: Uuid, digest: Option<&str>) -> Result<bool> {
        let mut accounts = self.accounts.write().await;
        match accounts.iter_mut().find(|a| a.id == id) {
            Some(account) => {
                account.refresh_token_hash = digest.map(str::to_string);
                account.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn rotate_refresh_token_hash(
        &self,
        id: Uuid,
        expected: &str,
        next: &str,
    ) -> Result<bool> {
        let mut accounts = self.accounts.write().await;
        match accounts
            .iter_mut()
            .find(|a| a.id == id && a.refresh_token_hash.as_deref() == Some(expected))
        {
            Some(account) => {
                account.refresh_token_hash = Some(next.to_string());
                account.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
