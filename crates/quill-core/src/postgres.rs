//! PostgreSQL store
//!
//! Accounts and blog resources on SQLx runtime queries. Partial updates use
//! `COALESCE` so absent patch fields keep their stored value.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::{PgPool, PgPoolOptions};
use uuid::Uuid;

use crate::models::{
    Account, Author, AuthorPatch, Blog, BlogCategory, BlogCategoryPatch, BlogFilter, BlogPatch,
    CategoryFilter, Domain, DomainPatch, NewAuthor, NewBlog, NewBlogCategory, NewDomain, NoFilter,
};
use crate::repository::{AccountRepository, ResourceRepository};
use crate::{Result, StoreError};

/// PostgreSQL store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a new connection pool
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Database(format!("PostgreSQL connection failed: {e}")))?;

        Ok(Self { pool })
    }

    /// Apply pending schema migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Migration(e.to_string()))
    }
}

/// Map a SQLx error, turning unique violations into [`StoreError::Duplicate`]
fn map_err(context: &'static str, what: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Duplicate(what.to_string())
        }
        _ => StoreError::Database(format!("Failed to {context}: {e}")),
    }
}

/// `ILIKE` pattern for a substring match with wildcards escaped
fn like_pattern(keyword: &str) -> String {
    let escaped = keyword
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

// ============================================================================
// Accounts
// ============================================================================

#[async_trait]
impl AccountRepository for PgStore {
    async fn create_account(&self, email: &str, password_hash: &str) -> Result<Account> {
        sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (id, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, refresh_token_hash, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err("create account", "email"))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT id, email, password_hash, refresh_token_hash, created_at, updated_at
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err("get account", "email"))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>> {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT id, email, password_hash, refresh_token_hash, created_at, updated_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err("get account", "email"))
    }

    async fn set_refresh_token_hash(&self, id: Uuid, digest: Option<&str>) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE accounts SET refresh_token_hash = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(digest)
        .execute(&self.pool)
        .await
        .map_err(map_err("update refresh token", "email"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn rotate_refresh_token_hash(
        &self,
        id: Uuid,
        expected: &str,
        next: &str,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE accounts SET refresh_token_hash = $3, updated_at = NOW()
            WHERE id = $1 AND refresh_token_hash = $2
            "#,
        )
        .bind(id)
        .bind(expected)
        .bind(next)
        .execute(&self.pool)
        .await
        .map_err(map_err("rotate refresh token", "email"))?;

        Ok(result.rows_affected() > 0)
    }
}

// ============================================================================
// Domains
// ============================================================================

const DOMAIN_COLUMNS: &str = "id, name, url, is_active, created_at, updated_at";

#[async_trait]
impl ResourceRepository<Domain> for PgStore {
    async fn insert(&self, input: NewDomain) -> Result<Uuid> {
        let row: (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO domains (id, name, url, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(&input.url)
        .bind(input.is_active.unwrap_or(true))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(map_err("create domain", "domain url"))?;

        Ok(row.0)
    }

    async fn find_page(&self, _filter: &NoFilter, skip: u64, limit: u64) -> Result<Vec<Domain>> {
        sqlx::query_as::<_, Domain>(&format!(
            "SELECT {DOMAIN_COLUMNS} FROM domains ORDER BY created_at ASC, id ASC LIMIT $1 OFFSET $2"
        ))
        .bind(limit as i64)
        .bind(skip as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(map_err("list domains", "domain url"))
    }

    async fn count(&self, _filter: &NoFilter) -> Result<u64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM domains")
            .fetch_one(&self.pool)
            .await
            .map_err(map_err("count domains", "domain url"))?;
        Ok(row.0 as u64)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Domain>> {
        sqlx::query_as::<_, Domain>(&format!(
            "SELECT {DOMAIN_COLUMNS} FROM domains WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err("get domain", "domain url"))
    }

    async fn update(&self, id: Uuid, patch: DomainPatch) -> Result<Option<Uuid>> {
        let row: Option<(Uuid,)> = sqlx::query_as(
            r#"
            UPDATE domains SET
                name = COALESCE($2, name),
                url = COALESCE($3, url),
                is_active = COALESCE($4, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.url)
        .bind(patch.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err("update domain", "domain url"))?;

        Ok(row.map(|r| r.0))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Uuid>> {
        let row: Option<(Uuid,)> = sqlx::query_as("DELETE FROM domains WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_err("delete domain", "domain url"))?;
        Ok(row.map(|r| r.0))
    }
}

// ============================================================================
// Authors
// ============================================================================

const AUTHOR_COLUMNS: &str =
    "id, avatar, name, designation, description, linkedin, is_active, created_at, updated_at";

#[async_trait]
impl ResourceRepository<Author> for PgStore {
    async fn insert(&self, input: NewAuthor) -> Result<Uuid> {
        let row: (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO authors (
                id, avatar, name, designation, description, linkedin,
                is_active, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.avatar)
        .bind(&input.name)
        .bind(&input.designation)
        .bind(&input.description)
        .bind(&input.linkedin)
        .bind(input.is_active.unwrap_or(true))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(map_err("create author", "author"))?;

        Ok(row.0)
    }

    async fn find_page(&self, _filter: &NoFilter, skip: u64, limit: u64) -> Result<Vec<Author>> {
        sqlx::query_as::<_, Author>(&format!(
            "SELECT {AUTHOR_COLUMNS} FROM authors ORDER BY created_at ASC, id ASC LIMIT $1 OFFSET $2"
        ))
        .bind(limit as i64)
        .bind(skip as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(map_err("list authors", "author"))
    }

    async fn count(&self, _filter: &NoFilter) -> Result<u64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM authors")
            .fetch_one(&self.pool)
            .await
            .map_err(map_err("count authors", "author"))?;
        Ok(row.0 as u64)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Author>> {
        sqlx::query_as::<_, Author>(&format!(
            "SELECT {AUTHOR_COLUMNS} FROM authors WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err("get author", "author"))
    }

    async fn update(&self, id: Uuid, patch: AuthorPatch) -> Result<Option<Uuid>> {
        let row: Option<(Uuid,)> = sqlx::query_as(
            r#"
            UPDATE authors SET
                avatar = COALESCE($2, avatar),
                name = COALESCE($3, name),
                designation = COALESCE($4, designation),
                description = COALESCE($5, description),
                linkedin = COALESCE($6, linkedin),
                is_active = COALESCE($7, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(patch.avatar)
        .bind(patch.name)
        .bind(patch.designation)
        .bind(patch.description)
        .bind(patch.linkedin)
        .bind(patch.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err("update author", "author"))?;

        Ok(row.map(|r| r.0))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Uuid>> {
        let row: Option<(Uuid,)> = sqlx::query_as("DELETE FROM authors WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_err("delete author", "author"))?;
        Ok(row.map(|r| r.0))
    }
}

// ============================================================================
// Blog categories
// ============================================================================

const CATEGORY_COLUMNS: &str = "id, name, domain_id, is_active, created_at, updated_at";

#[async_trait]
impl ResourceRepository<BlogCategory> for PgStore {
    async fn insert(&self, input: NewBlogCategory) -> Result<Uuid> {
        let row: (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO blog_categories (id, name, domain_id, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(input.domain_id)
        .bind(input.is_active.unwrap_or(true))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(map_err("create blog category", "blog category name"))?;

        Ok(row.0)
    }

    async fn find_page(
        &self,
        filter: &CategoryFilter,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<BlogCategory>> {
        sqlx::query_as::<_, BlogCategory>(&format!(
            r#"
            SELECT {CATEGORY_COLUMNS}
            FROM blog_categories
            WHERE ($1::uuid IS NULL OR domain_id = $1)
            ORDER BY created_at ASC, id ASC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(filter.domain_id)
        .bind(limit as i64)
        .bind(skip as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(map_err("list blog categories", "blog category name"))
    }

    async fn count(&self, filter: &CategoryFilter) -> Result<u64> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM blog_categories WHERE ($1::uuid IS NULL OR domain_id = $1)",
        )
        .bind(filter.domain_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err("count blog categories", "blog category name"))?;
        Ok(row.0 as u64)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<BlogCategory>> {
        sqlx::query_as::<_, BlogCategory>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM blog_categories WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err("get blog category", "blog category name"))
    }

    async fn update(&self, id: Uuid, patch: BlogCategoryPatch) -> Result<Option<Uuid>> {
        let row: Option<(Uuid,)> = sqlx::query_as(
            r#"
            UPDATE blog_categories SET
                name = COALESCE($2, name),
                domain_id = COALESCE($3, domain_id),
                is_active = COALESCE($4, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.domain_id)
        .bind(patch.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err("update blog category", "blog category name"))?;

        Ok(row.map(|r| r.0))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Uuid>> {
        let row: Option<(Uuid,)> =
            sqlx::query_as("DELETE FROM blog_categories WHERE id = $1 RETURNING id")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_err("delete blog category", "blog category name"))?;
        Ok(row.map(|r| r.0))
    }
}

// ============================================================================
// Blogs
// ============================================================================

const BLOG_COLUMNS: &str = "id, title, publish_date, content, introduction, image, is_active, \
     tags, blog_category_id, author_id, domain_id, is_featured, created_at, updated_at";

const BLOG_FILTER: &str = r#"
    ($1::uuid IS NULL OR blog_category_id = $1)
    AND ($2::text IS NULL OR title ILIKE $2 OR (NOT $5 AND content ILIKE $2))
    AND ($3::bool IS NULL OR is_active = $3)
    AND ($4::bool IS NULL OR is_featured = $4)
"#;

#[async_trait]
impl ResourceRepository<Blog> for PgStore {
    async fn insert(&self, input: NewBlog) -> Result<Uuid> {
        let row: (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO blogs (
                id, title, publish_date, content, introduction, image,
                is_active, tags, blog_category_id, author_id, domain_id,
                is_featured, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $13)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.title)
        .bind(input.publish_date)
        .bind(&input.content)
        .bind(&input.introduction)
        .bind(&input.image)
        .bind(input.is_active.unwrap_or(true))
        .bind(&input.tags)
        .bind(input.blog_category_id)
        .bind(input.author_id)
        .bind(input.domain_id)
        .bind(input.is_featured.unwrap_or(false))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(map_err("create blog", "blog"))?;

        Ok(row.0)
    }

    async fn find_page(&self, filter: &BlogFilter, skip: u64, limit: u64) -> Result<Vec<Blog>> {
        sqlx::query_as::<_, Blog>(&format!(
            r#"
            SELECT {BLOG_COLUMNS}
            FROM blogs
            WHERE {BLOG_FILTER}
            ORDER BY created_at ASC, id ASC
            LIMIT $6 OFFSET $7
            "#
        ))
        .bind(filter.blog_category_id)
        .bind(filter.keyword().map(like_pattern))
        .bind(filter.is_active)
        .bind(filter.is_featured)
        .bind(filter.title_only)
        .bind(limit as i64)
        .bind(skip as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(map_err("list blogs", "blog"))
    }

    async fn count(&self, filter: &BlogFilter) -> Result<u64> {
        let row: (i64,) =
            sqlx::query_as(&format!("SELECT COUNT(*) FROM blogs WHERE {BLOG_FILTER}"))
                .bind(filter.blog_category_id)
                .bind(filter.keyword().map(like_pattern))
                .bind(filter.is_active)
                .bind(filter.is_featured)
                .bind(filter.title_only)
                .fetch_one(&self.pool)
                .await
                .map_err(map_err("count blogs", "blog"))?;
        Ok(row.0 as u64)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Blog>> {
        sqlx::query_as::<_, Blog>(&format!("SELECT {BLOG_COLUMNS} FROM blogs WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_err("get blog", "blog"))
    }

    async fn update(&self, id: Uuid, patch: BlogPatch) -> Result<Option<Uuid>> {
        let row: Option<(Uuid,)> = sqlx::query_as(
            r#"
            UPDATE blogs SET
                title = COALESCE($2, title),
                publish_date = COALESCE($3, publish_date),
                content = COALESCE($4, content),
                introduction = COALESCE($5, introduction),
                image = COALESCE($6, image),
                is_active = COALESCE($7, is_active),
                tags = COALESCE($8, tags),
                blog_category_id = COALESCE($9, blog_category_id),
                author_id = COALESCE($10, author_id),
                domain_id = COALESCE($11, domain_id),
                is_featured = COALESCE($12, is_featured),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(patch.title)
        .bind(patch.publish_date)
        .bind(patch.content)
        .bind(patch.introduction)
        .bind(patch.image)
        .bind(patch.is_active)
        .bind(patch.tags)
        .bind(patch.blog_category_id)
        .bind(patch.author_id)
        .bind(patch.domain_id)
        .bind(patch.is_featured)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err("update blog", "blog"))?;

        Ok(row.map(|r| r.0))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Uuid>> {
        let row: Option<(Uuid,)> = sqlx::query_as("DELETE FROM blogs WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_err("delete blog", "blog"))?;
        Ok(row.map(|r| r.0))
    }
}
