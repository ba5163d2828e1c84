//! Domain models for accounts and blog resources
//!
//! Every resource comes in three shapes: the stored row, a create input
//! and a partial patch. Inputs carry `validator` rules so the HTTP layer
//! can reject them before any store call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::repository::Resource;

// ============================================================================
// Pagination
// ============================================================================

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Upper bound for `pageSize`
pub const MAX_PAGE_SIZE: u32 = 100;

/// Resolved 1-based pagination window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page_index: u32,
    pub page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page_index: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// Build from optional query values, clamping into the accepted range
    pub fn new(page_index: Option<u32>, page_size: Option<u32>) -> Self {
        Self {
            page_index: page_index.unwrap_or(1).max(1),
            page_size: page_size
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Number of items to skip
    pub fn skip(&self) -> u64 {
        u64::from(self.page_index - 1) * u64::from(self.page_size)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }
}

/// One page of results plus the size of the whole filtered set
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[aliases(
    DomainPage = Page<Domain>,
    AuthorPage = Page<Author>,
    BlogCategoryPage = Page<BlogCategory>,
    BlogPage = Page<Blog>,
    BlogLookupPage = Page<BlogLookup>
)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub count: u64,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            count: self.count,
        }
    }
}

/// Filter for resources that support none
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFilter;

// ============================================================================
// Accounts
// ============================================================================

/// Stored account
///
/// Never serialized directly; use [`AccountPublic`] on the wire.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    /// SHA-256 hex digest of the last issued refresh token
    pub refresh_token_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn to_public(&self) -> AccountPublic {
        AccountPublic {
            id: self.id,
            email: self.email.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Account projection without credentials
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountPublic {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Domains
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewDomain {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "url must not be empty"))]
    pub url: String,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DomainPatch {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "url must not be empty"))]
    pub url: Option<String>,
    pub is_active: Option<bool>,
}

impl Resource for Domain {
    type Create = NewDomain;
    type Patch = DomainPatch;
    type Filter = NoFilter;

    const NAME: &'static str = "domain";

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn build(id: Uuid, input: NewDomain, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: input.name,
            url: input.url,
            is_active: input.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: DomainPatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(url) = patch.url {
            self.url = url;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        self.updated_at = now;
    }

    fn matches(&self, _filter: &NoFilter) -> bool {
        true
    }

    fn unique_key(&self) -> Option<(&'static str, String)> {
        Some(("url", self.url.clone()))
    }
}

// ============================================================================
// Authors
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: Uuid,
    pub avatar: String,
    pub name: String,
    pub designation: String,
    pub description: String,
    pub linkedin: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewAuthor {
    #[validate(length(min = 1, message = "avatar must not be empty"))]
    pub avatar: String,
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "designation must not be empty"))]
    pub designation: String,
    #[serde(default)]
    pub description: String,
    #[validate(length(min = 1, message = "linkedin must not be empty"))]
    pub linkedin: String,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorPatch {
    #[validate(length(min = 1))]
    pub avatar: Option<String>,
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub designation: Option<String>,
    pub description: Option<String>,
    #[validate(length(min = 1))]
    pub linkedin: Option<String>,
    pub is_active: Option<bool>,
}

impl Resource for Author {
    type Create = NewAuthor;
    type Patch = AuthorPatch;
    type Filter = NoFilter;

    const NAME: &'static str = "author";

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn build(id: Uuid, input: NewAuthor, now: DateTime<Utc>) -> Self {
        Self {
            id,
            avatar: input.avatar,
            name: input.name,
            designation: input.designation,
            description: input.description,
            linkedin: input.linkedin,
            is_active: input.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: AuthorPatch, now: DateTime<Utc>) {
        if let Some(avatar) = patch.avatar {
            self.avatar = avatar;
        }
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(designation) = patch.designation {
            self.designation = designation;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(linkedin) = patch.linkedin {
            self.linkedin = linkedin;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        self.updated_at = now;
    }

    fn matches(&self, _filter: &NoFilter) -> bool {
        true
    }
}

// ============================================================================
// Blog categories
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlogCategory {
    pub id: Uuid,
    pub name: String,
    pub domain_id: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewBlogCategory {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    pub domain_id: Uuid,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlogCategoryPatch {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    pub domain_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

/// Category listing filter
#[derive(Debug, Clone, Default)]
pub struct CategoryFilter {
    pub domain_id: Option<Uuid>,
}

impl Resource for BlogCategory {
    type Create = NewBlogCategory;
    type Patch = BlogCategoryPatch;
    type Filter = CategoryFilter;

    const NAME: &'static str = "blog category";

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn build(id: Uuid, input: NewBlogCategory, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: input.name,
            domain_id: input.domain_id,
            is_active: input.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: BlogCategoryPatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(domain_id) = patch.domain_id {
            self.domain_id = domain_id;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        self.updated_at = now;
    }

    fn matches(&self, filter: &CategoryFilter) -> bool {
        filter.domain_id.map_or(true, |id| self.domain_id == id)
    }

    fn unique_key(&self) -> Option<(&'static str, String)> {
        Some(("name", self.name.clone()))
    }
}

// ============================================================================
// Blogs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    pub id: Uuid,
    pub title: String,
    pub publish_date: DateTime<Utc>,
    pub content: String,
    pub introduction: String,
    pub image: String,
    pub is_active: bool,
    pub tags: Vec<String>,
    pub blog_category_id: Uuid,
    pub author_id: Uuid,
    pub domain_id: Uuid,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewBlog {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    pub publish_date: DateTime<Utc>,
    #[validate(length(min = 1, message = "content must not be empty"))]
    pub content: String,
    #[validate(length(min = 1, message = "introduction must not be empty"))]
    pub introduction: String,
    #[validate(length(min = 1, message = "image must not be empty"))]
    pub image: String,
    pub is_active: Option<bool>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub blog_category_id: Uuid,
    pub author_id: Uuid,
    pub domain_id: Uuid,
    pub is_featured: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlogPatch {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    pub publish_date: Option<DateTime<Utc>>,
    #[validate(length(min = 1))]
    pub content: Option<String>,
    #[validate(length(min = 1))]
    pub introduction: Option<String>,
    #[validate(length(min = 1))]
    pub image: Option<String>,
    pub is_active: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub blog_category_id: Option<Uuid>,
    pub author_id: Option<Uuid>,
    pub domain_id: Option<Uuid>,
    pub is_featured: Option<bool>,
}

/// Blog listing filter
#[derive(Debug, Clone, Default)]
pub struct BlogFilter {
    pub blog_category_id: Option<Uuid>,
    /// Case-insensitive substring match
    pub keyword: Option<String>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
    /// Match `keyword` against the title only (lookups)
    pub title_only: bool,
}

impl BlogFilter {
    /// Keyword with surrounding whitespace removed; blank keywords match everything
    pub fn keyword(&self) -> Option<&str> {
        self.keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

impl Resource for Blog {
    type Create = NewBlog;
    type Patch = BlogPatch;
    type Filter = BlogFilter;

    const NAME: &'static str = "blog";

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn build(id: Uuid, input: NewBlog, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: input.title,
            publish_date: input.publish_date,
            content: input.content,
            introduction: input.introduction,
            image: input.image,
            is_active: input.is_active.unwrap_or(true),
            tags: input.tags,
            blog_category_id: input.blog_category_id,
            author_id: input.author_id,
            domain_id: input.domain_id,
            is_featured: input.is_featured.unwrap_or(false),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: BlogPatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(publish_date) = patch.publish_date {
            self.publish_date = publish_date;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(introduction) = patch.introduction {
            self.introduction = introduction;
        }
        if let Some(image) = patch.image {
            self.image = image;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(id) = patch.blog_category_id {
            self.blog_category_id = id;
        }
        if let Some(id) = patch.author_id {
            self.author_id = id;
        }
        if let Some(id) = patch.domain_id {
            self.domain_id = id;
        }
        if let Some(is_featured) = patch.is_featured {
            self.is_featured = is_featured;
        }
        self.updated_at = now;
    }

    fn matches(&self, filter: &BlogFilter) -> bool {
        if filter
            .blog_category_id
            .is_some_and(|id| id != self.blog_category_id)
        {
            return false;
        }
        if filter.is_active.is_some_and(|v| v != self.is_active) {
            return false;
        }
        if filter.is_featured.is_some_and(|v| v != self.is_featured) {
            return false;
        }
        match filter.keyword() {
            None => true,
            Some(keyword) => {
                let needle = keyword.to_lowercase();
                self.title.to_lowercase().contains(&needle)
                    || (!filter.title_only && self.content.to_lowercase().contains(&needle))
            }
        }
    }
}

/// Blog projection for pickers and listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlogLookup {
    pub id: Uuid,
    pub title: String,
    pub publish_date: DateTime<Utc>,
    pub introduction: String,
    pub image: String,
    pub is_active: bool,
    pub blog_category_id: Uuid,
    pub author_id: Uuid,
    pub domain_id: Uuid,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Blog> for BlogLookup {
    fn from(blog: Blog) -> Self {
        Self {
            id: blog.id,
            title: blog.title,
            publish_date: blog.publish_date,
            introduction: blog.introduction,
            image: blog.image,
            is_active: blog.is_active,
            blog_category_id: blog.blog_category_id,
            author_id: blog.author_id,
            domain_id: blog.domain_id,
            is_featured: blog.is_featured,
            created_at: blog.created_at,
            updated_at: blog.updated_at,
        }
    }
}
