//! API handlers
//!
//! Author: hephaex@gmail.com

pub mod auth;
pub mod authors;
pub mod blog_categories;
pub mod blogs;
pub mod domains;
pub mod health;
pub mod upload;

use crate::error::AppError;
use quill_core::{BlogFilter, CategoryFilter, Pagination};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Pagination query parameters
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// 1-based page number (default 1)
    #[validate(range(min = 1))]
    pub page_index: Option<u32>,
    /// Items per page, 1..=100 (default 10)
    #[validate(range(min = 1, max = 100))]
    pub page_size: Option<u32>,
}

impl ListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page_index, self.page_size)
    }
}

/// Blog category listing parameters
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CategoryListQuery {
    #[validate(range(min = 1))]
    pub page_index: Option<u32>,
    #[validate(range(min = 1, max = 100))]
    pub page_size: Option<u32>,
    /// Only categories of this domain
    pub domain_id: Option<Uuid>,
}

impl CategoryListQuery {
    pub fn split(self) -> (CategoryFilter, Pagination) {
        (
            CategoryFilter {
                domain_id: self.domain_id,
            },
            Pagination::new(self.page_index, self.page_size),
        )
    }
}

/// Blog listing parameters
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BlogListQuery {
    #[validate(range(min = 1))]
    pub page_index: Option<u32>,
    #[validate(range(min = 1, max = 100))]
    pub page_size: Option<u32>,
    pub blog_category_id: Option<Uuid>,
    /// Case-insensitive substring of the title or content
    pub keyword: Option<String>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
}

impl BlogListQuery {
    pub fn split(self) -> (BlogFilter, Pagination) {
        let pagination = Pagination::new(self.page_index, self.page_size);
        let filter = BlogFilter {
            blog_category_id: self.blog_category_id,
            keyword: self.keyword,
            is_active: self.is_active,
            is_featured: self.is_featured,
            title_only: false,
        };
        (filter, pagination)
    }
}

/// Identifier of a created, updated or deleted record
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IdResponse {
    pub id: Uuid,
}

/// Map a missing record to `404`
pub(crate) fn found<T>(value: Option<T>, resource: &str) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::NotFound(resource.to_string()))
}
