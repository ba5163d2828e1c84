//! Generic resource service
//!
//! One service type drives domains, authors, categories and blogs. Listing
//! fetches the page and the total count concurrently.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::models::{Blog, BlogFilter, BlogLookup, Page, Pagination};
use crate::repository::{Resource, ResourceRepository};
use crate::Result;

/// CRUD + paginated listing over a [`ResourceRepository`]
pub struct ResourceService<R: Resource> {
    repo: Arc<dyn ResourceRepository<R>>,
}

impl<R: Resource> Clone for ResourceService<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<R: Resource> ResourceService<R> {
    pub fn new(repo: Arc<dyn ResourceRepository<R>>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, input: R::Create) -> Result<Uuid> {
        let id = self.repo.insert(input).await?;
        debug!(resource = R::NAME, %id, "created");
        Ok(id)
    }

    /// One page of the filtered set plus the size of the whole set
    pub async fn find_all(&self, filter: R::Filter, pagination: Pagination) -> Result<Page<R>> {
        let (data, count) = tokio::try_join!(
            self.repo
                .find_page(&filter, pagination.skip(), pagination.limit()),
            self.repo.count(&filter),
        )?;
        debug!(
            resource = R::NAME,
            page = pagination.page_index,
            returned = data.len(),
            count,
            "listed"
        );
        Ok(Page { data, count })
    }

    pub async fn find_one(&self, id: Uuid) -> Result<Option<R>> {
        self.repo.find_by_id(id).await
    }

    /// Returns `None` when the id is unknown
    pub async fn update(&self, id: Uuid, patch: R::Patch) -> Result<Option<Uuid>> {
        let updated = self.repo.update(id, patch).await?;
        if updated.is_some() {
            debug!(resource = R::NAME, %id, "updated");
        }
        Ok(updated)
    }

    /// Returns `None` when the id is unknown
    pub async fn remove(&self, id: Uuid) -> Result<Option<Uuid>> {
        let removed = self.repo.delete(id).await?;
        if removed.is_some() {
            debug!(resource = R::NAME, %id, "removed");
        }
        Ok(removed)
    }
}

impl ResourceService<Blog> {
    /// Lightweight listing without content or tags; keyword matches titles only
    pub async fn lookups(
        &self,
        mut filter: BlogFilter,
        pagination: Pagination,
    ) -> Result<Page<BlogLookup>> {
        filter.title_only = true;
        Ok(self.find_all(filter, pagination).await?.map(BlogLookup::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryRepository;
    use crate::models::{Author, AuthorPatch, NewAuthor, NewBlog, NoFilter};
    use chrono::Utc;
    use proptest::prelude::*;

    fn author_service() -> ResourceService<Author> {
        ResourceService::new(Arc::new(MemoryRepository::<Author>::new()))
    }

    fn blog_service() -> ResourceService<Blog> {
        ResourceService::new(Arc::new(MemoryRepository::<Blog>::new()))
    }

    fn new_author(i: usize) -> NewAuthor {
        NewAuthor {
            avatar: format!("https://cdn.example.com/{i}.png"),
            name: format!("Author {i}"),
            designation: "Writer".to_string(),
            description: String::new(),
            linkedin: format!("https://linkedin.com/in/author{i}"),
            is_active: None,
        }
    }

    fn new_blog(title: &str, content: &str) -> NewBlog {
        NewBlog {
            title: title.to_string(),
            publish_date: Utc::now(),
            content: content.to_string(),
            introduction: "intro".to_string(),
            image: "https://cdn.example.com/cover.png".to_string(),
            is_active: None,
            tags: vec!["rust".to_string()],
            blog_category_id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            domain_id: Uuid::new_v4(),
            is_featured: None,
        }
    }

    #[tokio::test]
    async fn test_second_page_of_fifteen() {
        let service = author_service();
        for i in 0..15 {
            service.create(new_author(i)).await.unwrap();
        }

        let page = service
            .find_all(NoFilter, Pagination::new(Some(2), Some(10)))
            .await
            .unwrap();
        assert_eq!(page.data.len(), 5);
        assert_eq!(page.count, 15);
    }

    #[tokio::test]
    async fn test_pages_do_not_overlap() {
        let service = author_service();
        for i in 0..7 {
            service.create(new_author(i)).await.unwrap();
        }

        let first = service
            .find_all(NoFilter, Pagination::new(Some(1), Some(4)))
            .await
            .unwrap();
        let second = service
            .find_all(NoFilter, Pagination::new(Some(2), Some(4)))
            .await
            .unwrap();

        let mut ids: Vec<Uuid> = first.data.iter().chain(&second.data).map(|a| a.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 7);
    }

    #[tokio::test]
    async fn test_update_and_remove() {
        let service = author_service();
        let id = service.create(new_author(1)).await.unwrap();

        let patch = AuthorPatch {
            designation: Some("Editor".to_string()),
            ..Default::default()
        };
        assert_eq!(service.update(id, patch).await.unwrap(), Some(id));

        let author = service.find_one(id).await.unwrap().unwrap();
        assert_eq!(author.designation, "Editor");
        assert_eq!(author.name, "Author 1");
        assert!(author.updated_at >= author.created_at);

        assert_eq!(service.remove(id).await.unwrap(), Some(id));
        assert!(service.find_one(id).await.unwrap().is_none());
        assert_eq!(service.remove(id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_keyword_is_case_insensitive_on_title_or_content() {
        let service = blog_service();
        service
            .create(new_blog("Async Rust", "futures and executors"))
            .await
            .unwrap();
        service
            .create(new_blog("Gardening", "Growing RUSTIC tomatoes"))
            .await
            .unwrap();
        service
            .create(new_blog("Cooking", "pasta"))
            .await
            .unwrap();

        let filter = BlogFilter {
            keyword: Some("rust".to_string()),
            ..Default::default()
        };
        let page = service
            .find_all(filter.clone(), Pagination::default())
            .await
            .unwrap();
        assert_eq!(page.count, 2);

        let lookups = service
            .lookups(filter, Pagination::default())
            .await
            .unwrap();
        assert_eq!(lookups.count, 1);
        assert_eq!(lookups.data[0].title, "Async Rust");
    }

    proptest! {
        #[test]
        fn prop_page_size_matches_window(total in 0usize..40, page_index in 1u32..6, page_size in 1u32..15) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            rt.block_on(async {
                let service = author_service();
                for i in 0..total {
                    service.create(new_author(i)).await.unwrap();
                }
                let pagination = Pagination::new(Some(page_index), Some(page_size));
                let page = service.find_all(NoFilter, pagination).await.unwrap();

                let skip = pagination.skip() as usize;
                let expected = total.saturating_sub(skip).min(page_size as usize);
                prop_assert_eq!(page.data.len(), expected);
                prop_assert_eq!(page.count, total as u64);
                Ok(())
            })?;
        }
    }
}
