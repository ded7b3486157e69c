use async_trait::async_trait;
use bson::oid::ObjectId;

use crate::db::models::Page;
use crate::db::query::{ListOptions, ListResult, PageFilter};
use crate::error::AppError;
use crate::slug::SlugLookup;

/// Repository trait for static pages.
#[async_trait]
pub trait PageRepository: Send + Sync {
    /// Insert a new page. A duplicate slug is `DuplicateKey { field: "slug" }`.
    async fn insert(&self, page: Page) -> Result<Page, AppError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Page>, AppError>;

    async fn list(
        &self,
        filter: &PageFilter,
        options: &ListOptions,
    ) -> Result<ListResult<Page>, AppError>;

    async fn replace(&self, page: Page) -> Result<Option<Page>, AppError>;

    async fn delete_by_slug(&self, slug: &str) -> Result<Option<Page>, AppError>;

    async fn slug_taken(&self, slug: &str, exclude_id: Option<ObjectId>)
        -> Result<bool, AppError>;
}

/// Slug lookups scoped to the pages collection.
pub struct PageSlugs<'a>(pub &'a dyn PageRepository);

#[async_trait]
impl SlugLookup for PageSlugs<'_> {
    async fn slug_taken(&self, slug: &str, exclude_id: Option<ObjectId>) -> Result<bool, AppError> {
        self.0.slug_taken(slug, exclude_id).await
    }
}

/// MongoDB implementation of the PageRepository.
pub struct MongoPageRepository {
    collection: mongodb::Collection<Page>,
}

impl MongoPageRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("pages"),
        }
    }

    pub async fn ensure_indexes(&self) -> Result<(), AppError> {
        crate::db::mongo::ensure_unique_index(&self.collection, "slug").await
    }
}

#[async_trait]
impl PageRepository for MongoPageRepository {
    async fn insert(&self, page: Page) -> Result<Page, AppError> {
        self.collection
            .insert_one(&page)
            .await
            .map_err(|e| crate::db::mongo::map_write_error(e, "slug"))?;
        Ok(page)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Page>, AppError> {
        use mongodb::bson::doc;

        self.collection
            .find_one(doc! { "slug": slug })
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn list(
        &self,
        filter: &PageFilter,
        options: &ListOptions,
    ) -> Result<ListResult<Page>, AppError> {
        crate::db::mongo::find_page(&self.collection, filter.to_document(), options).await
    }

    async fn replace(&self, page: Page) -> Result<Option<Page>, AppError> {
        use mongodb::bson::doc;
        use mongodb::options::{FindOneAndReplaceOptions, ReturnDocument};

        let options = FindOneAndReplaceOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection
            .find_one_and_replace(doc! { "_id": page.id }, &page)
            .with_options(options)
            .await
            .map_err(|e| crate::db::mongo::map_write_error(e, "slug"))
    }

    async fn delete_by_slug(&self, slug: &str) -> Result<Option<Page>, AppError> {
        use mongodb::bson::doc;

        self.collection
            .find_one_and_delete(doc! { "slug": slug })
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn slug_taken(
        &self,
        slug: &str,
        exclude_id: Option<ObjectId>,
    ) -> Result<bool, AppError> {
        let count = self
            .collection
            .count_documents(crate::db::mongo::slug_filter(slug, exclude_id))
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }
}
