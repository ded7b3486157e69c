use async_trait::async_trait;
use bson::oid::ObjectId;

use crate::db::models::Content;
use crate::db::query::{ContentFilter, ListOptions, ListResult};
use crate::error::AppError;
use crate::slug::SlugLookup;

/// Repository trait for blog posts, stories and guides.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Insert a new item. A duplicate slug is `DuplicateKey { field: "slug" }`.
    async fn insert(&self, content: Content) -> Result<Content, AppError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Content>, AppError>;

    async fn list(
        &self,
        filter: &ContentFilter,
        options: &ListOptions,
    ) -> Result<ListResult<Content>, AppError>;

    async fn count(&self, filter: &ContentFilter) -> Result<u64, AppError>;

    /// Replace the stored record with the same id, returning the new version.
    async fn replace(&self, content: Content) -> Result<Option<Content>, AppError>;

    /// Hard delete by slug, returning the removed record.
    async fn delete_by_slug(&self, slug: &str) -> Result<Option<Content>, AppError>;

    async fn slug_taken(&self, slug: &str, exclude_id: Option<ObjectId>)
        -> Result<bool, AppError>;
}

/// Slug lookups scoped to the content collection.
pub struct ContentSlugs<'a>(pub &'a dyn ContentRepository);

#[async_trait]
impl SlugLookup for ContentSlugs<'_> {
    async fn slug_taken(&self, slug: &str, exclude_id: Option<ObjectId>) -> Result<bool, AppError> {
        self.0.slug_taken(slug, exclude_id).await
    }
}

/// MongoDB implementation of the ContentRepository.
pub struct MongoContentRepository {
    collection: mongodb::Collection<Content>,
}

impl MongoContentRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("contents"),
        }
    }

    pub async fn ensure_indexes(&self) -> Result<(), AppError> {
        crate::db::mongo::ensure_unique_index(&self.collection, "slug").await
    }
}

#[async_trait]
impl ContentRepository for MongoContentRepository {
    async fn insert(&self, content: Content) -> Result<Content, AppError> {
        self.collection
            .insert_one(&content)
            .await
            .map_err(|e| crate::db::mongo::map_write_error(e, "slug"))?;
        Ok(content)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Content>, AppError> {
        use mongodb::bson::doc;

        self.collection
            .find_one(doc! { "slug": slug })
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn list(
        &self,
        filter: &ContentFilter,
        options: &ListOptions,
    ) -> Result<ListResult<Content>, AppError> {
        crate::db::mongo::find_page(&self.collection, filter.to_document(), options).await
    }

    async fn count(&self, filter: &ContentFilter) -> Result<u64, AppError> {
        self.collection
            .count_documents(filter.to_document())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn replace(&self, content: Content) -> Result<Option<Content>, AppError> {
        use mongodb::bson::doc;
        use mongodb::options::{FindOneAndReplaceOptions, ReturnDocument};

        let options = FindOneAndReplaceOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection
            .find_one_and_replace(doc! { "_id": content.id }, &content)
            .with_options(options)
            .await
            .map_err(|e| crate::db::mongo::map_write_error(e, "slug"))
    }

    async fn delete_by_slug(&self, slug: &str) -> Result<Option<Content>, AppError> {
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
