use async_trait::async_trait;
use bson::oid::ObjectId;

use crate::db::models::Admin;
use crate::db::query::{AdminFilter, ListOptions, ListResult};
use crate::error::AppError;

/// Repository trait for administrator accounts.
#[async_trait]
pub trait AdminRepository: Send + Sync {
    /// Insert a new administrator. A duplicate email is `DuplicateKey { field: "email" }`.
    async fn insert(&self, admin: Admin) -> Result<Admin, AppError>;

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Admin>, AppError>;

    /// Look up by normalized (trimmed, lower-cased) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Admin>, AppError>;

    /// Returns `true` if an administrator other than `exclude_id` uses `email`.
    async fn email_taken(&self, email: &str, exclude_id: Option<ObjectId>)
        -> Result<bool, AppError>;

    async fn list(
        &self,
        filter: &AdminFilter,
        options: &ListOptions,
    ) -> Result<ListResult<Admin>, AppError>;

    /// Replace the stored record with the same id, returning the new version.
    async fn replace(&self, admin: Admin) -> Result<Option<Admin>, AppError>;
}

/// MongoDB implementation of the AdminRepository.
pub struct MongoAdminRepository {
    collection: mongodb::Collection<Admin>,
}

impl MongoAdminRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("admins"),
        }
    }

    pub async fn ensure_indexes(&self) -> Result<(), AppError> {
        crate::db::mongo::ensure_unique_index(&self.collection, "email").await
    }
}

#[async_trait]
impl AdminRepository for MongoAdminRepository {
    async fn insert(&self, admin: Admin) -> Result<Admin, AppError> {
        self.collection
            .insert_one(&admin)
            .await
            .map_err(|e| crate::db::mongo::map_write_error(e, "email"))?;
        Ok(admin)
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Admin>, AppError> {
        use mongodb::bson::doc;

        self.collection
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Admin>, AppError> {
        use mongodb::bson::doc;

        self.collection
            .find_one(doc! { "email": email })
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn email_taken(
        &self,
        email: &str,
        exclude_id: Option<ObjectId>,
    ) -> Result<bool, AppError> {
        use mongodb::bson::doc;

        let mut filter = doc! { "email": email };
        if let Some(id) = exclude_id {
            filter.insert("_id", doc! { "$ne": id });
        }

        let count = self
            .collection
            .count_documents(filter)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    async fn list(
        &self,
        filter: &AdminFilter,
        options: &ListOptions,
    ) -> Result<ListResult<Admin>, AppError> {
        crate::db::mongo::find_page(&self.collection, filter.to_document(), options).await
    }

    async fn replace(&self, admin: Admin) -> Result<Option<Admin>, AppError> {
        use mongodb::bson::doc;
        use mongodb::options::{FindOneAndReplaceOptions, ReturnDocument};

        let options = FindOneAndReplaceOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection
            .find_one_and_replace(doc! { "_id": admin.id }, &admin)
            .with_options(options)
            .await
            .map_err(|e| crate::db::mongo::map_write_error(e, "email"))
    }
}
