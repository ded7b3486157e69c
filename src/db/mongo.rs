//! MongoDB plumbing shared by the repository implementations.

use bson::{doc, Document};
use futures::TryStreamExt;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{FindOptions, IndexOptions};
use mongodb::{Collection, Database, IndexModel};
use serde::de::DeserializeOwned;

use crate::db::query::{ListOptions, ListResult};
use crate::error::AppError;

const DUPLICATE_KEY_CODE: i32 = 11000;

/// Connect to MongoDB and verify the server answers a `ping`.
pub async fn connect(uri: &str, database: &str) -> Result<Database, AppError> {
    let client = mongodb::Client::with_uri_str(uri)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    let db = client.database(database);

    db.run_command(doc! { "ping": 1 })
        .await
        .map_err(|e| AppError::Database(format!("MongoDB ping failed: {e}")))?;

    Ok(db)
}

/// Returns `true` if the driver error is a unique-index violation.
pub fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(we)) => we.code == DUPLICATE_KEY_CODE,
        ErrorKind::Command(ce) => ce.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}

/// Map a write error, turning unique-index violations on `field` into
/// [`AppError::DuplicateKey`].
pub fn map_write_error(err: mongodb::error::Error, field: &str) -> AppError {
    if is_duplicate_key(&err) {
        tracing::debug!(field, "unique index rejected write");
        AppError::DuplicateKey {
            field: field.to_string(),
        }
    } else {
        AppError::Database(err.to_string())
    }
}

pub fn db_error(err: mongodb::error::Error) -> AppError {
    AppError::Database(err.to_string())
}

/// Declare a unique ascending index on `field`.
pub async fn ensure_unique_index<T: Send + Sync>(
    collection: &Collection<T>,
    field: &str,
) -> Result<(), AppError> {
    let index = IndexModel::builder()
        .keys(doc! { field: 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build();

    collection.create_index(index).await.map_err(db_error)?;
    tracing::debug!(collection = collection.name(), field, "unique index ensured");
    Ok(())
}

/// Run a filtered, sorted, paginated find together with the matching count.
pub async fn find_page<T>(
    collection: &Collection<T>,
    filter: Document,
    options: &ListOptions,
) -> Result<ListResult<T>, AppError>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    let total = collection
        .count_documents(filter.clone())
        .await
        .map_err(db_error)?;

    let find_options = FindOptions::builder()
        .sort(options.sort.to_document())
        .skip(options.paging.skip())
        .limit(options.paging.limit as i64)
        .build();

    let items = collection
        .find(filter)
        .with_options(find_options)
        .await
        .map_err(db_error)?
        .try_collect()
        .await
        .map_err(db_error)?;

    Ok(ListResult { items, total })
}

/// Filter matching `slug`, excluding the record `exclude_id` when given.
pub fn slug_filter(slug: &str, exclude_id: Option<bson::oid::ObjectId>) -> Document {
    let mut filter = doc! { "slug": slug };
    if let Some(id) = exclude_id {
        filter.insert("_id", doc! { "$ne": id });
    }
    filter
}
