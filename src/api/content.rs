use axum::extract::{FromRequest, Multipart, Path, Request, State};
use axum::http::header::CONTENT_TYPE;
use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::api::extract::{ApiJson, ApiQuery, KeywordsInput};
use crate::api::response::{ApiResponse, Pagination};
use crate::api::upload::{discard_image, read_multipart, store_image, ImageUpload};
use crate::auth::models::AuthenticatedAdmin;
use crate::db::content_repository::{ContentRepository, ContentSlugs};
use crate::db::models::{Content, ContentStatus, ContentType, ContentView};
use crate::db::query::{ContentFilter, ListOptions, ListResult, CONTENT_SORT_FIELDS};
use crate::error::AppError;
use crate::slug::resolve_slug;
use crate::state::AppState;
use crate::storage::client::StorageClient;
use crate::validation::{
    choice, is_absolute_url, Validator, META_DESCRIPTION_MAX, META_TITLE_MAX, TITLE_MAX,
};

pub const CONTENT_NOT_FOUND: &str = "Content not found";
pub const DUPLICATE_SLUG: &str = "Content with this slug already exists";
pub const TYPE_MESSAGE: &str = "Type must be either blog, story, or guide";
pub const STATUS_MESSAGE: &str = "Status must be either draft, published, or archived";
const GUIDE_LINK_MESSAGE: &str = "guideLink must be a valid URL when type is guide";

/// Content fields as received. Which ones are required depends on the
/// operation, so everything is optional at this stage.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentInput {
    #[serde(rename = "type")]
    pub content_type: Option<String>,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub status: Option<String>,
    pub publication_date: Option<String>,
    pub guide_link: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub keywords: Option<KeywordsInput>,
}

/// Body of a content write: JSON, or a multipart form with an optional image.
#[derive(Debug)]
pub struct ContentPayload {
    pub input: ContentInput,
    pub image: Option<ImageUpload>,
}

impl<S> FromRequest<S> for ContentPayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if !is_multipart {
            let ApiJson(input) = ApiJson::<ContentInput>::from_request(req, state).await?;
            return Ok(Self { input, image: None });
        }

        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::Upload(format!("File upload error: {}", e.body_text())))?;
        let form = read_multipart(multipart).await?;
        let input = serde_json::from_value(Value::Object(form.fields))
            .map_err(|e| AppError::MalformedBody(e.to_string()))?;

        Ok(Self {
            input,
            image: form.image,
        })
    }
}

/// Validated values. `None` means the field was not supplied.
#[derive(Debug, Default)]
struct ContentChanges {
    content_type: Option<ContentType>,
    title: Option<String>,
    slug: Option<String>,
    body: Option<String>,
    author: Option<String>,
    status: Option<ContentStatus>,
    publication_date: Option<DateTime<Utc>>,
    guide_link: Option<Option<String>>,
    meta_title: Option<Option<String>>,
    meta_description: Option<Option<String>>,
    keywords: Option<Vec<String>>,
}

fn text_field(
    v: &mut Validator,
    creating: bool,
    field: &str,
    label: &str,
    value: Option<&str>,
    max: Option<usize>,
) -> Option<String> {
    if creating {
        v.required_text(field, label, value, max)
    } else {
        v.optional_text(field, label, value, max)
    }
}

fn validate_changes(v: &mut Validator, input: ContentInput, creating: bool) -> ContentChanges {
    let content_type = choice(
        v,
        "type",
        TYPE_MESSAGE,
        input.content_type.as_deref(),
        creating,
        ContentType::from_str_ci,
    );
    let title = text_field(
        v,
        creating,
        "title",
        "Title",
        input.title.as_deref(),
        Some(TITLE_MAX),
    );
    let body = text_field(
        v,
        creating,
        "content",
        "Content",
        input.content.as_deref(),
        None,
    );
    let author = text_field(
        v,
        creating,
        "author",
        "Author",
        input.author.as_deref(),
        None,
    );
    let status = choice(
        v,
        "status",
        STATUS_MESSAGE,
        input.status.as_deref(),
        false,
        ContentStatus::from_str_ci,
    );

    let publication_date = match input
        .publication_date
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        None => {
            if creating {
                v.error("publicationDate", "Publication date is required");
            }
            None
        }
        Some(raw) => v.date("publicationDate", "Publication date", Some(raw)),
    };

    ContentChanges {
        content_type,
        title,
        slug: v.slug(input.slug.as_deref()),
        body,
        author,
        status,
        publication_date,
        guide_link: input.guide_link.map(|link| {
            let link = link.trim();
            (!link.is_empty()).then(|| link.to_string())
        }),
        meta_title: v.seo_text(
            "metaTitle",
            "Meta title",
            input.meta_title.as_deref(),
            META_TITLE_MAX,
        ),
        meta_description: v.seo_text(
            "metaDescription",
            "Meta description",
            input.meta_description.as_deref(),
            META_DESCRIPTION_MAX,
        ),
        keywords: v.keywords(input.keywords.map(KeywordsInput::into_list)),
    }
}

/// Guides must link to an absolute URL. Other types accept free text.
fn check_guide_link(v: &mut Validator, content_type: ContentType, link: Option<&str>) {
    if content_type == ContentType::Guide && link.is_some_and(|l| !is_absolute_url(l)) {
        v.error("guideLink", GUIDE_LINK_MESSAGE);
    }
}

/// Core creation logic, separated from the HTTP layer for testability.
///
/// Validates the input, assigns a unique slug, stores the image (if any)
/// and persists the item. The stored image is removed again when the
/// database write fails.
pub async fn create_content(
    repo: &dyn ContentRepository,
    storage: &dyn StorageClient,
    input: ContentInput,
    image: Option<ImageUpload>,
) -> Result<Content, AppError> {
    let mut v = Validator::new();
    let changes = validate_changes(&mut v, input, true);
    if let Some(content_type) = changes.content_type {
        let link = changes.guide_link.as_ref().and_then(|l| l.as_deref());
        check_guide_link(&mut v, content_type, link);
    }
    v.finish()?;

    let (Some(content_type), Some(title), Some(body), Some(author), Some(publication_date)) = (
        changes.content_type,
        changes.title,
        changes.body,
        changes.author,
        changes.publication_date,
    ) else {
        return Err(AppError::Internal(
            "validated content is missing required fields".into(),
        ));
    };

    let slug = resolve_slug(changes.slug.as_deref(), &title, None, &ContentSlugs(repo)).await?;

    let image = match image {
        Some(upload) => Some(store_image(storage, upload).await?),
        None => None,
    };

    let now = Utc::now();
    let content = Content {
        id: ObjectId::new(),
        content_type,
        title,
        slug,
        content: body,
        author,
        status: changes.status.unwrap_or_default(),
        publication_date,
        image: image.clone(),
        guide_link: changes.guide_link.flatten(),
        meta_title: changes.meta_title.flatten(),
        meta_description: changes.meta_description.flatten(),
        keywords: changes.keywords.unwrap_or_default(),
        created_at: now,
        updated_at: now,
    };

    match repo.insert(content).await {
        Ok(content) => {
            tracing::info!(
                slug = %content.slug,
                content_type = %content.content_type,
                "content created"
            );
            Ok(content)
        }
        Err(e) => {
            if let Some(key) = &image {
                discard_image(storage, key).await;
            }
            Err(e.on_duplicate(|_| AppError::BadRequest(DUPLICATE_SLUG.into())))
        }
    }
}

/// Core update logic.
///
/// Supplied fields are merged into the stored item and the result is
/// validated as a whole. The slug only changes when a new one is given
/// explicitly. A replaced image is removed after the write succeeds.
pub async fn update_content(
    repo: &dyn ContentRepository,
    storage: &dyn StorageClient,
    slug: &str,
    input: ContentInput,
    image: Option<ImageUpload>,
) -> Result<Content, AppError> {
    let mut v = Validator::new();
    let changes = validate_changes(&mut v, input, false);

    let existing = repo.find_by_slug(slug).await?;
    if let Some(existing) = &existing {
        if changes
            .content_type
            .is_some_and(|t| t != existing.content_type)
        {
            v.error("type", "Content type cannot be changed after creation");
        }
        let link = match &changes.guide_link {
            Some(link) => link.as_deref(),
            None => existing.guide_link.as_deref(),
        };
        check_guide_link(&mut v, existing.content_type, link);
    }
    v.finish()?;

    let mut content = existing.ok_or_else(|| AppError::NotFound(CONTENT_NOT_FOUND.into()))?;

    if let Some(new_slug) = changes.slug {
        if new_slug != content.slug {
            if repo.slug_taken(&new_slug, Some(content.id)).await? {
                return Err(AppError::BadRequest(DUPLICATE_SLUG.into()));
            }
            content.slug = new_slug;
        }
    }
    if let Some(title) = changes.title {
        content.title = title;
    }
    if let Some(body) = changes.body {
        content.content = body;
    }
    if let Some(author) = changes.author {
        content.author = author;
    }
    if let Some(status) = changes.status {
        content.status = status;
    }
    if let Some(date) = changes.publication_date {
        content.publication_date = date;
    }
    if let Some(link) = changes.guide_link {
        content.guide_link = link;
    }
    if let Some(meta_title) = changes.meta_title {
        content.meta_title = meta_title;
    }
    if let Some(meta_description) = changes.meta_description {
        content.meta_description = meta_description;
    }
    if let Some(keywords) = changes.keywords {
        content.keywords = keywords;
    }

    let new_image = match image {
        Some(upload) => Some(store_image(storage, upload).await?),
        None => None,
    };
    let old_image = match &new_image {
        Some(key) => content.image.replace(key.clone()),
        None => None,
    };
    content.updated_at = Utc::now();

    let updated = match repo.replace(content).await {
        Ok(Some(updated)) => updated,
        failed => {
            if let Some(key) = &new_image {
                discard_image(storage, key).await;
            }
            return Err(match failed {
                Err(e) => e.on_duplicate(|_| AppError::BadRequest(DUPLICATE_SLUG.into())),
                Ok(_) => AppError::NotFound(CONTENT_NOT_FOUND.into()),
            });
        }
    };

    if let Some(old) = old_image {
        discard_image(storage, &old).await;
    }
    tracing::info!(slug = %updated.slug, "content updated");
    Ok(updated)
}

/// Hard delete. The item's image file is removed on a best-effort basis.
pub async fn delete_content(
    repo: &dyn ContentRepository,
    storage: &dyn StorageClient,
    slug: &str,
) -> Result<Content, AppError> {
    let content = repo
        .delete_by_slug(slug)
        .await?
        .ok_or_else(|| AppError::NotFound(CONTENT_NOT_FOUND.into()))?;

    if let Some(image) = &content.image {
        discard_image(storage, image).await;
    }
    tracing::info!(slug = %content.slug, "content deleted");
    Ok(content)
}

#[derive(Debug, Default, Deserialize)]
pub struct ContentListQuery {
    #[serde(rename = "type")]
    pub content_type: Option<String>,
    pub status: Option<String>,
    pub author: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort: Option<String>,
}

pub async fn list_content(
    repo: &dyn ContentRepository,
    query: &ContentListQuery,
) -> Result<(ListResult<Content>, ListOptions), AppError> {
    let mut v = Validator::new();
    let filter = ContentFilter {
        content_type: choice(
            &mut v,
            "type",
            TYPE_MESSAGE,
            query.content_type.as_deref(),
            false,
            ContentType::from_str_ci,
        ),
        status: choice(
            &mut v,
            "status",
            STATUS_MESSAGE,
            query.status.as_deref(),
            false,
            ContentStatus::from_str_ci,
        ),
        author_contains: query
            .author
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string),
    };
    let options = v.finish_with(ListOptions::from_query(
        query.page.as_deref(),
        query.limit.as_deref(),
        query.sort.as_deref(),
        "-createdAt",
        CONTENT_SORT_FIELDS,
    ))?;

    let result = repo.list(&filter, &options).await?;
    Ok((result, options))
}

pub fn views(items: &[Content]) -> Vec<ContentView> {
    items.iter().map(ContentView::from).collect()
}

// -- Handlers --

/// Axum handler for `POST /api/content`.
pub async fn create_content_handler(
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
    payload: ContentPayload,
) -> Result<ApiResponse<ContentView>, AppError> {
    let content = create_content(
        state.content_repo.as_ref(),
        state.storage_client.as_ref(),
        payload.input,
        payload.image,
    )
    .await?;
    tracing::debug!(admin_id = %admin.id, slug = %content.slug, "create content request served");

    Ok(ApiResponse::created(
        format!("{} created successfully", content.content_type.display_name()),
        ContentView::from(&content),
    ))
}

/// Axum handler for `GET /api/content`.
pub async fn list_content_handler(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    ApiQuery(query): ApiQuery<ContentListQuery>,
) -> Result<ApiResponse<Vec<ContentView>>, AppError> {
    let (result, options) = list_content(state.content_repo.as_ref(), &query).await?;

    Ok(
        ApiResponse::ok("Content retrieved successfully", views(&result.items)).with_pagination(
            Pagination::new(options.paging.page, options.paging.limit, result.total),
        ),
    )
}

/// Axum handler for `GET /api/content/{slug}`.
pub async fn get_content_handler(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(slug): Path<String>,
) -> Result<ApiResponse<ContentView>, AppError> {
    let content = state
        .content_repo
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(CONTENT_NOT_FOUND.into()))?;

    Ok(ApiResponse::ok(
        "Content retrieved successfully",
        ContentView::from(&content),
    ))
}

/// Axum handler for `PUT /api/content/{slug}`.
pub async fn update_content_handler(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(slug): Path<String>,
    payload: ContentPayload,
) -> Result<ApiResponse<ContentView>, AppError> {
    let content = update_content(
        state.content_repo.as_ref(),
        state.storage_client.as_ref(),
        &slug,
        payload.input,
        payload.image,
    )
    .await?;

    Ok(ApiResponse::ok(
        "Content updated successfully",
        ContentView::from(&content),
    ))
}

/// Axum handler for `DELETE /api/content/{slug}`.
pub async fn delete_content_handler(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(slug): Path<String>,
) -> Result<ApiResponse<ContentView>, AppError> {
    let content = delete_content(
        state.content_repo.as_ref(),
        state.storage_client.as_ref(),
        &slug,
    )
    .await?;

    Ok(ApiResponse::ok(
        "Content deleted successfully",
        ContentView::from(&content),
    ))
}
