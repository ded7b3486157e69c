use axum::extract::{Path, State};
use bson::oid::ObjectId;
use chrono::Utc;
use serde::Deserialize;

use crate::api::extract::{ApiJson, ApiQuery, KeywordsInput};
use crate::api::response::{ApiResponse, Pagination};
use crate::auth::models::AuthenticatedAdmin;
use crate::db::models::{Page, PageView};
use crate::db::page_repository::{PageRepository, PageSlugs};
use crate::db::query::{ListOptions, ListResult, PageFilter, PAGE_SORT_FIELDS};
use crate::error::AppError;
use crate::slug::resolve_slug;
use crate::state::AppState;
use crate::validation::{
    is_valid_ga_id, is_valid_pixel_code, Validator, META_DESCRIPTION_MAX, META_TITLE_MAX,
    TITLE_MAX,
};

pub const PAGE_NOT_FOUND: &str = "Page not found";
pub const DUPLICATE_SLUG: &str = "Page with this slug already exists";
const GA_ID_MESSAGE: &str = "Invalid Google Analytics ID format. Use GA-XXXXXX-X or G-XXXXXXXXXX";
const PIXEL_MESSAGE: &str = "Meta Pixel code must contain only numbers";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInput {
    pub page_title: Option<String>,
    pub slug: Option<String>,
    #[serde(alias = "editor_content")]
    pub editor_content: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub keywords: Option<KeywordsInput>,
    #[serde(alias = "googleAnalyticsID")]
    pub google_analytics_id: Option<String>,
    pub meta_pixel_code: Option<String>,
}

#[derive(Debug, Default)]
struct PageChanges {
    page_title: Option<String>,
    slug: Option<String>,
    editor_content: Option<Option<String>>,
    meta_title: Option<Option<String>>,
    meta_description: Option<Option<String>>,
    keywords: Option<Vec<String>>,
    google_analytics_id: Option<Option<String>>,
    meta_pixel_code: Option<Option<String>>,
}

/// Optional identifier field: blank clears it, otherwise `check` must pass.
fn tracking_id(
    v: &mut Validator,
    field: &str,
    message: &str,
    value: Option<&str>,
    check: fn(&str) -> bool,
) -> Option<Option<String>> {
    let raw = value?.trim();
    if raw.is_empty() {
        return Some(None);
    }
    if !check(raw) {
        v.error(field, message);
        return None;
    }
    Some(Some(raw.to_string()))
}

fn validate_changes(v: &mut Validator, input: PageInput, creating: bool) -> PageChanges {
    let page_title = if creating {
        v.required_text("pageTitle", "Page title", input.page_title.as_deref(), Some(TITLE_MAX))
    } else {
        v.optional_text("pageTitle", "Page title", input.page_title.as_deref(), Some(TITLE_MAX))
    };

    PageChanges {
        page_title,
        slug: v.slug(input.slug.as_deref()),
        editor_content: input
            .editor_content
            .map(|body| (!body.trim().is_empty()).then_some(body)),
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
        google_analytics_id: tracking_id(
            v,
            "googleAnalyticsId",
            GA_ID_MESSAGE,
            input.google_analytics_id.as_deref(),
            is_valid_ga_id,
        ),
        meta_pixel_code: tracking_id(
            v,
            "metaPixelCode",
            PIXEL_MESSAGE,
            input.meta_pixel_code.as_deref(),
            is_valid_pixel_code,
        ),
    }
}

pub async fn create_page(repo: &dyn PageRepository, input: PageInput) -> Result<Page, AppError> {
    let mut v = Validator::new();
    let changes = validate_changes(&mut v, input, true);
    v.finish()?;

    let Some(page_title) = changes.page_title else {
        return Err(AppError::Internal("validated page is missing its title".into()));
    };
    let slug = resolve_slug(changes.slug.as_deref(), &page_title, None, &PageSlugs(repo)).await?;

    let now = Utc::now();
    let page = Page {
        id: ObjectId::new(),
        page_title,
        slug,
        editor_content: changes.editor_content.flatten(),
        meta_title: changes.meta_title.flatten(),
        meta_description: changes.meta_description.flatten(),
        keywords: changes.keywords.unwrap_or_default(),
        google_analytics_id: changes.google_analytics_id.flatten(),
        meta_pixel_code: changes.meta_pixel_code.flatten(),
        created_at: now,
        updated_at: now,
    };

    let page = repo
        .insert(page)
        .await
        .map_err(|e| e.on_duplicate(|_| AppError::BadRequest(DUPLICATE_SLUG.into())))?;
    tracing::info!(slug = %page.slug, "page created");
    Ok(page)
}

/// Merge supplied fields into the stored page. The slug only changes when a
/// new one is given explicitly.
pub async fn update_page(
    repo: &dyn PageRepository,
    slug: &str,
    input: PageInput,
) -> Result<Page, AppError> {
    let mut v = Validator::new();
    let changes = validate_changes(&mut v, input, false);
    v.finish()?;

    let mut page = repo
        .find_by_slug(slug)
        .await?
        .ok_or_else(|| AppError::NotFound(PAGE_NOT_FOUND.into()))?;

    if let Some(new_slug) = changes.slug {
        if new_slug != page.slug {
            if repo.slug_taken(&new_slug, Some(page.id)).await? {
                return Err(AppError::BadRequest(DUPLICATE_SLUG.into()));
            }
            page.slug = new_slug;
        }
    }
    if let Some(title) = changes.page_title {
        page.page_title = title;
    }
    if let Some(body) = changes.editor_content {
        page.editor_content = body;
    }
    if let Some(meta_title) = changes.meta_title {
        page.meta_title = meta_title;
    }
    if let Some(meta_description) = changes.meta_description {
        page.meta_description = meta_description;
    }
    if let Some(keywords) = changes.keywords {
        page.keywords = keywords;
    }
    if let Some(ga) = changes.google_analytics_id {
        page.google_analytics_id = ga;
    }
    if let Some(pixel) = changes.meta_pixel_code {
        page.meta_pixel_code = pixel;
    }
    page.updated_at = Utc::now();

    let page = repo
        .replace(page)
        .await
        .map_err(|e| e.on_duplicate(|_| AppError::BadRequest(DUPLICATE_SLUG.into())))?
        .ok_or_else(|| AppError::NotFound(PAGE_NOT_FOUND.into()))?;
    tracing::info!(slug = %page.slug, "page updated");
    Ok(page)
}

#[derive(Debug, Default, Deserialize)]
pub struct PageListQuery {
    pub title: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort: Option<String>,
}

impl PageListQuery {
    pub fn filter(&self) -> PageFilter {
        PageFilter {
            title_contains: self
                .title
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
        }
    }

    pub fn options(&self) -> Result<ListOptions, AppError> {
        ListOptions::from_query(
            self.page.as_deref(),
            self.limit.as_deref(),
            self.sort.as_deref(),
            "-createdAt",
            PAGE_SORT_FIELDS,
        )
    }
}

pub async fn list_pages(
    repo: &dyn PageRepository,
    query: &PageListQuery,
) -> Result<(ListResult<Page>, ListOptions), AppError> {
    let options = query.options()?;
    let result = repo.list(&query.filter(), &options).await?;
    Ok((result, options))
}

pub fn page_list_response(
    message: &str,
    result: ListResult<Page>,
    options: &ListOptions,
) -> ApiResponse<Vec<PageView>> {
    let views = result.items.iter().map(PageView::from).collect();
    ApiResponse::ok(message, views).with_pagination(Pagination::new(
        options.paging.page,
        options.paging.limit,
        result.total,
    ))
}

pub async fn find_page(repo: &dyn PageRepository, slug: &str) -> Result<Page, AppError> {
    repo.find_by_slug(slug)
        .await?
        .ok_or_else(|| AppError::NotFound(PAGE_NOT_FOUND.into()))
}

// -- Handlers --

pub async fn create_page_handler(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    ApiJson(input): ApiJson<PageInput>,
) -> Result<ApiResponse<PageView>, AppError> {
    let page = create_page(state.page_repo.as_ref(), input).await?;
    Ok(ApiResponse::created(
        "Page created successfully",
        PageView::from(&page),
    ))
}

pub async fn list_pages_handler(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    ApiQuery(query): ApiQuery<PageListQuery>,
) -> Result<ApiResponse<Vec<PageView>>, AppError> {
    let (result, options) = list_pages(state.page_repo.as_ref(), &query).await?;
    Ok(page_list_response(
        "Pages retrieved successfully",
        result,
        &options,
    ))
}

pub async fn get_page_handler(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(slug): Path<String>,
) -> Result<ApiResponse<PageView>, AppError> {
    let page = find_page(state.page_repo.as_ref(), &slug).await?;
    Ok(ApiResponse::ok(
        "Page retrieved successfully",
        PageView::from(&page),
    ))
}

pub async fn update_page_handler(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(slug): Path<String>,
    ApiJson(input): ApiJson<PageInput>,
) -> Result<ApiResponse<PageView>, AppError> {
    let page = update_page(state.page_repo.as_ref(), &slug, input).await?;
    Ok(ApiResponse::ok(
        "Page updated successfully",
        PageView::from(&page),
    ))
}

pub async fn delete_page_handler(
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
    Path(slug): Path<String>,
) -> Result<ApiResponse<PageView>, AppError> {
    let page = state
        .page_repo
        .delete_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(PAGE_NOT_FOUND.into()))?;
    tracing::info!(slug = %page.slug, admin_id = %admin.id, "page deleted");

    Ok(ApiResponse::ok(
        "Page deleted successfully",
        PageView::from(&page),
    ))
}
