//! Read-only surface for the public website. Every route sits behind the
//! API-key middleware and only ever sees published content.

use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};

use crate::api::content::views;
use crate::api::extract::ApiQuery;
use crate::api::pages::{find_page, list_pages, page_list_response, PageListQuery};
use crate::api::response::{ApiResponse, Pagination};
use crate::db::content_repository::ContentRepository;
use crate::db::models::{ContentStatus, ContentType, ContentView, PageView};
use crate::db::query::{ContentFilter, ListOptions, Paging, SortSpec, CONTENT_SORT_FIELDS};
use crate::error::AppError;
use crate::state::AppState;

pub const NOT_PUBLISHED: &str = "Content not found or not published";
pub const INVALID_TYPE: &str = "Invalid type. Must be one of: blog, story, guide";

#[derive(Debug, Default, Deserialize)]
pub struct WebsiteContentQuery {
    #[serde(rename = "type")]
    pub content_type: Option<String>,
    pub author: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LatestQuery {
    pub limit: Option<String>,
}

/// Published-content counts, overall and per type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentStats {
    pub total: u64,
    pub by_type: TypeCounts,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TypeCounts {
    pub blog: u64,
    pub story: u64,
    pub guide: u64,
}

fn parse_type(raw: Option<&str>) -> Result<Option<ContentType>, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(raw) => ContentType::from_str_ci(raw)
            .map(Some)
            .ok_or_else(|| AppError::BadRequest(INVALID_TYPE.into())),
    }
}

pub async fn published_content(
    repo: &dyn ContentRepository,
    query: &WebsiteContentQuery,
) -> Result<(Option<ContentType>, Vec<ContentView>, Pagination), AppError> {
    let content_type = parse_type(query.content_type.as_deref())?;
    let options = ListOptions::from_query(
        query.page.as_deref(),
        query.limit.as_deref(),
        query.sort.as_deref(),
        "-publicationDate",
        CONTENT_SORT_FIELDS,
    )?;
    let filter = ContentFilter {
        content_type,
        author_contains: query
            .author
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string),
        ..ContentFilter::published()
    };

    let result = repo.list(&filter, &options).await?;
    let pagination = Pagination::new(options.paging.page, options.paging.limit, result.total);
    Ok((content_type, views(&result.items), pagination))
}

/// The `limit` most recently published items.
pub async fn latest_content(
    repo: &dyn ContentRepository,
    limit: Option<&str>,
) -> Result<Vec<ContentView>, AppError> {
    let options = ListOptions {
        paging: Paging::parse(None, limit)?,
        sort: SortSpec::descending("publicationDate"),
    };
    let result = repo.list(&ContentFilter::published(), &options).await?;
    Ok(views(&result.items))
}

pub async fn published_by_slug(
    repo: &dyn ContentRepository,
    slug: &str,
) -> Result<ContentView, AppError> {
    repo.find_by_slug(slug)
        .await?
        .filter(|c| c.status == ContentStatus::Published)
        .map(|c| ContentView::from(&c))
        .ok_or_else(|| AppError::NotFound(NOT_PUBLISHED.into()))
}

pub async fn content_stats(repo: &dyn ContentRepository) -> Result<ContentStats, AppError> {
    let mut by_type = TypeCounts::default();
    for content_type in ContentType::ALL {
        let filter = ContentFilter {
            content_type: Some(content_type),
            ..ContentFilter::published()
        };
        let count = repo.count(&filter).await?;
        match content_type {
            ContentType::Blog => by_type.blog = count,
            ContentType::Story => by_type.story = count,
            ContentType::Guide => by_type.guide = count,
        }
    }
    let total = repo.count(&ContentFilter::published()).await?;
    Ok(ContentStats { total, by_type })
}

// -- Handlers --

pub async fn list_content_handler(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<WebsiteContentQuery>,
) -> Result<ApiResponse<Vec<ContentView>>, AppError> {
    let (content_type, items, pagination) =
        published_content(state.content_repo.as_ref(), &query).await?;

    let message = match content_type {
        Some(t) => format!("{} content retrieved successfully", t.display_name()),
        None => "Content retrieved successfully".to_string(),
    };
    Ok(ApiResponse::ok(message, items).with_pagination(pagination))
}

pub async fn latest_content_handler(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LatestQuery>,
) -> Result<ApiResponse<Vec<ContentView>>, AppError> {
    let items = latest_content(state.content_repo.as_ref(), query.limit.as_deref()).await?;
    let count = items.len();
    Ok(ApiResponse::ok("Latest content retrieved successfully", items).with_count(count))
}

pub async fn get_content_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<ApiResponse<ContentView>, AppError> {
    let view = published_by_slug(state.content_repo.as_ref(), &slug).await?;
    Ok(ApiResponse::ok("Content retrieved successfully", view))
}

pub async fn stats_handler(
    State(state): State<AppState>,
) -> Result<ApiResponse<ContentStats>, AppError> {
    let stats = content_stats(state.content_repo.as_ref()).await?;
    Ok(ApiResponse::ok(
        "Content statistics retrieved successfully",
        stats,
    ))
}

pub async fn list_pages_handler(
    State(state): State<AppState>,
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
    Path(slug): Path<String>,
) -> Result<ApiResponse<PageView>, AppError> {
    let page = find_page(state.page_repo.as_ref(), &slug).await?;
    Ok(ApiResponse::ok(
        "Page retrieved successfully",
        PageView::from(&page),
    ))
}
