//! Typed list queries shared by the MongoDB and in-memory repositories.

use bson::{doc, Document};

use crate::auth::models::AdminRole;
use crate::db::models::{ContentStatus, ContentType};
use crate::error::{AppError, FieldError};

pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

/// Sortable content fields (wire names, identical to stored names).
pub const CONTENT_SORT_FIELDS: &[&str] = &[
    "createdAt",
    "updatedAt",
    "publicationDate",
    "title",
    "author",
    "status",
    "type",
    "slug",
];

pub const PAGE_SORT_FIELDS: &[&str] = &["createdAt", "updatedAt", "pageTitle", "slug"];

pub const ADMIN_SORT_FIELDS: &[&str] = &["createdAt", "updatedAt", "name", "email"];

/// Sort order: a whitelisted field, ascending or descending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: &'static str,
    pub descending: bool,
}

impl SortSpec {
    /// Parse `field` or `-field`, falling back to `default` when absent.
    pub fn parse(
        raw: Option<&str>,
        default: &str,
        allowed: &[&'static str],
    ) -> Result<Self, AppError> {
        let raw = raw.map(str::trim).filter(|s| !s.is_empty()).unwrap_or(default);
        let (name, descending) = match raw.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (raw.strip_prefix('+').unwrap_or(raw), false),
        };

        let field = allowed
            .iter()
            .find(|f| **f == name)
            .copied()
            .ok_or_else(|| {
                AppError::validation(
                    "sort",
                    format!("Cannot sort by '{name}'. Allowed: {}", allowed.join(", ")),
                )
            })?;

        Ok(Self { field, descending })
    }

    pub fn descending(field: &'static str) -> Self {
        Self {
            field,
            descending: true,
        }
    }

    /// MongoDB sort document, with `_id` as a stable tie-breaker.
    pub fn to_document(&self) -> Document {
        let direction = if self.descending { -1 } else { 1 };
        doc! { self.field: direction, "_id": direction }
    }
}

/// Offset pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub page: u64,
    pub limit: u64,
}

impl Default for Paging {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Paging {
    /// Parse `page` and `limit` query values. Absent values use defaults.
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Result<Self, AppError> {
        let mut errors = Vec::new();

        let page = match page.map(str::trim).filter(|s| !s.is_empty()) {
            None => 1,
            Some(raw) => match raw.parse::<u64>() {
                Ok(n) if n >= 1 => n,
                _ => {
                    errors.push(FieldError::new("page", "Page must be a positive integer"));
                    1
                }
            },
        };

        let limit = match limit.map(str::trim).filter(|s| !s.is_empty()) {
            None => DEFAULT_LIMIT,
            Some(raw) => match raw.parse::<u64>() {
                Ok(n) if (1..=MAX_LIMIT).contains(&n) => n,
                _ => {
                    errors.push(FieldError::new(
                        "limit",
                        format!("Limit must be an integer between 1 and {MAX_LIMIT}"),
                    ));
                    DEFAULT_LIMIT
                }
            },
        };

        // The skip must fit the driver's signed 64-bit offset
        if (page - 1)
            .checked_mul(limit)
            .is_none_or(|skip| skip > i64::MAX as u64)
        {
            errors.push(FieldError::new("page", "Page is out of range"));
        }

        if errors.is_empty() {
            Ok(Self { page, limit })
        } else {
            Err(AppError::Validation(errors))
        }
    }

    pub fn skip(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

/// Everything a repository needs to produce one page of results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOptions {
    pub paging: Paging,
    pub sort: SortSpec,
}

impl ListOptions {
    /// Parse raw `page`, `limit` and `sort` query values, reporting every
    /// invalid one.
    pub fn from_query(
        page: Option<&str>,
        limit: Option<&str>,
        sort: Option<&str>,
        default_sort: &str,
        allowed: &[&'static str],
    ) -> Result<Self, AppError> {
        let paging = Paging::parse(page, limit);
        let sort = SortSpec::parse(sort, default_sort, allowed);

        match (paging, sort) {
            (Ok(paging), Ok(sort)) => Ok(Self { paging, sort }),
            (Err(AppError::Validation(mut errors)), Err(AppError::Validation(more))) => {
                errors.extend(more);
                Err(AppError::Validation(errors))
            }
            (Err(e), _) | (_, Err(e)) => Err(e),
        }
    }
}

/// One page of results plus the total number of matches.
#[derive(Debug, Clone)]
pub struct ListResult<T> {
    pub items: Vec<T>,
    pub total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentFilter {
    pub content_type: Option<ContentType>,
    pub status: Option<ContentStatus>,
    /// Case-insensitive substring match on the author name.
    pub author_contains: Option<String>,
}

impl ContentFilter {
    pub fn published() -> Self {
        Self {
            status: Some(ContentStatus::Published),
            ..Self::default()
        }
    }

    pub fn to_document(&self) -> Document {
        let mut filter = Document::new();
        if let Some(content_type) = self.content_type {
            filter.insert("type", content_type.as_str());
        }
        if let Some(status) = self.status {
            filter.insert("status", status.as_str());
        }
        if let Some(author) = &self.author_contains {
            filter.insert("author", contains_ci(author));
        }
        filter
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageFilter {
    /// Case-insensitive substring match on the page title.
    pub title_contains: Option<String>,
}

impl PageFilter {
    pub fn to_document(&self) -> Document {
        let mut filter = Document::new();
        if let Some(title) = &self.title_contains {
            filter.insert("pageTitle", contains_ci(title));
        }
        filter
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminFilter {
    pub role: Option<AdminRole>,
    pub is_active: Option<bool>,
}

impl AdminFilter {
    pub fn to_document(&self) -> Document {
        let mut filter = Document::new();
        if let Some(role) = self.role {
            filter.insert("role", role.to_string());
        }
        if let Some(is_active) = self.is_active {
            filter.insert("isActive", is_active);
        }
        filter
    }
}

/// `$regex` clause matching `needle` literally, ignoring case.
fn contains_ci(needle: &str) -> Document {
    doc! { "$regex": regex::escape(needle), "$options": "i" }
}

/// In-memory equivalent of [`contains_ci`].
pub fn matches_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
