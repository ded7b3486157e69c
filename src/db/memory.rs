//! In-memory repositories with the same uniqueness guarantees as the
//! MongoDB indexes. Used by tests and local experiments.

use std::cmp::Ordering;
use std::sync::Mutex;

use async_trait::async_trait;
use bson::oid::ObjectId;

use crate::db::admin_repository::AdminRepository;
use crate::db::content_repository::ContentRepository;
use crate::db::models::{Admin, Content, Page};
use crate::db::page_repository::PageRepository;
use crate::db::query::{
    matches_ci, AdminFilter, ContentFilter, ListOptions, ListResult, PageFilter,
};
use crate::error::AppError;

fn duplicate(field: &str) -> AppError {
    AppError::DuplicateKey {
        field: field.to_string(),
    }
}

fn lock_poisoned() -> AppError {
    AppError::Internal("in-memory repository lock poisoned".into())
}

/// Sort `items` by `compare` (then id), honoring direction, and cut one page.
fn paginate<T: Clone>(
    mut items: Vec<T>,
    options: &ListOptions,
    compare: impl Fn(&T, &T, &str) -> Ordering,
    id: impl Fn(&T) -> ObjectId,
) -> ListResult<T> {
    let field = options.sort.field;
    items.sort_by(|a, b| {
        let ord = compare(a, b, field).then_with(|| id(a).cmp(&id(b)));
        if options.sort.descending {
            ord.reverse()
        } else {
            ord
        }
    });

    let total = items.len() as u64;
    let items = items
        .into_iter()
        .skip(usize::try_from(options.paging.skip()).unwrap_or(usize::MAX))
        .take(options.paging.limit as usize)
        .collect();

    ListResult { items, total }
}

// -- Admins --

#[derive(Default)]
pub struct InMemoryAdminRepository {
    admins: Mutex<Vec<Admin>>,
}

impl InMemoryAdminRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn compare_admins(a: &Admin, b: &Admin, field: &str) -> Ordering {
    match field {
        "name" => a.name.cmp(&b.name),
        "email" => a.email.cmp(&b.email),
        "updatedAt" => a.updated_at.cmp(&b.updated_at),
        _ => a.created_at.cmp(&b.created_at),
    }
}

#[async_trait]
impl AdminRepository for InMemoryAdminRepository {
    async fn insert(&self, admin: Admin) -> Result<Admin, AppError> {
        let mut admins = self.admins.lock().map_err(|_| lock_poisoned())?;
        if admins.iter().any(|a| a.email == admin.email) {
            return Err(duplicate("email"));
        }
        admins.push(admin.clone());
        Ok(admin)
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Admin>, AppError> {
        let admins = self.admins.lock().map_err(|_| lock_poisoned())?;
        Ok(admins.iter().find(|a| a.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Admin>, AppError> {
        let admins = self.admins.lock().map_err(|_| lock_poisoned())?;
        Ok(admins.iter().find(|a| a.email == email).cloned())
    }

    async fn email_taken(
        &self,
        email: &str,
        exclude_id: Option<ObjectId>,
    ) -> Result<bool, AppError> {
        let admins = self.admins.lock().map_err(|_| lock_poisoned())?;
        Ok(admins
            .iter()
            .any(|a| a.email == email && Some(a.id) != exclude_id))
    }

    async fn list(
        &self,
        filter: &AdminFilter,
        options: &ListOptions,
    ) -> Result<ListResult<Admin>, AppError> {
        let admins = self.admins.lock().map_err(|_| lock_poisoned())?;
        let matching: Vec<Admin> = admins
            .iter()
            .filter(|a| filter.role.is_none_or(|role| a.role == role))
            .filter(|a| filter.is_active.is_none_or(|active| a.is_active == active))
            .cloned()
            .collect();
        Ok(paginate(matching, options, compare_admins, |a| a.id))
    }

    async fn replace(&self, admin: Admin) -> Result<Option<Admin>, AppError> {
        let mut admins = self.admins.lock().map_err(|_| lock_poisoned())?;
        if admins
            .iter()
            .any(|a| a.email == admin.email && a.id != admin.id)
        {
            return Err(duplicate("email"));
        }
        match admins.iter_mut().find(|a| a.id == admin.id) {
            Some(slot) => {
                *slot = admin.clone();
                Ok(Some(admin))
            }
            None => Ok(None),
        }
    }
}

// -- Content --

#[derive(Default)]
pub struct InMemoryContentRepository {
    contents: Mutex<Vec<Content>>,
}

impl InMemoryContentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn content_matches(content: &Content, filter: &ContentFilter) -> bool {
    filter.content_type.is_none_or(|t| content.content_type == t)
        && filter.status.is_none_or(|s| content.status == s)
        && filter
            .author_contains
            .as_deref()
            .is_none_or(|author| matches_ci(&content.author, author))
}

fn compare_contents(a: &Content, b: &Content, field: &str) -> Ordering {
    match field {
        "updatedAt" => a.updated_at.cmp(&b.updated_at),
        "publicationDate" => a.publication_date.cmp(&b.publication_date),
        "title" => a.title.cmp(&b.title),
        "author" => a.author.cmp(&b.author),
        "status" => a.status.as_str().cmp(b.status.as_str()),
        "type" => a.content_type.as_str().cmp(b.content_type.as_str()),
        "slug" => a.slug.cmp(&b.slug),
        _ => a.created_at.cmp(&b.created_at),
    }
}

#[async_trait]
impl ContentRepository for InMemoryContentRepository {
    async fn insert(&self, content: Content) -> Result<Content, AppError> {
        let mut contents = self.contents.lock().map_err(|_| lock_poisoned())?;
        if contents.iter().any(|c| c.slug == content.slug) {
            return Err(duplicate("slug"));
        }
        contents.push(content.clone());
        Ok(content)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Content>, AppError> {
        let contents = self.contents.lock().map_err(|_| lock_poisoned())?;
        Ok(contents.iter().find(|c| c.slug == slug).cloned())
    }

    async fn list(
        &self,
        filter: &ContentFilter,
        options: &ListOptions,
    ) -> Result<ListResult<Content>, AppError> {
        let contents = self.contents.lock().map_err(|_| lock_poisoned())?;
        let matching: Vec<Content> = contents
            .iter()
            .filter(|c| content_matches(c, filter))
            .cloned()
            .collect();
        Ok(paginate(matching, options, compare_contents, |c| c.id))
    }

    async fn count(&self, filter: &ContentFilter) -> Result<u64, AppError> {
        let contents = self.contents.lock().map_err(|_| lock_poisoned())?;
        Ok(contents.iter().filter(|c| content_matches(c, filter)).count() as u64)
    }

    async fn replace(&self, content: Content) -> Result<Option<Content>, AppError> {
        let mut contents = self.contents.lock().map_err(|_| lock_poisoned())?;
        if contents
            .iter()
            .any(|c| c.slug == content.slug && c.id != content.id)
        {
            return Err(duplicate("slug"));
        }
        match contents.iter_mut().find(|c| c.id == content.id) {
            Some(slot) => {
                *slot = content.clone();
                Ok(Some(content))
            }
            None => Ok(None),
        }
    }

    async fn delete_by_slug(&self, slug: &str) -> Result<Option<Content>, AppError> {
        let mut contents = self.contents.lock().map_err(|_| lock_poisoned())?;
        Ok(contents
            .iter()
            .position(|c| c.slug == slug)
            .map(|idx| contents.remove(idx)))
    }

    async fn slug_taken(
        &self,
        slug: &str,
        exclude_id: Option<ObjectId>,
    ) -> Result<bool, AppError> {
        let contents = self.contents.lock().map_err(|_| lock_poisoned())?;
        Ok(contents
            .iter()
            .any(|c| c.slug == slug && Some(c.id) != exclude_id))
    }
}

// -- Pages --

#[derive(Default)]
pub struct InMemoryPageRepository {
    pages: Mutex<Vec<Page>>,
}

impl InMemoryPageRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn compare_pages(a: &Page, b: &Page, field: &str) -> Ordering {
    match field {
        "updatedAt" => a.updated_at.cmp(&b.updated_at),
        "pageTitle" => a.page_title.cmp(&b.page_title),
        "slug" => a.slug.cmp(&b.slug),
        _ => a.created_at.cmp(&b.created_at),
    }
}

#[async_trait]
impl PageRepository for InMemoryPageRepository {
    async fn insert(&self, page: Page) -> Result<Page, AppError> {
        let mut pages = self.pages.lock().map_err(|_| lock_poisoned())?;
        if pages.iter().any(|p| p.slug == page.slug) {
            return Err(duplicate("slug"));
        }
        pages.push(page.clone());
        Ok(page)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Page>, AppError> {
        let pages = self.pages.lock().map_err(|_| lock_poisoned())?;
        Ok(pages.iter().find(|p| p.slug == slug).cloned())
    }

    async fn list(
        &self,
        filter: &PageFilter,
        options: &ListOptions,
    ) -> Result<ListResult<Page>, AppError> {
        let pages = self.pages.lock().map_err(|_| lock_poisoned())?;
        let matching: Vec<Page> = pages
            .iter()
            .filter(|p| {
                filter
                    .title_contains
                    .as_deref()
                    .is_none_or(|title| matches_ci(&p.page_title, title))
            })
            .cloned()
            .collect();
        Ok(paginate(matching, options, compare_pages, |p| p.id))
    }

    async fn replace(&self, page: Page) -> Result<Option<Page>, AppError> {
        let mut pages = self.pages.lock().map_err(|_| lock_poisoned())?;
        if pages.iter().any(|p| p.slug == page.slug && p.id != page.id) {
            return Err(duplicate("slug"));
        }
        match pages.iter_mut().find(|p| p.id == page.id) {
            Some(slot) => {
                *slot = page.clone();
                Ok(Some(page))
            }
            None => Ok(None),
        }
    }

    async fn delete_by_slug(&self, slug: &str) -> Result<Option<Page>, AppError> {
        let mut pages = self.pages.lock().map_err(|_| lock_poisoned())?;
        Ok(pages
            .iter()
            .position(|p| p.slug == slug)
            .map(|idx| pages.remove(idx)))
    }

    async fn slug_taken(
        &self,
        slug: &str,
        exclude_id: Option<ObjectId>,
    ) -> Result<bool, AppError> {
        let pages = self.pages.lock().map_err(|_| lock_poisoned())?;
        Ok(pages
            .iter()
            .any(|p| p.slug == slug && Some(p.id) != exclude_id))
    }
}
