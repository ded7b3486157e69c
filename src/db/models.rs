use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::auth::models::AdminRole;

/// An administrator account stored in the `admins` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    /// Always stored trimmed and lower-cased.
    pub email: String,
    /// Argon2 PHC hash. Never copied into an API view.
    pub password: String,
    #[serde(default)]
    pub role: AdminRole,
    /// `false` means soft-deleted: kept in storage, refused at login.
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

/// The kind of a content item. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Blog,
    Story,
    Guide,
}

impl ContentType {
    pub const ALL: [ContentType; 3] = [ContentType::Blog, ContentType::Story, ContentType::Guide];

    pub fn from_str_ci(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "blog" => Some(ContentType::Blog),
            "story" => Some(ContentType::Story),
            "guide" => Some(ContentType::Guide),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Blog => "blog",
            ContentType::Story => "story",
            ContentType::Guide => "guide",
        }
    }

    /// Capitalized name used in response messages ("Blog created successfully").
    pub fn display_name(&self) -> &'static str {
        match self {
            ContentType::Blog => "Blog",
            ContentType::Story => "Story",
            ContentType::Guide => "Guide",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Publication status of a content item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl ContentStatus {
    pub fn from_str_ci(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Some(ContentStatus::Draft),
            "published" => Some(ContentStatus::Published),
            "archived" => Some(ContentStatus::Archived),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentStatus::Draft => "draft",
            ContentStatus::Published => "published",
            ContentStatus::Archived => "archived",
        }
    }
}

/// A blog post, story or guide stored in the `contents` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub title: String,
    /// Unique within the collection. Assigned once at creation.
    pub slug: String,
    pub content: String,
    pub author: String,
    #[serde(default)]
    pub status: ContentStatus,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub publication_date: DateTime<Utc>,
    /// File name of the uploaded image inside the uploads directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Only meaningful for guides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guide_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

/// A static page stored in the `pages` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub page_title: String,
    /// Unique within the collection. Assigned once at creation.
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_analytics_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_pixel_code: Option<String>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

// -- API views --
//
// Stored documents carry BSON ids and dates; views are what clients see.

/// Public shape of an administrator. Has no credential field at all.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminView {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: AdminRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Admin> for AdminView {
    fn from(admin: &Admin) -> Self {
        Self {
            id: admin.id.to_hex(),
            name: admin.name.clone(),
            email: admin.email.clone(),
            role: admin.role,
            is_active: admin.is_active,
            created_at: admin.created_at,
            updated_at: admin.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentView {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub author: String,
    pub status: ContentStatus,
    pub publication_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guide_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    pub keywords: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Content> for ContentView {
    fn from(c: &Content) -> Self {
        Self {
            id: c.id.to_hex(),
            content_type: c.content_type,
            title: c.title.clone(),
            slug: c.slug.clone(),
            content: c.content.clone(),
            author: c.author.clone(),
            status: c.status,
            publication_date: c.publication_date,
            image: c.image.clone(),
            guide_link: c.guide_link.clone(),
            meta_title: c.meta_title.clone(),
            meta_description: c.meta_description.clone(),
            keywords: c.keywords.clone(),
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    #[serde(rename = "_id")]
    pub id: String,
    pub page_title: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_analytics_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_pixel_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Page> for PageView {
    fn from(p: &Page) -> Self {
        Self {
            id: p.id.to_hex(),
            page_title: p.page_title.clone(),
            slug: p.slug.clone(),
            editor_content: p.editor_content.clone(),
            meta_title: p.meta_title.clone(),
            meta_description: p.meta_description.clone(),
            keywords: p.keywords.clone(),
            google_analytics_id: p.google_analytics_id.clone(),
            meta_pixel_code: p.meta_pixel_code.clone(),
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}
