//! Field-level request validation.
//!
//! Every check records into a [`Validator`] so a request reports all of its
//! problems at once instead of failing on the first.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;

use crate::error::{AppError, FieldError};
use crate::slug::is_valid_slug;

pub const TITLE_MAX: usize = 200;
pub const SLUG_MAX: usize = 200;
pub const META_TITLE_MAX: usize = 60;
pub const META_DESCRIPTION_MAX: usize = 160;
pub const KEYWORD_MAX: usize = 50;
pub const NAME_MIN: usize = 2;
pub const PASSWORD_MIN: usize = 6;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$").expect("valid regex literal")
});

static GA_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(GA-\d{4,}-\d+|G-[A-Z0-9]{10})$").expect("valid regex literal")
});

/// Accumulates field errors for one request.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// A trimmed, non-empty string of at most `max` characters.
    pub fn required_text(
        &mut self,
        field: &str,
        label: &str,
        value: Option<&str>,
        max: Option<usize>,
    ) -> Option<String> {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            None => {
                self.error(field, format!("{label} is required"));
                None
            }
            Some(v) => self.bounded(field, label, v, max),
        }
    }

    /// Like [`Self::required_text`] for fields that may be left out of an
    /// update but must not be blanked when present.
    pub fn optional_text(
        &mut self,
        field: &str,
        label: &str,
        value: Option<&str>,
        max: Option<usize>,
    ) -> Option<String> {
        let v = value?.trim();
        if v.is_empty() {
            self.error(field, format!("{label} cannot be empty"));
            return None;
        }
        self.bounded(field, label, v, max)
    }

    fn bounded(&mut self, field: &str, label: &str, v: &str, max: Option<usize>) -> Option<String> {
        match max {
            Some(max) if v.chars().count() > max => {
                self.error(field, format!("{label} must be between 1 and {max} characters"));
                None
            }
            _ => Some(v.to_string()),
        }
    }

    /// An explicitly supplied slug: trimmed, already canonical.
    pub fn slug(&mut self, value: Option<&str>) -> Option<String> {
        let v = value?.trim();
        if v.is_empty() || v.chars().count() > SLUG_MAX {
            self.error("slug", format!("Slug must be between 1 and {SLUG_MAX} characters"));
            return None;
        }
        if !is_valid_slug(v) {
            self.error(
                "slug",
                "Slug must contain only lowercase letters, numbers, and hyphens",
            );
            return None;
        }
        Some(v.to_string())
    }

    /// Optional SEO text with an upper bound. Blank clears the field.
    pub fn seo_text(
        &mut self,
        field: &str,
        label: &str,
        value: Option<&str>,
        max: usize,
    ) -> Option<Option<String>> {
        let v = value?.trim();
        if v.chars().count() > max {
            self.error(field, format!("{label} cannot exceed {max} characters"));
            return None;
        }
        Some((!v.is_empty()).then(|| v.to_string()))
    }

    /// Trim and lower-case every keyword, rejecting empty or over-long ones.
    pub fn keywords(&mut self, value: Option<Vec<String>>) -> Option<Vec<String>> {
        let raw = value?;
        let mut out = Vec::with_capacity(raw.len());
        for keyword in raw {
            let keyword = keyword.trim().to_lowercase();
            let len = keyword.chars().count();
            if len == 0 || len > KEYWORD_MAX {
                self.error(
                    "keywords",
                    format!("Each keyword must be between 1 and {KEYWORD_MAX} characters"),
                );
                return None;
            }
            out.push(keyword);
        }
        Some(out)
    }

    pub fn email(&mut self, field: &str, value: Option<&str>) -> Option<String> {
        let email = normalize_email(value.unwrap_or_default());
        if is_valid_email(&email) {
            Some(email)
        } else {
            self.error(field, "Please enter a valid email");
            None
        }
    }

    pub fn password(&mut self, field: &str, label: &str, value: Option<&str>) -> Option<String> {
        match value {
            Some(v) if v.chars().count() >= PASSWORD_MIN => Some(v.to_string()),
            _ => {
                self.error(field, format!("{label} must be at least {PASSWORD_MIN} characters"));
                None
            }
        }
    }

    pub fn name(&mut self, value: Option<&str>, required: bool) -> Option<String> {
        let Some(v) = value.map(str::trim) else {
            if required {
                self.error("name", "Name is required");
            }
            return None;
        };
        if v.is_empty() && required {
            self.error("name", "Name is required");
            return None;
        }
        if v.chars().count() < NAME_MIN {
            self.error("name", format!("Name must be at least {NAME_MIN} characters"));
            return None;
        }
        Some(v.to_string())
    }

    /// ISO-8601 date or date-time. A bare date means midnight UTC.
    pub fn date(&mut self, field: &str, label: &str, value: Option<&str>) -> Option<DateTime<Utc>> {
        let v = value?.trim();
        match parse_date(v) {
            Some(date) => Some(date),
            None => {
                self.error(field, format!("{label} must be a valid date"));
                None
            }
        }
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.errors))
        }
    }

    /// Finish, merging the field errors of a result checked elsewhere.
    pub fn finish_with<T>(mut self, result: Result<T, AppError>) -> Result<T, AppError> {
        match result {
            Ok(value) => self.finish().map(|()| value),
            Err(AppError::Validation(errors)) => {
                self.errors.extend(errors);
                Err(AppError::Validation(self.errors))
            }
            Err(other) => Err(other),
        }
    }
}

/// Parse an optional enumerated value, recording `message` when it is not
/// one of the accepted names.
pub fn choice<T>(
    v: &mut Validator,
    field: &str,
    message: &str,
    value: Option<&str>,
    required: bool,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    match value.map(str::trim).filter(|s| !s.is_empty()) {
        None => {
            if required {
                v.error(field, message);
            }
            None
        }
        Some(raw) => {
            let parsed = parse(raw);
            if parsed.is_none() {
                v.error(field, message);
            }
            parsed
        }
    }
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_valid_ga_id(id: &str) -> bool {
    GA_ID_RE.is_match(id)
}

pub fn is_valid_pixel_code(code: &str) -> bool {
    !code.is_empty() && code.chars().all(|c| c.is_ascii_digit())
}

/// Absolute URL with a scheme, as accepted for guide links.
pub fn is_absolute_url(value: &str) -> bool {
    url::Url::parse(value).is_ok()
}

pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(v: Validator) -> Vec<String> {
        match v.finish() {
            Ok(()) => vec![],
            Err(AppError::Validation(errors)) => errors.into_iter().map(|e| e.field).collect(),
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_email_rules() {
        assert!(is_valid_email("admin@example.com"));
        assert!(is_valid_email("first.last@sub.example.org"));
        assert!(!is_valid_email("admin@example"));
        assert!(!is_valid_email("not an email"));
        assert_eq!(normalize_email("  Admin@Example.COM "), "admin@example.com");
    }

    #[test]
    fn test_ga_and_pixel_rules() {
        assert!(is_valid_ga_id("GA-1234-1"));
        assert!(is_valid_ga_id("G-ABCDEF1234"));
        assert!(!is_valid_ga_id("G-abc"));
        assert!(!is_valid_ga_id("UA-1234-1"));
        assert!(is_valid_pixel_code("123456789"));
        assert!(!is_valid_pixel_code("12ab"));
        assert!(!is_valid_pixel_code(""));
    }

    #[test]
    fn test_guide_link_url() {
        assert!(is_absolute_url("https://docs.example.com/setup"));
        assert!(!is_absolute_url("see the docs"));
        assert!(!is_absolute_url("/relative/path"));
    }

    #[test]
    fn test_required_text_collects_all_errors() {
        let mut v = Validator::new();
        assert!(v.required_text("title", "Title", Some("   "), Some(TITLE_MAX)).is_none());
        assert!(v.required_text("author", "Author", None, None).is_none());
        let long = "x".repeat(201);
        assert!(v.required_text("content", "Content", Some(&long), Some(TITLE_MAX)).is_none());
        assert_eq!(fields(v), vec!["title", "author", "content"]);
    }

    #[test]
    fn test_required_text_trims() {
        let mut v = Validator::new();
        let title = v.required_text("title", "Title", Some("  Hello  "), Some(TITLE_MAX));
        assert_eq!(title.as_deref(), Some("Hello"));
        assert!(v.errors.is_empty());
    }

    #[test]
    fn test_keywords_are_normalized() {
        let mut v = Validator::new();
        let kw = v.keywords(Some(vec![" Rust ".into(), "WEB".into()]));
        assert_eq!(kw, Some(vec!["rust".to_string(), "web".to_string()]));

        let mut v = Validator::new();
        assert!(v.keywords(Some(vec!["ok".into(), " ".into()])).is_none());
        assert_eq!(fields(v), vec!["keywords"]);
    }

    #[test]
    fn test_seo_limits() {
        let mut v = Validator::new();
        assert_eq!(
            v.seo_text("metaTitle", "Meta title", Some(" Title "), META_TITLE_MAX),
            Some(Some("Title".to_string()))
        );
        assert_eq!(
            v.seo_text("metaTitle", "Meta title", Some(""), META_TITLE_MAX),
            Some(None)
        );
        let long = "d".repeat(161);
        assert!(v
            .seo_text("metaDescription", "Meta description", Some(&long), META_DESCRIPTION_MAX)
            .is_none());
        assert_eq!(fields(v), vec!["metaDescription"]);
    }

    #[test]
    fn test_slug_rules() {
        let mut v = Validator::new();
        assert_eq!(v.slug(Some("about-us-2")).as_deref(), Some("about-us-2"));
        assert!(v.slug(Some("About Us")).is_none());
        assert!(v.slug(None).is_none());
        assert_eq!(fields(v), vec!["slug"]);
    }

    #[test]
    fn test_name_and_password() {
        let mut v = Validator::new();
        assert!(v.name(None, false).is_none());
        assert!(v.name(None, true).is_none());
        assert!(v.name(Some("A"), false).is_none());
        assert_eq!(v.name(Some(" Ada "), true).as_deref(), Some("Ada"));
        assert!(v.password("password", "Password", Some("12345")).is_none());
        assert_eq!(fields(v), vec!["name", "name", "password"]);
    }

    #[test]
    fn test_finish_with_merges_errors() {
        let mut v = Validator::new();
        v.error("type", "bad type");
        let merged = v.finish_with::<()>(Err(AppError::validation("page", "bad page")));
        match merged {
            Err(AppError::Validation(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("Expected validation error, got: {:?}", other),
        }

        assert_eq!(Validator::new().finish_with(Ok(7)).unwrap(), 7);
    }

    #[test]
    fn test_choice() {
        let parse = |s: &str| (s == "blog").then_some(1);
        let mut v = Validator::new();
        assert_eq!(choice(&mut v, "type", "bad", Some(" blog "), true, parse), Some(1));
        assert_eq!(choice(&mut v, "type", "bad", None, false, parse), None);
        assert!(v.errors.is_empty());
        assert_eq!(choice(&mut v, "type", "bad", None, true, parse), None);
        assert_eq!(choice(&mut v, "type", "bad", Some("poem"), false, parse), None);
        assert_eq!(fields(v), vec!["type", "type"]);
    }

    #[test]
    fn test_parse_date_formats() {
        assert!(parse_date("2024-05-01T10:30:00Z").is_some());
        assert!(parse_date("2024-05-01T10:30:00.123+02:00").is_some());
        assert!(parse_date("2024-05-01T10:30:00").is_some());
        let day = parse_date("2024-05-01").unwrap();
        assert_eq!(day.to_rfc3339(), "2024-05-01T00:00:00+00:00");
        assert!(parse_date("yesterday").is_none());
    }
}
