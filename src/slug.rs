//! URL slug derivation and per-collection uniqueness.
//!
//! Content items and pages share one algorithm: derive a candidate from the
//! title (or take an explicit one), then append `-1`, `-2`, ... until the
//! owning collection reports the candidate as free.

use async_trait::async_trait;
use bson::oid::ObjectId;

use crate::error::AppError;

/// Characters deleted outright instead of becoming a separator.
const REMOVED_CHARS: &[char] = &['*', '+', '~', '.', '(', ')', '\'', '"', '!', ':', '@'];

/// Existence check against a single collection's slugs.
#[async_trait]
pub trait SlugLookup: Send + Sync {
    /// Returns `true` if a record other than `exclude_id` already uses `slug`.
    async fn slug_taken(&self, slug: &str, exclude_id: Option<ObjectId>) -> Result<bool, AppError>;
}

/// Convert text into a URL-safe slug.
///
/// The result contains only `[a-z0-9]` and single hyphens, with no leading
/// or trailing hyphen. It may be empty when the input has nothing usable.
pub fn slugify(text: &str) -> String {
    let mut out = SlugBuilder::with_capacity(text.len());

    for c in text.chars() {
        if REMOVED_CHARS.contains(&c) {
            continue;
        }
        if c == '&' {
            out.separator();
            out.push("and");
            out.separator();
            continue;
        }
        let lower = c.to_lowercase().next().unwrap_or(c);
        if lower.is_ascii_alphanumeric() {
            let mut buf = [0u8; 4];
            out.push(lower.encode_utf8(&mut buf));
        } else if let Some(folded) = fold_latin(lower) {
            out.push(folded);
        } else {
            out.separator();
        }
    }

    out.slug
}

/// Accumulates slug pieces, emitting a single hyphen for each run of
/// separators that falls between two pieces.
struct SlugBuilder {
    slug: String,
    pending_hyphen: bool,
}

impl SlugBuilder {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            slug: String::with_capacity(capacity),
            pending_hyphen: false,
        }
    }

    fn separator(&mut self) {
        // Leading separators are dropped
        self.pending_hyphen = !self.slug.is_empty();
    }

    fn push(&mut self, piece: &str) {
        if self.pending_hyphen {
            self.slug.push('-');
            self.pending_hyphen = false;
        }
        self.slug.push_str(piece);
    }
}

/// ASCII replacements for common Latin letters with diacritics.
fn fold_latin(c: char) -> Option<&'static str> {
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' => "a",
        'æ' => "ae",
        'ç' | 'č' | 'ć' => "c",
        'ď' | 'đ' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ě' | 'ę' => "e",
        'ğ' => "g",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'ı' => "i",
        'ł' | 'ľ' => "l",
        'ñ' | 'ń' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => "o",
        'œ' => "oe",
        'ř' => "r",
        'ś' | 'š' | 'ş' => "s",
        'ß' => "ss",
        'ť' | 'ţ' => "t",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' => "u",
        'ý' | 'ÿ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        'þ' => "th",
        'ð' => "d",
        _ => return None,
    };
    Some(folded)
}

/// Returns `true` if `slug` is already in canonical form.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Find a slug based on `base` that no other record in the collection uses.
///
/// If `base` is taken, tries `base-1`, `base-2`, etc. There is no upper bound:
/// each step only has to avoid the finitely many records that exist now.
pub async fn assign_unique_slug(
    base: &str,
    exclude_id: Option<ObjectId>,
    lookup: &dyn SlugLookup,
) -> Result<String, AppError> {
    if !lookup.slug_taken(base, exclude_id).await? {
        return Ok(base.to_string());
    }

    let mut counter: u64 = 1;
    loop {
        let candidate = format!("{base}-{counter}");
        if !lookup.slug_taken(&candidate, exclude_id).await? {
            tracing::debug!(base, slug = %candidate, "resolved slug collision");
            return Ok(candidate);
        }
        counter += 1;
    }
}

/// Pick the slug for a record being created.
///
/// An explicit slug is used as the base when supplied, otherwise the title
/// is slugified. Either way the result is de-duplicated within the
/// collection.
pub async fn resolve_slug(
    explicit: Option<&str>,
    title: &str,
    exclude_id: Option<ObjectId>,
    lookup: &dyn SlugLookup,
) -> Result<String, AppError> {
    let base = match explicit.map(str::trim).filter(|s| !s.is_empty()) {
        Some(slug) => slug.to_string(),
        None => slugify(title),
    };

    if base.is_empty() {
        return Err(AppError::validation(
            "slug",
            "Could not derive a slug from the title; please supply one",
        ));
    }

    assign_unique_slug(&base, exclude_id, lookup).await
}
