//! Blog content loading.
//!
//! Reads every post under `<content root>/blog/` and turns its front matter
//! into a [`ContentEntry`]. Post bodies are not interpreted here; only the
//! front matter matters to the feed.
//!
//! ## Directory Structure
//!
//! ```text
//! content/
//! ├── config.toml
//! └── blog/
//!     ├── hello-world.md           # slug "hello-world"
//!     ├── 2024/
//!     │   └── rust-notes.md        # slug "2024/rust-notes"
//!     ├── kafka-deep-dive/
//!     │   └── index.md             # slug "kafka-deep-dive"
//!     └── _template.md             # leading underscore = ignored
//! ```
//!
//! ## Front Matter
//!
//! Posts start with a `+++`-delimited TOML block:
//!
//! ```toml
//! +++
//! title = "Hello World"
//! date = 2024-01-01
//! description = "First post"
//! draft = false
//! +++
//! ```
//!
//! A post published elsewhere sets `external = true` and a `url`:
//!
//! ```toml
//! +++
//! title = "Scaling consumers"
//! date = 2024-03-01
//! external = true
//! url = "https://medium.com/@someone/scaling-consumers"
//! +++
//! ```
//!
//! `slug` overrides the path-derived slug. Unknown keys are rejected.
//!
//! ## Validation
//!
//! - Every post needs a `title` and a `date`
//! - Local posts need a `description`; external posts need a `url`
//! - No two local posts may share a slug

use crate::types::{ContentEntry, EntryKind};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("No +++ front matter block in {0}")]
    MissingFrontMatter(PathBuf),
    #[error("Invalid front matter in {path}: {source}")]
    FrontMatter {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Malformed entry {path}: {reason}")]
    MalformedEntry { path: PathBuf, reason: EntryError },
    #[error("Duplicate slug {slug:?} in {first} and {second}")]
    DuplicateSlug {
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },
}

/// Why a front matter block could not become a [`ContentEntry`].
#[derive(Error, Debug, PartialEq)]
pub enum EntryError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("field `{0}` is blank")]
    BlankField(&'static str),
    #[error("unrecognized date {0:?} (expected YYYY-MM-DD or an RFC 3339 datetime)")]
    BadDate(String),
}

/// Front matter exactly as authored.
///
/// Everything is optional so that a missing field surfaces as an
/// [`EntryError`] naming the field, rather than a TOML type error.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawEntry {
    pub title: Option<String>,
    /// TOML date/datetime or a string holding one.
    pub date: Option<toml::Value>,
    pub description: Option<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub external: bool,
    pub url: Option<String>,
    pub slug: Option<String>,
}

impl ContentEntry {
    /// Validate raw front matter into an entry.
    ///
    /// `default_slug` is used for local posts whose front matter has no
    /// `slug`. The `external` flag alone decides the variant.
    pub fn from_raw(raw: RawEntry, default_slug: &str) -> Result<Self, EntryError> {
        let title = required(raw.title, "title")?;

        let date_value = raw.date.ok_or(EntryError::MissingField("date"))?;
        let date = date_from_value(&date_value)?;

        let kind = if raw.external {
            EntryKind::External {
                url: required(raw.url, "url")?,
            }
        } else {
            let slug = match raw.slug {
                Some(slug) => required(Some(slug), "slug")?,
                None if default_slug.is_empty() => return Err(EntryError::MissingField("slug")),
                None => default_slug.to_string(),
            };
            EntryKind::Local {
                slug,
                description: required(raw.description, "description")?,
            }
        };

        Ok(ContentEntry {
            title,
            date,
            draft: raw.draft,
            kind,
        })
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, EntryError> {
    match value {
        None => Err(EntryError::MissingField(field)),
        Some(v) if v.trim().is_empty() => Err(EntryError::BlankField(field)),
        Some(v) => Ok(v.trim().to_string()),
    }
}

fn date_from_value(value: &toml::Value) -> Result<DateTime<Utc>, EntryError> {
    let text = match value {
        toml::Value::Datetime(dt) => dt.to_string(),
        toml::Value::String(s) => s.clone(),
        other => return Err(EntryError::BadDate(other.to_string())),
    };
    parse_date(&text).ok_or(EntryError::BadDate(text))
}

/// Parse a publication date.
///
/// Accepts `YYYY-MM-DD` (midnight UTC), RFC 3339 with an offset, and
/// offset-less `YYYY-MM-DDTHH:MM:SS` (taken as UTC).
pub fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Split a `+++` front matter block from the body.
///
/// Returns `(front_matter, body)`, or `None` if the text does not open with
/// a `+++` line or the block is never closed.
pub fn split_front_matter(text: &str) -> Option<(&str, &str)> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let rest = text.strip_prefix("+++")?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "+++" {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// Parse one post file's text into an entry.
pub fn parse_entry(text: &str, default_slug: &str, path: &Path) -> Result<ContentEntry, ContentError> {
    let (front_matter, _body) =
        split_front_matter(text).ok_or_else(|| ContentError::MissingFrontMatter(path.to_path_buf()))?;

    let raw: RawEntry = toml::from_str(front_matter).map_err(|source| ContentError::FrontMatter {
        path: path.to_path_buf(),
        source,
    })?;

    ContentEntry::from_raw(raw, default_slug).map_err(|reason| ContentError::MalformedEntry {
        path: path.to_path_buf(),
        reason,
    })
}

/// Slug the site framework would give a post at `rel_path` (relative to the
/// blog directory).
///
/// Path segments are joined with `/` and run through `slugify`. The
/// extension is dropped, and so is a trailing `index` segment.
pub fn default_slug(rel_path: &Path) -> String {
    let without_ext = rel_path.with_extension("");
    let mut segments: Vec<String> = without_ext
        .components()
        .map(|c| slugify(&c.as_os_str().to_string_lossy()))
        .collect();

    if segments.len() > 1 && segments.last().is_some_and(|s| s == "index") {
        segments.pop();
    }
    segments.join("/")
}

/// Lowercase `segment`, turn each whitespace character into `-`, and drop
/// punctuation. Letters, digits, `-` and `_` are kept.
fn slugify(segment: &str) -> String {
    segment
        .trim()
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            c if c.is_whitespace() => Some('-'),
            c if c.is_alphanumeric() || c == '-' || c == '_' => Some(c),
            _ => None,
        })
        .collect()
}

const POST_EXTENSIONS: &[&str] = &["md", "mdx"];

fn is_post(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| POST_EXTENSIONS.iter().any(|ext| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Entries or directories with a leading underscore are skipped.
fn is_ignored(rel_path: &Path) -> bool {
    rel_path
        .components()
        .any(|c| c.as_os_str().to_string_lossy().starts_with('_'))
}

/// Load every blog post under `root/blog/`.
///
/// Files are read in sorted path order. A missing `blog/` directory is not
/// an error; it just means there is nothing to syndicate yet.
pub fn load_entries(root: &Path) -> Result<Vec<ContentEntry>, ContentError> {
    let blog_dir = root.join("blog");
    if !blog_dir.is_dir() {
        tracing::debug!(dir = %blog_dir.display(), "no blog directory");
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    let mut seen_slugs: BTreeMap<String, PathBuf> = BTreeMap::new();

    for dir_entry in WalkDir::new(&blog_dir).sort_by_file_name() {
        let dir_entry = dir_entry?;
        let path = dir_entry.path();
        if !dir_entry.file_type().is_file() || !is_post(path) {
            continue;
        }
        let rel_path = path.strip_prefix(&blog_dir).unwrap_or(path);
        if is_ignored(rel_path) {
            tracing::debug!(path = %path.display(), "ignoring underscore-prefixed post");
            continue;
        }

        let text = fs::read_to_string(path)?;
        let entry = parse_entry(&text, &default_slug(rel_path), path)?;
        tracing::debug!(path = %path.display(), title = %entry.title, "loaded post");

        if let EntryKind::Local { slug, .. } = &entry.kind {
            if let Some(first) = seen_slugs.get(slug) {
                return Err(ContentError::DuplicateSlug {
                    slug: slug.clone(),
                    first: first.clone(),
                    second: path.to_path_buf(),
                });
            }
            seen_slugs.insert(slug.clone(), path.to_path_buf());
        }

        entries.push(entry);
    }

    Ok(entries)
}
