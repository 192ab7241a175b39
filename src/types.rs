//! Shared types used across the feed pipeline.
//!
//! [`ContentEntry`] is what the content loader produces and the feed builder
//! consumes. [`BuildMode`] is threaded explicitly through config resolution and
//! feed filtering; nothing in the library reads it from the environment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which kind of build is running.
///
/// Production hides drafts and links against the live site URL. Development
/// keeps drafts visible for local preview and links against the dev server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    Development,
    Production,
}

impl BuildMode {
    pub fn is_production(self) -> bool {
        self == BuildMode::Production
    }
}

/// One authored blog post, local or published elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentEntry {
    pub title: String,
    /// Publication date, used for ordering and `pubDate`.
    pub date: DateTime<Utc>,
    /// Hidden from production builds when set.
    pub draft: bool,
    pub kind: EntryKind,
}

/// Where an entry lives. Each variant carries only the fields that make sense
/// for it, so a local post without a slug cannot be constructed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EntryKind {
    /// Hosted on this site under the blog path.
    Local { slug: String, description: String },
    /// Published on another site; `url` is the canonical link.
    External { url: String },
}

impl ContentEntry {
    /// Short identifier for error messages: the slug for local posts,
    /// the URL for external ones.
    pub fn locator(&self) -> &str {
        match &self.kind {
            EntryKind::Local { slug, .. } => slug,
            EntryKind::External { url } => url,
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(self.kind, EntryKind::External { .. })
    }
}
