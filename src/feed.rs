//! Feed document construction.
//!
//! Turns the blog's content entries into the logical syndication document
//! that [`crate::render`] later renders as XML. This module is pure: no I/O, no
//! global state. Same entries, config, and mode always yield the same document.
//!
//! ## Pipeline
//!
//! ```text
//! entries ─▶ filter drafts ─▶ normalize base URL ─▶ project ─▶ sort newest first ─▶ FeedDocument
//! ```
//!
//! ## Projection
//!
//! Each surviving entry becomes exactly one [`FeedItem`], chosen by its
//! [`EntryKind`] and never by the shape of any URL:
//!
//! | Entry kind | Item | Link |
//! |------------|------|------|
//! | `Local { slug, description }` | [`FeedItem::Local`] | `base_url + blog_path_prefix + "/" + slug` |
//! | `External { url }` | [`FeedItem::External`] | `url`, verbatim |
//!
//! External items carry no description.
//!
//! ## Ordering
//!
//! Items are sorted by publication date, newest first. Entries sharing a
//! timestamp fall back to title (ascending), then the item link. The sort is
//! stable, so the output order is fully determined by the input values.
//!
//! ## Failure
//!
//! A malformed entry or base URL aborts the whole build. No partial
//! document is ever returned, and a corrupt record never silently drops out
//! of the feed.

use crate::types::{BuildMode, ContentEntry, EntryKind};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug, PartialEq)]
pub enum FeedError {
    #[error("Malformed entry {entry}: {reason}")]
    MalformedEntry { entry: String, reason: String },
    #[error("Malformed base URL {url:?}: {reason}")]
    MalformedBaseUrl { url: String, reason: String },
}

/// Feed-level settings, already resolved for the current build mode.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedConfig {
    pub title: String,
    pub description: String,
    /// Absolute origin such as `https://example.com`. Trailing slashes are
    /// tolerated and stripped.
    pub base_url: String,
    /// Path segment between the origin and the slug, e.g. `/blog`.
    pub blog_path_prefix: String,
}

/// The logical feed handed to the serializer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedDocument {
    pub title: String,
    pub description: String,
    /// Normalized site origin (no trailing slash).
    pub link: String,
    pub items: Vec<FeedItem>,
}

/// One item in the feed.
///
/// Serialized untagged, so the external variant simply has no
/// `description` key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeedItem {
    #[serde(rename_all = "camelCase")]
    Local {
        title: String,
        pub_date: DateTime<Utc>,
        description: String,
        link: String,
    },
    #[serde(rename_all = "camelCase")]
    External {
        title: String,
        pub_date: DateTime<Utc>,
        link: String,
    },
}

impl FeedItem {
    pub fn title(&self) -> &str {
        match self {
            FeedItem::Local { title, .. } | FeedItem::External { title, .. } => title,
        }
    }

    pub fn pub_date(&self) -> DateTime<Utc> {
        match self {
            FeedItem::Local { pub_date, .. } | FeedItem::External { pub_date, .. } => *pub_date,
        }
    }

    pub fn link(&self) -> &str {
        match self {
            FeedItem::Local { link, .. } | FeedItem::External { link, .. } => link,
        }
    }

    /// `None` for external items.
    pub fn description(&self) -> Option<&str> {
        match self {
            FeedItem::Local { description, .. } => Some(description),
            FeedItem::External { .. } => None,
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(self, FeedItem::External { .. })
    }
}

/// Build the feed document for `entries`.
///
/// Drafts are dropped only when `mode` is production. Everything else in
/// `entries` ends up in the document, newest first.
pub fn build_feed(
    entries: &[ContentEntry],
    config: &FeedConfig,
    mode: BuildMode,
) -> Result<FeedDocument, FeedError> {
    let visible: Vec<&ContentEntry> = entries.iter().filter(|e| is_visible(e, mode)).collect();

    let hidden = entries.len() - visible.len();
    if hidden > 0 {
        tracing::debug!(hidden, "skipping drafts in production build");
    }

    let base_url = normalize_base_url(&config.base_url)?;

    let mut items = visible
        .into_iter()
        .map(|entry| project(entry, &base_url, &config.blog_path_prefix))
        .collect::<Result<Vec<_>, _>>()?;
    items.sort_by(newest_first);

    Ok(FeedDocument {
        title: config.title.clone(),
        description: config.description.clone(),
        link: base_url,
        items,
    })
}

/// Whether `entry` appears in a feed built in `mode`. Drafts are hidden in
/// production only.
pub fn is_visible(entry: &ContentEntry, mode: BuildMode) -> bool {
    !(mode.is_production() && entry.draft)
}

fn newest_first(a: &FeedItem, b: &FeedItem) -> Ordering {
    b.pub_date()
        .cmp(&a.pub_date())
        .then_with(|| a.title().cmp(b.title()))
        .then_with(|| a.link().cmp(b.link()))
}

/// Strip trailing slashes and check that what remains is an absolute URL
/// with a host.
pub fn normalize_base_url(raw: &str) -> Result<String, FeedError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let malformed = |reason: String| FeedError::MalformedBaseUrl {
        url: raw.to_string(),
        reason,
    };

    let parsed = Url::parse(trimmed).map_err(|e| malformed(e.to_string()))?;
    if !parsed.has_host() {
        return Err(malformed("no host".into()));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(malformed("query and fragment are not allowed".into()));
    }
    Ok(trimmed.to_string())
}

fn project(
    entry: &ContentEntry,
    base_url: &str,
    blog_path_prefix: &str,
) -> Result<FeedItem, FeedError> {
    let malformed = |reason: &str| FeedError::MalformedEntry {
        entry: describe(entry),
        reason: reason.to_string(),
    };

    if entry.title.trim().is_empty() {
        return Err(malformed("title is empty"));
    }

    match &entry.kind {
        EntryKind::External { url } => {
            if !is_absolute_with_host(url) {
                return Err(malformed("url is not an absolute URL"));
            }
            Ok(FeedItem::External {
                title: entry.title.clone(),
                pub_date: entry.date,
                link: url.clone(),
            })
        }
        EntryKind::Local { slug, description } => {
            if slug.is_empty() {
                return Err(malformed("slug is empty"));
            }
            if slug.starts_with('/') || slug.ends_with('/') {
                return Err(malformed("slug must not start or end with '/'"));
            }
            if slug.chars().any(char::is_whitespace) {
                return Err(malformed("slug contains whitespace"));
            }
            if slug.contains(['?', '#']) {
                return Err(malformed("slug contains '?' or '#'"));
            }
            let link = format!("{base_url}{blog_path_prefix}/{slug}");
            if !is_absolute_with_host(&link) {
                return Err(malformed("post link is not a valid URL"));
            }
            Ok(FeedItem::Local {
                title: entry.title.clone(),
                pub_date: entry.date,
                description: description.clone(),
                link,
            })
        }
    }
}

fn is_absolute_with_host(candidate: &str) -> bool {
    Url::parse(candidate).is_ok_and(|u| u.has_host())
}

/// `"Title" (slug)`, or `<untitled> (slug)` when the title is blank.
fn describe(entry: &ContentEntry) -> String {
    let title = entry.title.trim();
    if title.is_empty() {
        format!("<untitled> ({})", entry.locator())
    } else {
        format!("{title:?} ({})", entry.locator())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    // =========================================================================
    // Scenarios
    // =========================================================================

    #[test]
    fn local_entry_link_joins_base_prefix_and_slug() {
        let entries = vec![local("Post A", "2024-01-01", "post-a")];
        let config = feed_config("https://example.com/");

        let doc = build_feed(&entries, &config, BuildMode::Production).unwrap();

        assert_eq!(doc.items.len(), 1);
        assert_eq!(doc.items[0].link(), "https://example.com/blog/post-a");
        assert_eq!(doc.items[0].description(), Some("d"));
    }

    #[test]
    fn draft_hidden_in_production() {
        let entries = vec![draft(local("Draft", "2024-02-01", "draft"))];
        let doc = build_feed(&entries, &feed_config(BASE), BuildMode::Production).unwrap();
        assert!(doc.items.is_empty());
    }

    #[test]
    fn draft_visible_in_development() {
        let entries = vec![draft(local("Draft", "2024-02-01", "draft"))];
        let doc = build_feed(&entries, &feed_config(BASE), BuildMode::Development).unwrap();
        assert_eq!(item_titles(&doc), vec!["Draft"]);
    }

    #[test]
    fn external_entry_keeps_url_and_drops_description() {
        let entries = vec![external("Ext", "2024-03-01", "https://other.com/x")];
        let doc = build_feed(&entries, &feed_config(BASE), BuildMode::Production).unwrap();

        let item = &doc.items[0];
        assert!(item.is_external());
        assert_eq!(item.title(), "Ext");
        assert_eq!(item.pub_date(), date("2024-03-01"));
        assert_eq!(item.link(), "https://other.com/x");
        assert_eq!(item.description(), None);
    }

    #[test]
    fn newest_entry_comes_first() {
        let entries = vec![
            local("Older", "2024-01-01", "older"),
            local("Newer", "2024-05-01", "newer"),
        ];
        let doc = build_feed(&entries, &feed_config(BASE), BuildMode::Production).unwrap();
        assert_eq!(item_titles(&doc), vec!["Newer", "Older"]);
    }

    // =========================================================================
    // Filtering
    // =========================================================================

    #[test]
    fn only_production_drafts_are_removed() {
        let entries = vec![
            local("A", "2024-01-01", "a"),
            draft(local("B", "2024-01-02", "b")),
            external("C", "2024-01-03", "https://other.com/c"),
            draft(external("D", "2024-01-04", "https://other.com/d")),
        ];

        let prod = build_feed(&entries, &feed_config(BASE), BuildMode::Production).unwrap();
        let dev = build_feed(&entries, &feed_config(BASE), BuildMode::Development).unwrap();

        assert_eq!(prod.items.len(), 2);
        assert_eq!(item_titles(&prod), vec!["C", "A"]);
        assert_eq!(dev.items.len(), 4);
    }

    #[test]
    fn empty_input_yields_empty_feed() {
        let doc = build_feed(&[], &feed_config(BASE), BuildMode::Production).unwrap();
        assert!(doc.items.is_empty());
        assert_eq!(doc.link, "https://example.com");
    }

    // =========================================================================
    // Ordering
    // =========================================================================

    #[test]
    fn dates_are_non_increasing() {
        let entries = vec![
            local("One", "2023-06-01", "one"),
            external("Two", "2024-02-10", "https://other.com/two"),
            local("Three", "2022-12-31", "three"),
            local("Four", "2024-02-09T23:59:59Z", "four"),
        ];
        let doc = build_feed(&entries, &feed_config(BASE), BuildMode::Production).unwrap();

        let dates: Vec<_> = doc.items.iter().map(FeedItem::pub_date).collect();
        assert!(dates.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(item_titles(&doc), vec!["Two", "Four", "One", "Three"]);
    }

    #[test]
    fn same_date_falls_back_to_title() {
        let entries = vec![
            local("Zebra", "2024-01-01", "zebra"),
            local("Apple", "2024-01-01", "apple"),
            external("Mango", "2024-01-01", "https://other.com/mango"),
        ];
        let doc = build_feed(&entries, &feed_config(BASE), BuildMode::Production).unwrap();
        assert_eq!(item_titles(&doc), vec!["Apple", "Mango", "Zebra"]);
    }

    #[test]
    fn same_date_and_title_falls_back_to_link() {
        let entries = vec![
            local("Notes", "2024-01-01", "notes-b"),
            local("Notes", "2024-01-01", "notes-a"),
        ];
        let doc = build_feed(&entries, &feed_config(BASE), BuildMode::Production).unwrap();
        let links: Vec<&str> = doc.items.iter().map(FeedItem::link).collect();
        assert_eq!(
            links,
            vec![
                "https://example.com/blog/notes-a",
                "https://example.com/blog/notes-b"
            ]
        );
    }

    #[test]
    fn same_date_and_title_orders_local_and_external_by_link() {
        let entries = vec![
            local("Same", "2024-01-01", "a"),
            external("Same", "2024-01-01", "https://b.com/x"),
        ];
        let doc = build_feed(&entries, &feed_config(BASE), BuildMode::Production).unwrap();
        let links: Vec<&str> = doc.items.iter().map(FeedItem::link).collect();
        assert_eq!(links, vec!["https://b.com/x", "https://example.com/blog/a"]);
        assert!(find_item(&doc, "Same").is_external());
    }

    // =========================================================================
    // Base URL normalization
    // =========================================================================

    #[test]
    fn local_links_never_double_slash() {
        for base in [
            "https://example.com",
            "https://example.com/",
            "https://example.com///",
        ] {
            let entries = vec![local("Post", "2024-01-01", "post")];
            let doc = build_feed(&entries, &feed_config(base), BuildMode::Production).unwrap();
            let link = doc.items[0].link();
            assert!(link.starts_with("https://example.com"));
            assert!(!link["https://".len()..].contains("//"), "{link}");
            assert_eq!(doc.link, "https://example.com");
        }
    }

    #[test]
    fn base_url_without_scheme_is_rejected() {
        let entries = vec![local("Post", "2024-01-01", "post")];
        let result = build_feed(&entries, &feed_config("example.com"), BuildMode::Production);
        assert!(matches!(result, Err(FeedError::MalformedBaseUrl { .. })));
    }

    #[test]
    fn base_url_without_host_is_rejected() {
        assert!(matches!(
            normalize_base_url("mailto:someone@example.com"),
            Err(FeedError::MalformedBaseUrl { .. })
        ));
        assert!(matches!(
            normalize_base_url("https://"),
            Err(FeedError::MalformedBaseUrl { .. })
        ));
    }

    #[test]
    fn base_url_rejected_even_with_no_entries() {
        let result = build_feed(&[], &feed_config("not a url"), BuildMode::Production);
        assert!(matches!(result, Err(FeedError::MalformedBaseUrl { .. })));
    }

    #[test]
    fn base_url_with_port_is_kept() {
        assert_eq!(
            normalize_base_url("http://localhost:3000/").unwrap(),
            "http://localhost:3000"
        );
    }

    // =========================================================================
    // Malformed entries
    // =========================================================================

    #[test]
    fn empty_slug_is_malformed() {
        let entries = vec![local("No Slug", "2024-01-01", "")];
        let err = build_feed(&entries, &feed_config(BASE), BuildMode::Production).unwrap_err();
        match err {
            FeedError::MalformedEntry { entry, reason } => {
                assert!(entry.contains("No Slug"));
                assert!(reason.contains("slug"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn slug_with_slashes_at_edges_is_malformed() {
        let entries = vec![local("Post", "2024-01-01", "/post/")];
        let result = build_feed(&entries, &feed_config(BASE), BuildMode::Production);
        assert!(matches!(result, Err(FeedError::MalformedEntry { .. })));
    }

    #[test]
    fn slug_with_fragment_marker_is_malformed() {
        let entries = vec![local("C# Tips", "2024-01-01", "c#-tips")];
        let err = build_feed(&entries, &feed_config(BASE), BuildMode::Production).unwrap_err();
        assert_eq!(
            err,
            FeedError::MalformedEntry {
                entry: "\"C# Tips\" (c#-tips)".into(),
                reason: "slug contains '?' or '#'".into(),
            }
        );
    }

    #[test]
    fn slug_with_query_marker_is_malformed() {
        let entries = vec![local("What", "2024-01-01", "what?")];
        let result = build_feed(&entries, &feed_config(BASE), BuildMode::Production);
        assert!(matches!(result, Err(FeedError::MalformedEntry { .. })));
    }

    #[test]
    fn nested_slug_is_allowed() {
        let entries = vec![local("Nested", "2024-01-01", "2024/nested")];
        let doc = build_feed(&entries, &feed_config(BASE), BuildMode::Production).unwrap();
        assert_eq!(doc.items[0].link(), "https://example.com/blog/2024/nested");
    }

    #[test]
    fn relative_external_url_is_malformed() {
        let entries = vec![external("Ext", "2024-01-01", "/not-absolute")];
        let err = build_feed(&entries, &feed_config(BASE), BuildMode::Production).unwrap_err();
        assert!(err.to_string().contains("Ext"));
    }

    #[test]
    fn blank_title_is_malformed() {
        let entries = vec![local("   ", "2024-01-01", "blank")];
        let err = build_feed(&entries, &feed_config(BASE), BuildMode::Production).unwrap_err();
        assert_eq!(
            err,
            FeedError::MalformedEntry {
                entry: "<untitled> (blank)".into(),
                reason: "title is empty".into(),
            }
        );
    }

    #[test]
    fn hidden_draft_is_not_validated() {
        let entries = vec![draft(local("Broken", "2024-01-01", ""))];
        let doc = build_feed(&entries, &feed_config(BASE), BuildMode::Production).unwrap();
        assert!(doc.items.is_empty());
    }

    // =========================================================================
    // Document shape
    // =========================================================================

    #[test]
    fn document_carries_config_metadata() {
        let doc = build_feed(&[], &feed_config(BASE), BuildMode::Production).unwrap();
        assert_eq!(doc.title, "Test Site");
        assert_eq!(doc.description, "Test description");
    }

    #[test]
    fn json_omits_description_for_external_items() {
        let entries = vec![
            local("Post A", "2024-01-01", "post-a"),
            external("Ext", "2024-03-01", "https://other.com/x"),
        ];
        let doc = build_feed(&entries, &feed_config(BASE), BuildMode::Production).unwrap();
        let json = serde_json::to_value(&doc).unwrap();

        let ext = &json["items"][0];
        assert_eq!(ext["title"], "Ext");
        assert_eq!(ext["link"], "https://other.com/x");
        assert!(ext.get("description").is_none());
        assert!(ext.get("pubDate").is_some());

        let local = &json["items"][1];
        assert_eq!(local["description"], "d");
    }

    #[test]
    fn identical_inputs_give_identical_documents() {
        let entries = vec![
            local("A", "2024-01-01", "a"),
            external("B", "2024-01-01", "https://other.com/b"),
            draft(local("C", "2024-02-01", "c")),
        ];
        let config = feed_config(BASE);
        let first = build_feed(&entries, &config, BuildMode::Production).unwrap();
        let second = build_feed(&entries, &config, BuildMode::Production).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
