//! Shared test utilities for the folio test suite.
//!
//! Provides entry builders for synthetic feeds, a fixture-site copier, and
//! lookup helpers that panic with a readable message on a miss.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let entries = vec![
//!     local("Post A", "2024-01-01", "post-a"),
//!     draft(external("Elsewhere", "2024-02-01", "https://other.com/x")),
//! ];
//! let doc = build_feed(&entries, &feed_config(BASE), BuildMode::Production).unwrap();
//! assert_eq!(item_titles(&doc), vec!["Post A"]);
//! ```

use chrono::{DateTime, Utc};
use std::path::Path;
use tempfile::TempDir;

use crate::feed::{FeedConfig, FeedDocument, FeedItem};
use crate::types::{ContentEntry, EntryKind};

pub const BASE: &str = "https://example.com";

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Write a blog post file under `<root>/blog/`, creating directories.
pub fn write_post(root: &Path, rel_path: &str, content: &str) {
    let path = root.join("blog").join(rel_path);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

// =========================================================================
// Entry builders
// =========================================================================

/// Parse a front-matter style date. Panics on bad input.
pub fn date(s: &str) -> DateTime<Utc> {
    crate::content::parse_date(s).unwrap_or_else(|| panic!("bad test date {s:?}"))
}

/// A published local entry whose description is `"d"`.
pub fn local(title: &str, when: &str, slug: &str) -> ContentEntry {
    ContentEntry {
        title: title.to_string(),
        date: date(when),
        draft: false,
        kind: EntryKind::Local {
            slug: slug.to_string(),
            description: "d".to_string(),
        },
    }
}

/// A published external entry.
pub fn external(title: &str, when: &str, url: &str) -> ContentEntry {
    ContentEntry {
        title: title.to_string(),
        date: date(when),
        draft: false,
        kind: EntryKind::External {
            url: url.to_string(),
        },
    }
}

/// Mark an entry as a draft.
pub fn draft(mut entry: ContentEntry) -> ContentEntry {
    entry.draft = true;
    entry
}

pub fn feed_config(base_url: &str) -> FeedConfig {
    FeedConfig {
        title: "Test Site".to_string(),
        description: "Test description".to_string(),
        base_url: base_url.to_string(),
        blog_path_prefix: "/blog".to_string(),
    }
}

// =========================================================================
// Lookups
// =========================================================================

/// All item titles in feed order.
pub fn item_titles(doc: &FeedDocument) -> Vec<&str> {
    doc.items.iter().map(FeedItem::title).collect()
}

/// Find an item by title. Panics if not found.
pub fn find_item<'a>(doc: &'a FeedDocument, title: &str) -> &'a FeedItem {
    doc.items
        .iter()
        .find(|i| i.title() == title)
        .unwrap_or_else(|| {
            let titles = item_titles(doc);
            panic!("item '{title}' not found. Available: {titles:?}")
        })
}

/// Find a loaded entry by title. Panics if not found.
pub fn find_entry<'a>(entries: &'a [ContentEntry], title: &str) -> &'a ContentEntry {
    entries
        .iter()
        .find(|e| e.title == title)
        .unwrap_or_else(|| {
            let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
            panic!("entry '{title}' not found. Available: {titles:?}")
        })
}
