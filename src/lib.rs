//! # Folio
//!
//! The syndication side of a personal portfolio and devlog site. Blog posts
//! live as markdown files with TOML front matter, and Folio turns them into
//! an RSS 2.0 feed. Page rendering belongs to the site framework; this crate
//! only concerns itself with what feed readers see.
//!
//! # Pipeline
//!
//! ```text
//! 1. Load      content/config.toml  →  SiteConfig        (stock defaults + overrides)
//! 2. Read      content/blog/**/*.md →  Vec<ContentEntry> (front matter → sum type)
//! 3. Build     entries + FeedConfig →  FeedDocument      (filter, sort, project)
//! 4. Render    FeedDocument         →  dist/rss.xml      (RSS 2.0)
//! ```
//!
//! Step 3 is a pure function: the build mode and the resolved site URL are
//! passed in, never read from the process environment. That keeps the feed
//! reproducible and lets tests drive it with synthetic configs.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `config.toml` loading, validation, and site URL resolution per build mode |
//! | [`content`] | Walks `blog/`, parses front matter, validates entries |
//! | [`feed`] | Draft filtering, newest-first ordering, local/external projection |
//! | [`render`] | RSS 2.0 encoding via the `rss` crate, validation, file output |
//! | [`types`] | `ContentEntry`, `EntryKind`, `BuildMode` shared across stages |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Local vs External as a Sum Type
//!
//! A post is either hosted here (needs a slug and a description) or lives on
//! another publication (needs a URL). [`types::EntryKind`] encodes that
//! directly, so the feed builder never has to guess from optional fields.
//! The `external` front matter flag alone chooses the variant.
//!
//! ## Drafts
//!
//! Drafts are hidden from production builds and kept in development builds,
//! so an unpublished post can be previewed in a local feed reader before it
//! goes live.
//!
//! ## Fail Fast
//!
//! A malformed post or site URL aborts the build with an error naming the
//! file or entry. A broken record never silently disappears from the feed.

pub mod config;
pub mod content;
pub mod feed;
pub mod output;
pub mod render;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
