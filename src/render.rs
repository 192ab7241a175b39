//! RSS 2.0 rendering.
//!
//! Maps a [`FeedDocument`] onto an `rss::Channel` and writes it out. All
//! XML encoding and escaping is left to the `rss` crate. The channel is
//! validated before it is returned, so a bad `pubDate` or link fails the
//! build instead of shipping a feed readers will reject.
//!
//! Each item gets a permalink `<guid>` equal to its link. Local items carry
//! a `<description>`; external items do not.

use crate::config::FeedSettings;
use crate::feed::{FeedDocument, FeedItem};
use rss::validation::Validate;
use rss::{Channel, ChannelBuilder, GuidBuilder, Item, ItemBuilder};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RSS validation failed: {0}")]
    Validation(String),
}

fn to_rss_item(item: &FeedItem) -> Item {
    let link = item.link().to_string();
    ItemBuilder::default()
        .title(item.title().to_string())
        .link(Some(link.clone()))
        .guid(GuidBuilder::default().permalink(true).value(link).build())
        .pub_date(item.pub_date().to_rfc2822())
        .description(item.description().map(str::to_string))
        .build()
}

/// Build the validated channel for `doc`.
pub fn to_channel(doc: &FeedDocument, language: Option<&str>) -> Result<Channel, RenderError> {
    let items: Vec<Item> = doc.items.iter().map(to_rss_item).collect();

    let channel = ChannelBuilder::default()
        .title(&doc.title)
        .link(&doc.link)
        .description(&doc.description)
        .language(language.map(str::to_string))
        .items(items)
        .build();

    channel
        .validate()
        .map_err(|e| RenderError::Validation(e.to_string()))?;
    Ok(channel)
}

/// Render `doc` as an RSS 2.0 XML string.
pub fn render_rss(doc: &FeedDocument, language: Option<&str>) -> Result<String, RenderError> {
    Ok(to_channel(doc, language)?.to_string())
}

/// Render `doc` and write it to `output_dir/<settings.file>`.
///
/// Returns the path written. Parent directories are created as needed.
pub fn write_feed(
    doc: &FeedDocument,
    settings: &FeedSettings,
    output_dir: &Path,
) -> Result<PathBuf, RenderError> {
    let xml = render_rss(doc, settings.language.as_deref())?;
    let feed_path = output_dir.join(&settings.file);

    if let Some(parent) = feed_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&feed_path, xml)?;

    tracing::info!(path = %feed_path.display(), items = doc.items.len(), "wrote feed");
    Ok(feed_path)
}
