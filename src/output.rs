//! CLI output formatting for the feed pipeline.
//!
//! # Information-First Display
//!
//! Each feed item leads with its positional index and title. Link, date, and
//! description preview follow as indented context lines. External items are
//! marked so it is obvious which links leave the site.
//!
//! # Output Format
//!
//! ```text
//! Feed: Portfolio
//!     Link: https://example.dev
//!     Mode: production
//!
//! Items
//! 001 Scaling Kafka Consumers (external)
//!     Link: https://medium.com/@someone/scaling-kafka-consumers
//!     Date: 2024-03-01
//! 002 Hello, World
//!     Link: https://example.dev/blog/hello-world
//!     Date: 2024-01-01
//!     First post on the new site
//!
//! 2 items, 1 draft hidden
//! ```
//!
//! # Architecture
//!
//! `format_*` functions return `Vec<String>` and do no I/O, so they are unit
//! tested directly. `print_*` wrappers write the lines to stdout.

use crate::feed::{FeedDocument, FeedItem};
use crate::types::BuildMode;

// ============================================================================
// Display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{}...", head)
    }
}

fn mode_label(mode: BuildMode) -> &'static str {
    match mode {
        BuildMode::Development => "development",
        BuildMode::Production => "production",
    }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{} {}", n, one)
    } else {
        format!("{} {}", n, many)
    }
}

fn item_lines(index: usize, item: &FeedItem) -> Vec<String> {
    let marker = if item.is_external() { " (external)" } else { "" };
    let mut lines = vec![
        format!("{} {}{}", format_index(index), item.title(), marker),
        format!("{}Link: {}", indent(1), item.link()),
        format!("{}Date: {}", indent(1), item.pub_date().format("%Y-%m-%d")),
    ];
    if let Some(desc) = item.description() {
        let preview = truncate_desc(desc.trim(), 60);
        if !preview.is_empty() {
            lines.push(format!("{}{}", indent(1), preview));
        }
    }
    lines
}

// ============================================================================
// Feed output
// ============================================================================

/// Format a built feed: channel header, items in feed order, and a summary.
///
/// `hidden_drafts` is the number of drafts left out of this build.
pub fn format_feed_output(doc: &FeedDocument, mode: BuildMode, hidden_drafts: usize) -> Vec<String> {
    let mut lines = vec![
        format!("Feed: {}", doc.title),
        format!("{}Link: {}", indent(1), doc.link),
        format!("{}Mode: {}", indent(1), mode_label(mode)),
    ];

    if !doc.items.is_empty() {
        lines.push(String::new());
        lines.push("Items".to_string());
        for (i, item) in doc.items.iter().enumerate() {
            lines.extend(item_lines(i + 1, item));
        }
    }

    lines.push(String::new());
    let mut summary = plural(doc.items.len(), "item", "items");
    if hidden_drafts > 0 {
        summary.push_str(&format!(", {} hidden", plural(hidden_drafts, "draft", "drafts")));
    }
    lines.push(summary);

    lines
}

/// Print feed output to stdout.
pub fn print_feed_output(doc: &FeedDocument, mode: BuildMode, hidden_drafts: usize) {
    for line in format_feed_output(doc, mode, hidden_drafts) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
