//! Site configuration module.
//!
//! Handles loading, validating, and resolving `config.toml`. Stock defaults
//! are the base layer; the user's `config.toml` in the content root overrides
//! any subset of keys.
//!
//! ## Config File Location
//!
//! ```text
//! content/
//! ├── config.toml              # Site config (optional)
//! └── blog/
//!     └── ...
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! title = "Portfolio"
//! description = "Personal portfolio site and devlogs"
//! author = ""
//! live_url = ""                       # Used for production builds
//! dev_url = "http://localhost:3000"   # Used for development builds
//!
//! [nav.blog]
//! name = "Blog"
//! path = "/blog"                      # Prefix for local post links
//!
//! [feed]
//! file = "rss.xml"                    # Output path, relative to the output dir
//! # language = "en"
//! ```
//!
//! ## Site URL Resolution
//!
//! The feed links against a different origin depending on the build mode.
//! Production uses `site.live_url`, falling back to `site.dev_url` when no
//! live URL is configured. Development always uses `site.dev_url`. Only the
//! origin (scheme, host, port) of the chosen URL is kept.
//!
//! Unknown keys are rejected to catch typos early.

use crate::feed::FeedConfig;
use crate::types::BuildMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path};
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Invalid site URL {url:?}: {reason}")]
    SiteUrl { url: String, reason: String },
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site identity and URLs.
    pub site: SiteInfo,
    /// Navigation entries the feed depends on.
    pub nav: NavConfig,
    /// Feed output settings.
    pub feed: FeedSettings,
}

/// Site identity and the URLs it is served from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteInfo {
    /// Feed and site title.
    pub title: String,
    /// Feed and site description.
    pub description: String,
    /// Author display name.
    pub author: String,
    /// Public URL of the deployed site. Empty means not deployed yet.
    pub live_url: String,
    /// URL of the local development server.
    pub dev_url: String,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            title: "Portfolio".to_string(),
            description: "Personal portfolio site and devlogs".to_string(),
            author: String::new(),
            live_url: String::new(),
            dev_url: "http://localhost:3000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavConfig {
    pub blog: NavLink,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            blog: NavLink {
                name: "Blog".to_string(),
                path: "/blog".to_string(),
            },
        }
    }
}

/// A navigation entry: display name plus site-relative path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NavLink {
    pub name: String,
    pub path: String,
}

/// Feed output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedSettings {
    /// Output file, relative to the output directory.
    pub file: String,
    /// Optional `<language>` for the channel, e.g. `"en"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            file: "rss.xml".to_string(),
            language: None,
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site.title.trim().is_empty() {
            return Err(ConfigError::Validation("site.title must not be empty".into()));
        }
        if self.site.dev_url.trim().is_empty() {
            return Err(ConfigError::Validation("site.dev_url must not be empty".into()));
        }
        let blog_path = &self.nav.blog.path;
        if !blog_path.is_empty() && (!blog_path.starts_with('/') || blog_path.ends_with('/')) {
            return Err(ConfigError::Validation(
                "nav.blog.path must start with '/' and must not end with '/'".into(),
            ));
        }
        if self.feed.file.trim().is_empty() {
            return Err(ConfigError::Validation("feed.file must not be empty".into()));
        }
        let escapes = Path::new(&self.feed.file)
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(ConfigError::Validation(
                "feed.file must be a relative path inside the output directory".into(),
            ));
        }
        Ok(())
    }

    /// Resolve the site origin for `mode`.
    ///
    /// Production prefers `live_url`; an empty live URL falls back to
    /// `dev_url` so an undeployed site still builds.
    pub fn site_url(&self, mode: BuildMode) -> Result<String, ConfigError> {
        let live = self.site.live_url.trim();
        let raw = match mode {
            BuildMode::Production if !live.is_empty() => live,
            BuildMode::Production => {
                tracing::warn!(
                    dev_url = %self.site.dev_url,
                    "site.live_url is not set; production feed links use the dev URL"
                );
                self.site.dev_url.trim()
            }
            BuildMode::Development => self.site.dev_url.trim(),
        };
        origin_of(raw)
    }

    /// Feed settings for the builder, with the site URL resolved for `mode`.
    pub fn feed_config(&self, mode: BuildMode) -> Result<FeedConfig, ConfigError> {
        Ok(FeedConfig {
            title: self.site.title.clone(),
            description: self.site.description.clone(),
            base_url: self.site_url(mode)?,
            blog_path_prefix: self.nav.blog.path.clone(),
        })
    }
}

/// Reduce a URL to its origin: `https://example.com/a/b?c` → `https://example.com`.
pub fn origin_of(raw: &str) -> Result<String, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::SiteUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    let origin = url.origin();
    if !origin.is_tuple() {
        return Err(ConfigError::SiteUrl {
            url: raw.to_string(),
            reason: "URL has no host".into(),
        });
    }
    Ok(origin.ascii_serialization())
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    if overlay.is_none() {
        tracing::debug!(root = %root.display(), "no config.toml, using stock defaults");
    }
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Folio Configuration
# ===================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file at the content root (content/config.toml).
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Site identity
# ---------------------------------------------------------------------------
[site]
# Channel title and description in the generated feed.
title = "Portfolio"
description = "Personal portfolio site and devlogs"

# Author display name.
author = ""

# Public URL of the deployed site, used by production builds.
# Leave empty until the site is deployed; production builds then fall back
# to dev_url. Only the origin (scheme + host + port) is used.
live_url = ""

# Local development server, used by development builds.
dev_url = "http://localhost:3000"

# ---------------------------------------------------------------------------
# Navigation
# ---------------------------------------------------------------------------
[nav.blog]
name = "Blog"
# Local posts are linked as <site origin><path>/<slug>.
# Must start with '/' and must not end with '/'.
path = "/blog"

# ---------------------------------------------------------------------------
# Feed output
# ---------------------------------------------------------------------------
[feed]
# Output file, relative to the output directory.
file = "rss.xml"

# Channel language tag.
# language = "en"
"##
}
