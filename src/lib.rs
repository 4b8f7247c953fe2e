//! # Runnel
//!
//! Turns a social network timeline page into an RSS 2.0 feed.
//!
//! ## Architecture
//!
//! Runnel is a one-shot pipeline:
//!
//! ```text
//! PageSource → Snapshot → Extractor → FeedItem → RssWriter
//! ```
//!
//! - [`source`]: renders the page (headless Chromium) or reads a saved one
//! - [`extract`]: locates posts and builds items using a markup profile
//! - [`writer`]: streams the RSS document and replaces the output file
//!
//! ## Quick Start
//!
//! ```bash
//! # Render and convert a timeline
//! runnel https://www.facebook.com/jane jane.xml
//!
//! # Convert a page saved from a browser, no browser launch
//! runnel --html saved.html https://x.com/jane jane.xml
//! ```

/// Application context and error handling.
pub mod app;

/// Configuration management.
///
/// Loads from `~/.config/runnel/config.toml`, supporting:
/// - Browser settings
/// - Custom markup profiles
pub mod config;

/// Command-line interface using clap.
pub mod cli;

/// Core domain models.
///
/// - [`PageContext`](domain::PageContext): metadata of the scraped page
/// - [`FeedItem`](domain::FeedItem): one post, with its identifier
pub mod domain;

/// Post location and item extraction over a rendered DOM.
pub mod extract;

/// Page sources.
///
/// - [`PageSource`](source::PageSource): async trait over a loaded page
/// - [`ChromeSource`](source::ChromeSource): chromiumoxide-based implementation
/// - [`StaticPage`](source::StaticPage): markup read from disk
pub mod source;

/// RSS 2.0 serialization.
pub mod writer;
