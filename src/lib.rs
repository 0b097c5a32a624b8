//! # wistia-dl
//!
//! Library for downloading the Wistia videos embedded in a slide-deck
//! page, in slide order, with optional ffmpeg concatenation at the end.
//!
//! ## Design
//!
//! The workflow is a strictly linear pipeline: scan the page for slide
//! identifiers, then for each slide resolve its embed iframe and stream
//! the highest-resolution asset to disk. There is no concurrency, no
//! retry policy, and no caching; every step is one best-effort attempt
//! and per-slide failures are skipped, not fatal.
//!
//! All interactive concerns live outside the library: parameters arrive
//! as a [`Config`] and filenames come from a caller-supplied
//! [`VideoNamer`], so the pipeline itself is prompt-free and testable.
//!
//! ## Quick start
//!
//! ```no_run
//! use wistia_dl::{AutoNamer, Config, SlideDownloader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::new("https://courses.example.com/module-2", "./downloads");
//!     let downloader = SlideDownloader::new(config)?;
//!
//!     let mut namer = AutoNamer::new("2", " - Overview");
//!     let report = downloader.run(&mut namer).await?;
//!
//!     if report.files.len() > 1 {
//!         downloader.merge(&report, "module-2-complete").await?;
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Video fetching (metadata lookup, asset selection, streaming download)
pub mod fetcher;
/// ffmpeg-based concatenation of downloaded videos
pub mod merge;
/// File naming schemes and the namer seam
pub mod naming;
/// The linear download pipeline
pub mod pipeline;
/// Embed resolution (slide id to player URL)
pub mod resolver;
/// Page scanning (ordered slide identifiers)
pub mod scanner;
/// Core types
pub mod types;

// Re-export commonly used types
pub use config::{Config, FetchConfig, ToolsConfig};
pub use error::{Error, ParseError, Result};
pub use merge::Concatenator;
pub use naming::{AutoNamer, VideoName, VideoNamer};
pub use pipeline::SlideDownloader;
pub use types::{Asset, DownloadedFile, EmbedReference, RunReport, SlideRecord};
