//! Configuration types for wistia-dl
//!
//! All run parameters are collected once at the boundary (the interactive
//! binary or an embedding application) and handed to the pipeline as a
//! single [`Config`]; the pipeline itself never prompts.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// HTTP fetch behavior
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Per-request timeout in seconds (default: 30)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Base URL of the media metadata endpoint
    #[serde(default = "default_metadata_base_url")]
    pub metadata_base_url: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
            metadata_base_url: default_metadata_base_url(),
        }
    }
}

/// External tool paths (ffmpeg)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to ffmpeg executable (auto-detected if None)
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    /// Whether to search PATH for ffmpeg if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            search_path: true,
        }
    }
}

/// Main configuration for a download run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// URL of the page carrying the slide container
    pub page_url: String,

    /// Directory downloaded videos are written to (created if absent)
    pub output_dir: PathBuf,

    /// HTTP fetch behavior
    #[serde(flatten)]
    pub fetch: FetchConfig,

    /// External tool paths
    #[serde(flatten)]
    pub tools: ToolsConfig,
}

impl Config {
    /// Create a configuration with default fetch and tool settings
    pub fn new(page_url: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            page_url: page_url.into(),
            output_dir: output_dir.into(),
            fetch: FetchConfig::default(),
            tools: ToolsConfig::default(),
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the page URL is not an absolute http(s)
    /// URL or the output directory is empty.
    pub fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.page_url).map_err(|e| Error::Config {
            message: format!("invalid page URL: {}", e),
            key: Some("page_url".to_string()),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::Config {
                message: format!("unsupported URL scheme: {}", parsed.scheme()),
                key: Some("page_url".to_string()),
            });
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(Error::Config {
                message: "output directory must not be empty".to_string(),
                key: Some("output_dir".to_string()),
            });
        }
        Ok(())
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_metadata_base_url() -> String {
    crate::fetcher::DEFAULT_METADATA_BASE_URL.to_string()
}

fn default_true() -> bool {
    true
}
