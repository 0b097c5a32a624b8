//! Core types for wistia-dl

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Content type of downloadable video variants
pub const VIDEO_CONTENT_TYPE: &str = "video/mp4";

/// Asset type marking the canonical upload among a media's variants
pub const ORIGINAL_ASSET_TYPE: &str = "original";

/// One slide discovered on the source page
///
/// Slides are ordered by ascending `position`; ties keep discovery order.
/// A missing or malformed position attribute is recorded as 0.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideRecord {
    /// Value of the position attribute (0 when absent or non-numeric)
    pub position: i64,
    /// Value of the slide identifier attribute
    pub slide_id: String,
}

impl SlideRecord {
    /// Create a new SlideRecord
    pub fn new(position: i64, slide_id: impl Into<String>) -> Self {
        Self {
            position,
            slide_id: slide_id.into(),
        }
    }
}

/// URL of one hosted video player instance, tied to a single slide
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmbedReference(pub String);

impl EmbedReference {
    /// The embed URL as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EmbedReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EmbedReference {
    fn from(url: String) -> Self {
        Self(url)
    }
}

/// Top-level shape of the metadata endpoint response
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MediaResponse {
    /// The media record the endpoint resolved the hashed id to
    #[serde(default)]
    pub media: Media,
}

/// One media record with its encoded variants
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Media {
    /// All encoded variants the host offers for this media
    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// One encoded variant of a video
///
/// The metadata endpoint returns many variants (stills, captions, lower
/// resolutions); only entries typed `"original"` or carrying the mp4
/// content type qualify for download. Fields other than `url` are
/// optional on the wire.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Asset {
    /// Variant kind as reported by the host (e.g. "original", "iphone_video")
    #[serde(rename = "type", default)]
    pub asset_type: Option<String>,
    /// MIME type of the encoded payload
    #[serde(default)]
    pub content_type: Option<String>,
    /// Horizontal resolution in pixels
    #[serde(default)]
    pub width: Option<u32>,
    /// Direct download URL for this variant
    pub url: String,
}

impl Asset {
    /// Whether this asset qualifies as a downloadable video variant
    pub fn is_video(&self) -> bool {
        self.asset_type.as_deref() == Some(ORIGINAL_ASSET_TYPE)
            || self.content_type.as_deref() == Some(VIDEO_CONTENT_TYPE)
    }
}

impl Media {
    /// Select the widest qualifying video asset, if any.
    ///
    /// Qualifying means [`Asset::is_video`] with a width greater than zero;
    /// an asset without a width never qualifies, so metadata whose video
    /// entries all lack widths yields no downloadable asset. Width ties
    /// keep the earlier entry.
    pub fn best_asset(&self) -> Option<&Asset> {
        let mut best: Option<&Asset> = None;
        let mut max_width = 0;
        for asset in self.assets.iter().filter(|asset| asset.is_video()) {
            let width = asset.width.unwrap_or(0);
            if width > max_width {
                max_width = width;
                best = Some(asset);
            }
        }
        best
    }
}

/// The on-disk result of one successful download
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadedFile {
    /// Final path after rename
    pub path: PathBuf,
    /// Position in the auto-naming sequence (None under manual naming)
    pub sequence: Option<u32>,
}

/// Summary of one pipeline run
#[derive(Clone, Debug, Default)]
pub struct RunReport {
    /// Successfully downloaded files, in scan order
    pub files: Vec<DownloadedFile>,
    /// Number of slides skipped due to per-slide failures
    pub skipped: usize,
}

impl RunReport {
    /// Paths of all downloaded files, in scan order
    pub fn paths(&self) -> Vec<&std::path::Path> {
        self.files.iter().map(|f| f.path.as_path()).collect()
    }
}
