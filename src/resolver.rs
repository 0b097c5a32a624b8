//! Embed resolution: map one slide identifier to its player URL.
//!
//! Each call re-fetches the full page rather than reusing the scanner's
//! DOM. That is O(slides) redundant fetches, preserved from the workflow
//! this crate implements; callers wanting a single fetch can parse once
//! and call [`parse_embed`] per slide themselves.

use crate::error::{ParseError, Result};
use crate::scanner::{SLIDE_ID_ATTR, compile_selector};
use crate::types::EmbedReference;
use scraper::Html;
use tracing::debug;

/// Host-path fragment every qualifying embed URL must contain
pub const EMBED_HOST_PATTERN: &str = "fast.wistia.net/embed/iframe";

/// Fetch `page_url` and return the embed reference for `slide_id`.
///
/// # Errors
///
/// Returns [`Error::Network`](crate::Error::Network) on fetch failure,
/// [`ParseError::SlideNotFound`] when no element carries the identifier,
/// and [`ParseError::EmbedNotFound`] when the element has no iframe on the
/// expected host.
pub async fn resolve_embed(
    client: &reqwest::Client,
    page_url: &str,
    slide_id: &str,
) -> Result<EmbedReference> {
    debug!(slide_id, "re-fetching page for embed resolution");
    let html = client
        .get(page_url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    parse_embed(&html, slide_id)
}

/// Extract the embed reference for `slide_id` from raw page HTML.
///
/// Takes the first element matching the slide identifier, then its first
/// iframe. Only that iframe is considered: if its `src` does not contain
/// [`EMBED_HOST_PATTERN`] the slide has no embed, even when a later
/// iframe would match.
pub fn parse_embed(html: &str, slide_id: &str) -> Result<EmbedReference> {
    let document = Html::parse_document(html);

    let slide_selector = compile_selector(&format!(r#"div[{}="{}"]"#, SLIDE_ID_ATTR, slide_id))?;
    let slide = document
        .select(&slide_selector)
        .next()
        .ok_or_else(|| ParseError::SlideNotFound {
            slide_id: slide_id.to_string(),
        })?;

    let iframe_selector = compile_selector("iframe")?;
    let embed = slide
        .select(&iframe_selector)
        .next()
        .and_then(|iframe| iframe.value().attr("src"))
        .filter(|src| src.contains(EMBED_HOST_PATTERN))
        .ok_or_else(|| ParseError::EmbedNotFound {
            slide_id: slide_id.to_string(),
        })?;

    Ok(EmbedReference(embed.to_string()))
}
