//! Page scanning: extract the ordered list of slide identifiers.
//!
//! The scan fetches the page once, locates the fixed slide container, and
//! returns the slide ids sorted by their position attribute. Parsing runs
//! over the fetched text in a synchronous helper so DOM state never lives
//! across an await point.

use crate::error::{ParseError, Result};
use crate::types::SlideRecord;
use scraper::{Html, Selector};
use tracing::{debug, info};

/// Element id of the slide container on the source page
pub const SLIDES_CONTAINER_ID: &str = "slides";

/// Attribute carrying the slide identifier
pub const SLIDE_ID_ATTR: &str = "data-slide-id";

/// Attribute carrying the slide ordering position
pub const POSITION_ATTR: &str = "data-position";

/// Fetch `page_url` and return its slides in presentation order.
///
/// Performs one full page fetch per invocation. An absent container yields
/// an empty vector, not an error; the pipeline decides whether an empty
/// scan terminates the run.
///
/// # Errors
///
/// Returns [`Error::Network`](crate::Error::Network) if the fetch fails and
/// [`Error::Parse`](crate::Error::Parse) if a selector cannot be compiled.
pub async fn scan_slides(client: &reqwest::Client, page_url: &str) -> Result<Vec<SlideRecord>> {
    info!(page_url, "fetching slide page");
    let html = client
        .get(page_url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    let slides = parse_slides(&html)?;
    debug!(count = slides.len(), "scan complete");
    Ok(slides)
}

/// Extract ordered slide records from raw page HTML.
///
/// Children of the container carrying the slide-id attribute are collected
/// with their optional position (default 0, also 0 on malformed values) and
/// stable-sorted ascending by position, so ties keep discovery order.
pub fn parse_slides(html: &str) -> Result<Vec<SlideRecord>> {
    let document = Html::parse_document(html);

    let container_selector = compile_selector(&format!("div#{}", SLIDES_CONTAINER_ID))?;
    let Some(container) = document.select(&container_selector).next() else {
        debug!("page has no slide container");
        return Ok(Vec::new());
    };

    let slide_selector = compile_selector(&format!("div[{}]", SLIDE_ID_ATTR))?;
    let mut slides: Vec<SlideRecord> = container
        .select(&slide_selector)
        .filter_map(|element| {
            let slide_id = element.value().attr(SLIDE_ID_ATTR)?;
            let position = element
                .value()
                .attr(POSITION_ATTR)
                .and_then(|raw| raw.trim().parse::<i64>().ok())
                .unwrap_or(0);
            Some(SlideRecord::new(position, slide_id))
        })
        .collect();

    slides.sort_by_key(|slide| slide.position);
    Ok(slides)
}

pub(crate) fn compile_selector(selector: &str) -> std::result::Result<Selector, ParseError> {
    Selector::parse(selector).map_err(|e| ParseError::InvalidSelector(e.to_string()))
}
