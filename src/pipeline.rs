//! The linear download pipeline: scan, then resolve and fetch per slide.
//!
//! Execution is strictly sequential with no retries. Per-slide failures
//! are logged and counted as skipped; the run only terminates early when
//! the initial scan finds no slides. [`SlideDownloader`] owns the HTTP
//! client and configuration and never prompts; naming decisions come from
//! the caller-supplied [`VideoNamer`].

use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetcher;
use crate::merge::Concatenator;
use crate::naming::VideoNamer;
use crate::resolver;
use crate::scanner;
use crate::types::{DownloadedFile, RunReport, SlideRecord};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// Sequential slide-video downloader
pub struct SlideDownloader {
    client: reqwest::Client,
    config: Config,
}

impl SlideDownloader {
    /// Create a downloader from a validated configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for invalid settings and
    /// [`Error::Network`] if the HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.fetch.request_timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// The configuration this downloader was built with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fetch the page and return its slides in presentation order
    pub async fn scan(&self) -> Result<Vec<SlideRecord>> {
        scanner::scan_slides(&self.client, &self.config.page_url).await
    }

    /// Run the full pipeline: scan, then resolve and fetch each slide.
    ///
    /// Per-slide failures are logged and recorded in the report's skip
    /// count without aborting the run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSlides`] when the scan yields nothing (before
    /// any embed or asset request is made) and propagates scan-level
    /// network failures.
    pub async fn run(&self, namer: &mut dyn VideoNamer) -> Result<RunReport> {
        let slides = self.scan().await?;
        if slides.is_empty() {
            return Err(Error::NoSlides);
        }
        info!(count = slides.len(), "processing slides");

        let mut report = RunReport::default();
        for slide in &slides {
            match self.process_slide(slide, namer).await {
                Ok(file) => report.files.push(file),
                Err(e) if e.is_skippable() => {
                    warn!(slide_id = slide.slide_id, error = %e, "skipping slide");
                    report.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            downloaded = report.files.len(),
            skipped = report.skipped,
            "run complete"
        );
        Ok(report)
    }

    /// Resolve one slide's embed, download its best asset, and rename it
    async fn process_slide(
        &self,
        slide: &SlideRecord,
        namer: &mut dyn VideoNamer,
    ) -> Result<DownloadedFile> {
        let embed =
            resolver::resolve_embed(&self.client, &self.config.page_url, &slide.slide_id).await?;
        let temp_path = fetcher::download_video(
            &self.client,
            &self.config.fetch.metadata_base_url,
            &embed,
            &self.config.output_dir,
        )
        .await?;

        // Naming happens only after the bytes have landed, so counters and
        // prompts are spent exclusively on kept files.
        let name = namer.next_name(slide)?;
        let path =
            fetcher::finalize_video(&temp_path, &self.config.output_dir, &name.stem).await?;
        Ok(DownloadedFile {
            path,
            sequence: name.sequence,
        })
    }

    /// Concatenate the run's files into `<output_stem>.mp4`.
    ///
    /// Delegates to [`Concatenator`] with the configured ffmpeg binary.
    pub async fn merge(&self, report: &RunReport, output_stem: &str) -> Result<PathBuf> {
        let files: Vec<PathBuf> = report.files.iter().map(|f| f.path.clone()).collect();
        Concatenator::from_config(&self.config.tools)?
            .merge(&files, &self.config.output_dir, output_stem)
            .await
    }
}
