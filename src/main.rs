//! Interactive console front-end for wistia-dl.
//!
//! Collects run parameters up front, hands them to the prompt-free
//! pipeline, and only returns to the operator for per-video names (when
//! auto-numbering is off) and the end-of-run merge/cleanup decisions.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;
use wistia_dl::{
    AutoNamer, Config, Error, Result, SlideDownloader, SlideRecord, VideoName, VideoNamer, merge,
};

/// Namer that asks the operator for each video's name on stdin
struct PromptNamer;

impl VideoNamer for PromptNamer {
    fn next_name(&mut self, slide: &SlideRecord) -> Result<VideoName> {
        let stem = prompt(&format!(
            "Enter a name for the video of slide {} (without extension): ",
            slide.slide_id
        ))?;
        Ok(VideoName {
            stem,
            sequence: None,
        })
    }
}

fn prompt(message: &str) -> Result<String> {
    Ok(prompt_raw(message)?.trim().to_string())
}

/// Like [`prompt`] but keeps inner and leading whitespace (the auto-naming
/// suffix is typically " - Something")
fn prompt_raw(message: &str) -> Result<String> {
    print!("{}", message);
    io::stdout().flush().map_err(Error::Io)?;
    let mut line = String::new();
    io::stdin().read_line(&mut line).map_err(Error::Io)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn confirm(message: &str) -> Result<bool> {
    Ok(prompt(message)?.eq_ignore_ascii_case("y"))
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(Error::NoSlides) => {
            eprintln!("No valid slide ids to process. Exiting.");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    println!("Wistia Slide Downloader");
    let page_url = prompt("Enter the URL of the page that contains all slides: ")?;
    let output_dir = PathBuf::from(prompt("Enter the directory where videos should be saved: ")?);

    let prefix = prompt(
        "Enter a prefix number for auto-naming (e.g., 2), or press Enter to name manually: ",
    )?;
    let suffix = if prefix.is_empty() {
        String::new()
    } else {
        prompt_raw("Enter optional text to append after each number (e.g., ' - Overview'), or press Enter for none: ")?
    };

    let downloader = SlideDownloader::new(Config::new(page_url, output_dir))?;

    let mut auto_namer;
    let mut prompt_namer;
    let namer: &mut dyn VideoNamer = if prefix.is_empty() {
        prompt_namer = PromptNamer;
        &mut prompt_namer
    } else {
        auto_namer = AutoNamer::new(prefix, suffix);
        &mut auto_namer
    };

    let report = downloader.run(namer).await?;
    println!(
        "\nDownloaded {} video(s), skipped {}.",
        report.files.len(),
        report.skipped
    );

    if report.files.len() > 1 {
        if confirm("\nMerge all videos into a single file? (y/n): ")? {
            let merge_name = prompt("Enter a name for the final merged video (without extension): ")?;
            let merged = downloader.merge(&report, &merge_name).await?;
            println!("Merged video saved as: {}", merged.display());

            if confirm("Delete individual video files? (y/n): ")? {
                let paths: Vec<PathBuf> =
                    report.files.iter().map(|f| f.path.clone()).collect();
                merge::cleanup_sources(&paths).await;
                println!("Deleted individual files. Only merged file remains.");
            }
        } else {
            println!("Videos downloaded separately. No merge performed.");
        }
    } else {
        println!("Single video downloaded. Merge skipped.");
    }

    println!("\nComplete!");
    Ok(())
}
