//! Video fetching: metadata lookup, asset selection, streaming download.
//!
//! The fetcher turns one embed reference into a temp file on disk:
//! extract the hashed media id from the embed URL, query the metadata
//! endpoint, pick the widest qualifying asset, and stream its bytes to
//! `temp_<id>.mp4` in the output directory. Renaming to the final name is
//! a separate step so the naming decision can happen after the bytes have
//! landed. No partial-file cleanup happens on failure; a broken temp file
//! may remain.

use crate::error::{Error, Result};
use crate::types::{EmbedReference, MediaResponse};
use futures::StreamExt;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// File extension applied to every downloaded video
pub const VIDEO_EXTENSION: &str = "mp4";

/// Default base URL of the metadata endpoint
pub const DEFAULT_METADATA_BASE_URL: &str = "https://fast.wistia.com/embed/medias";

/// Build the metadata endpoint URL for a hashed media id
pub fn metadata_url(base_url: &str, media_id: &str) -> String {
    format!("{}/{}.json", base_url.trim_end_matches('/'), media_id)
}

#[allow(clippy::expect_used)]
fn media_id_regex() -> &'static Regex {
    static MEDIA_ID_RE: OnceLock<Regex> = OnceLock::new();
    MEDIA_ID_RE.get_or_init(|| Regex::new(r"iframe/([A-Za-z0-9]+)").expect("static pattern"))
}

/// Extract the hashed media id from an embed reference.
///
/// The id is the path segment following `iframe/` in the player URL.
///
/// # Errors
///
/// Returns [`Error::InvalidEmbedUrl`] when the URL carries no such segment.
pub fn extract_media_id(embed: &EmbedReference) -> Result<String> {
    media_id_regex()
        .captures(embed.as_str())
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| Error::InvalidEmbedUrl(embed.as_str().to_string()))
}

/// Query the metadata endpoint for a media's asset list.
///
/// # Errors
///
/// Returns [`Error::MetadataStatus`] on a non-success response and
/// [`Error::Serialization`] when the body is not the expected JSON shape.
pub async fn fetch_metadata(
    client: &reqwest::Client,
    metadata_base_url: &str,
    media_id: &str,
) -> Result<MediaResponse> {
    let response = client
        .get(metadata_url(metadata_base_url, media_id))
        .send()
        .await?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::MetadataStatus {
            media_id: media_id.to_string(),
            status: status.as_u16(),
        });
    }
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

/// Download the best asset for `embed` into `output_dir`.
///
/// Selects the widest qualifying asset from the metadata response and
/// streams its body chunk-by-chunk to `temp_<media_id>.mp4`. The output
/// directory is created if absent. No download request is issued when no
/// asset qualifies.
///
/// # Errors
///
/// Any of the fetcher error variants: [`Error::InvalidEmbedUrl`],
/// [`Error::MetadataStatus`], [`Error::NoAsset`], plus network and I/O
/// failures during the stream.
pub async fn download_video(
    client: &reqwest::Client,
    metadata_base_url: &str,
    embed: &EmbedReference,
    output_dir: &Path,
) -> Result<PathBuf> {
    let media_id = extract_media_id(embed)?;
    let metadata = fetch_metadata(client, metadata_base_url, &media_id).await?;

    let asset = metadata.media.best_asset().ok_or_else(|| Error::NoAsset {
        media_id: media_id.clone(),
    })?;
    debug!(
        media_id,
        width = asset.width,
        url = asset.url,
        "selected asset"
    );

    tokio::fs::create_dir_all(output_dir).await?;
    let temp_path = output_dir.join(format!("temp_{}.{}", media_id, VIDEO_EXTENSION));

    info!(media_id, path = %temp_path.display(), "downloading video");
    let response = client.get(&asset.url).send().await?.error_for_status()?;
    let mut stream = response.bytes_stream();
    let mut file = tokio::fs::File::create(&temp_path).await?;
    while let Some(chunk) = stream.next().await {
        file.write_all(&chunk?).await?;
    }
    file.flush().await?;

    Ok(temp_path)
}

/// Rename a downloaded temp file to its final `<stem>.mp4` name.
///
/// An existing file at the destination is overwritten; collisions are not
/// checked.
pub async fn finalize_video(temp_path: &Path, output_dir: &Path, stem: &str) -> Result<PathBuf> {
    let final_path = output_dir.join(format!("{}.{}", stem, VIDEO_EXTENSION));
    tokio::fs::rename(temp_path, &final_path).await?;
    info!(path = %final_path.display(), "saved video");
    Ok(final_path)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn embed(url: &str) -> EmbedReference {
        EmbedReference(url.to_string())
    }

    fn metadata_body(server_uri: &str) -> String {
        format!(
            r#"{{"media":{{"assets":[
                {{"type":"still_image","content_type":"image/jpeg","width":1920,"url":"{0}/still.jpg"}},
                {{"type":"original","content_type":"video/mp4","width":1080,"url":"{0}/video.bin"}},
                {{"type":"iphone_video","content_type":"video/mp4","width":480,"url":"{0}/small.bin"}}
            ]}}}}"#,
            server_uri
        )
    }

    #[test]
    fn test_extract_media_id() {
        let id = extract_media_id(&embed(
            "https://fast.wistia.net/embed/iframe/abc123XYZ?seo=false&videoFoam=true",
        ))
        .unwrap();
        assert_eq!(id, "abc123XYZ");
    }

    #[test]
    fn test_extract_media_id_rejects_unrecognized_url() {
        let err = extract_media_id(&embed("https://fast.wistia.net/embed/player/abc")).unwrap_err();
        assert!(matches!(err, Error::InvalidEmbedUrl(_)));
    }

    #[test]
    fn test_metadata_url_template() {
        assert_eq!(
            metadata_url(DEFAULT_METADATA_BASE_URL, "abc123"),
            "https://fast.wistia.com/embed/medias/abc123.json"
        );
        // trailing slash on the base is tolerated
        assert_eq!(
            metadata_url("http://localhost:9999/medias/", "x"),
            "http://localhost:9999/medias/x.json"
        );
    }

    #[tokio::test]
    async fn test_download_video_streams_best_asset() {
        let mock_server = MockServer::start().await;
        let payload: Vec<u8> = (0..=255u8).cycle().take(64 * 1024).collect();

        Mock::given(method("GET"))
            .and(path("/abc123.json"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(metadata_body(&mock_server.uri())),
            )
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/video.bin"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(payload.clone()))
            .mount(&mock_server)
            .await;

        let temp_dir = tempfile::tempdir().unwrap();
        let client = reqwest::Client::new();
        let temp_path = download_video(
            &client,
            &mock_server.uri(),
            &embed("https://fast.wistia.net/embed/iframe/abc123"),
            temp_dir.path(),
        )
        .await
        .unwrap();

        assert_eq!(temp_path, temp_dir.path().join("temp_abc123.mp4"));
        assert_eq!(tokio::fs::read(&temp_path).await.unwrap(), payload);
    }

    #[tokio::test]
    async fn test_metadata_failure_is_typed_status_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone42.json"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let temp_dir = tempfile::tempdir().unwrap();
        let client = reqwest::Client::new();
        let err = download_video(
            &client,
            &mock_server.uri(),
            &embed("https://fast.wistia.net/embed/iframe/gone42"),
            temp_dir.path(),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            Error::MetadataStatus { status: 404, ref media_id } if media_id == "gone42"
        ));
    }

    #[tokio::test]
    async fn test_no_qualifying_asset_downloads_nothing() {
        let mock_server = MockServer::start().await;
        let body = format!(
            r#"{{"media":{{"assets":[
                {{"type":"still_image","content_type":"image/jpeg","width":1920,"url":"{0}/still.jpg"}}
            ]}}}}"#,
            mock_server.uri()
        );
        Mock::given(method("GET"))
            .and(path("/novid1.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&mock_server)
            .await;
        // The still image must never be requested
        Mock::given(method("GET"))
            .and(path("/still.jpg"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let temp_dir = tempfile::tempdir().unwrap();
        let client = reqwest::Client::new();
        let err = download_video(
            &client,
            &mock_server.uri(),
            &embed("https://fast.wistia.net/embed/iframe/novid1"),
            temp_dir.path(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::NoAsset { ref media_id } if media_id == "novid1"));
        assert!(!temp_dir.path().join("temp_novid1.mp4").exists());
    }

    #[tokio::test]
    async fn test_malformed_metadata_is_serialization_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bad1.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let err = fetch_metadata(&client, &mock_server.uri(), "bad1")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[tokio::test]
    async fn test_finalize_renames_temp_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let temp_path = temp_dir.path().join("temp_abc.mp4");
        tokio::fs::write(&temp_path, b"payload").await.unwrap();

        let final_path = finalize_video(&temp_path, temp_dir.path(), "2.1 - Overview")
            .await
            .unwrap();

        assert_eq!(final_path, temp_dir.path().join("2.1 - Overview.mp4"));
        assert!(!temp_path.exists());
        assert_eq!(tokio::fs::read(&final_path).await.unwrap(), b"payload");
    }

    #[tokio::test]
    async fn test_finalize_overwrites_existing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let temp_path = temp_dir.path().join("temp_abc.mp4");
        tokio::fs::write(&temp_path, b"new").await.unwrap();
        let existing = temp_dir.path().join("name.mp4");
        tokio::fs::write(&existing, b"old").await.unwrap();

        let final_path = finalize_video(&temp_path, temp_dir.path(), "name")
            .await
            .unwrap();
        assert_eq!(tokio::fs::read(&final_path).await.unwrap(), b"new");
    }
}
