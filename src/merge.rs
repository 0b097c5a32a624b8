//! Concatenation of downloaded videos via the external ffmpeg binary.
//!
//! The merge writes a concat-demuxer manifest listing every downloaded
//! file in download order, invokes `ffmpeg -f concat -safe 0 -i <manifest>
//! -c copy <output>` as a blocking subprocess, and removes the manifest
//! afterward whether or not ffmpeg succeeded. Process exit status is the
//! only success check; no merge-compatibility validation happens.

use crate::config::ToolsConfig;
use crate::error::{Error, Result};
use crate::fetcher::VIDEO_EXTENSION;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{info, warn};

/// Name of the concat manifest written into the output directory
pub const MANIFEST_FILENAME: &str = "video_list.txt";

/// ffmpeg-backed concatenator
pub struct Concatenator {
    binary_path: PathBuf,
}

impl Concatenator {
    /// Create a concatenator with an explicit ffmpeg path
    pub fn new(binary_path: PathBuf) -> Self {
        Self { binary_path }
    }

    /// Attempt to find ffmpeg in PATH
    pub fn from_path() -> Option<Self> {
        which::which("ffmpeg").ok().map(Self::new)
    }

    /// Resolve the ffmpeg binary from configuration.
    ///
    /// An explicit `ffmpeg_path` wins; otherwise PATH is searched when
    /// `search_path` is enabled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ToolNotFound`] when no binary can be located.
    pub fn from_config(tools: &ToolsConfig) -> Result<Self> {
        if let Some(path) = &tools.ffmpeg_path {
            return Ok(Self::new(path.clone()));
        }
        if tools.search_path {
            return Self::from_path()
                .ok_or_else(|| Error::ToolNotFound("ffmpeg not in PATH".to_string()));
        }
        Err(Error::ToolNotFound(
            "no ffmpeg path configured and PATH search disabled".to_string(),
        ))
    }

    /// Concatenate `files` into `<output_stem>.mp4` in `output_dir`.
    ///
    /// Stream copy only, no re-encode; unsafe-path mode is enabled so
    /// absolute paths in the manifest are accepted. The manifest is
    /// removed before this returns, on success and failure alike.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExternalTool`] when ffmpeg cannot be spawned or
    /// exits non-zero, and [`Error::Io`] if the manifest cannot be written.
    pub async fn merge(
        &self,
        files: &[PathBuf],
        output_dir: &Path,
        output_stem: &str,
    ) -> Result<PathBuf> {
        let manifest_path = output_dir.join(MANIFEST_FILENAME);
        tokio::fs::write(&manifest_path, manifest_contents(files)).await?;

        let output_path = output_dir.join(format!("{}.{}", output_stem, VIDEO_EXTENSION));
        info!(
            count = files.len(),
            output = %output_path.display(),
            "merging videos"
        );

        let result = Command::new(&self.binary_path)
            .arg("-f")
            .arg("concat")
            .arg("-safe")
            .arg("0")
            .arg("-i")
            .arg(&manifest_path)
            .arg("-c")
            .arg("copy")
            .arg(&output_path)
            .output()
            .await;

        if let Err(e) = tokio::fs::remove_file(&manifest_path).await {
            warn!(path = %manifest_path.display(), error = %e, "failed to remove manifest");
        }

        let output = result
            .map_err(|e| Error::ExternalTool(format!("failed to execute ffmpeg: {}", e)))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::ExternalTool(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        info!(output = %output_path.display(), "merge complete");
        Ok(output_path)
    }
}

/// Render the concat-demuxer manifest for `files`, in order
pub fn manifest_contents(files: &[PathBuf]) -> String {
    files
        .iter()
        .map(|path| format!("file '{}'\n", path.display()))
        .collect()
}

/// Delete the individual source files after a successful merge.
///
/// Failures are logged and skipped; the count of deleted files is
/// returned.
pub async fn cleanup_sources(files: &[PathBuf]) -> usize {
    let mut deleted = 0;
    for path in files {
        match tokio::fs::remove_file(path).await {
            Ok(()) => deleted += 1,
            Err(e) => warn!(path = %path.display(), error = %e, "failed to delete source file"),
        }
    }
    info!(deleted, "cleaned up source files");
    deleted
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_lists_files_in_order() {
        let files = vec![
            PathBuf::from("/videos/2.1 - Overview.mp4"),
            PathBuf::from("/videos/2.2 - Overview.mp4"),
        ];
        assert_eq!(
            manifest_contents(&files),
            "file '/videos/2.1 - Overview.mp4'\nfile '/videos/2.2 - Overview.mp4'\n"
        );
    }

    #[test]
    fn test_from_config_prefers_explicit_path() {
        let tools = ToolsConfig {
            ffmpeg_path: Some(PathBuf::from("/opt/ffmpeg/bin/ffmpeg")),
            search_path: true,
        };
        let concatenator = Concatenator::from_config(&tools).unwrap();
        assert_eq!(
            concatenator.binary_path,
            PathBuf::from("/opt/ffmpeg/bin/ffmpeg")
        );
    }

    #[test]
    fn test_from_config_errors_when_search_disabled() {
        let tools = ToolsConfig {
            ffmpeg_path: None,
            search_path: false,
        };
        assert!(matches!(
            Concatenator::from_config(&tools),
            Err(Error::ToolNotFound(_))
        ));
    }

    #[test]
    fn test_from_path_returns_none_for_nonexistent_binary() {
        let result = which::which("nonexistent-ffmpeg-binary-xyz");
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_cleanup_skips_missing_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let present = temp_dir.path().join("a.mp4");
        tokio::fs::write(&present, b"x").await.unwrap();
        let missing = temp_dir.path().join("b.mp4");

        let deleted = cleanup_sources(&[present.clone(), missing]).await;
        assert_eq!(deleted, 1);
        assert!(!present.exists());
    }

    #[cfg(unix)]
    mod subprocess {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        /// Write an executable stub that records its argv, snapshots the
        /// manifest it was given, and exits with `code`
        fn stub_tool(dir: &Path, code: i32) -> PathBuf {
            let script = dir.join("fake-ffmpeg");
            std::fs::write(
                &script,
                format!(
                    "#!/bin/sh\n\
                     here=\"$(dirname \"$0\")\"\n\
                     echo \"$@\" > \"$here/argv.txt\"\n\
                     cp \"$6\" \"$here/manifest-snapshot.txt\" 2>/dev/null || true\n\
                     exit {}\n",
                    code
                ),
            )
            .unwrap();
            let mut perms = std::fs::metadata(&script).unwrap().permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(&script, perms).unwrap();
            script
        }

        #[tokio::test]
        async fn test_merge_invokes_tool_with_fixed_flags_and_removes_manifest() {
            let temp_dir = tempfile::tempdir().unwrap();
            let tool = stub_tool(temp_dir.path(), 0);
            let files = vec![
                temp_dir.path().join("one.mp4"),
                temp_dir.path().join("two.mp4"),
            ];

            let concatenator = Concatenator::new(tool);
            let output = concatenator
                .merge(&files, temp_dir.path(), "merged")
                .await
                .unwrap();

            assert_eq!(output, temp_dir.path().join("merged.mp4"));
            assert!(!temp_dir.path().join(MANIFEST_FILENAME).exists());

            let argv = std::fs::read_to_string(temp_dir.path().join("argv.txt")).unwrap();
            let manifest = temp_dir.path().join(MANIFEST_FILENAME);
            assert_eq!(
                argv.trim(),
                format!(
                    "-f concat -safe 0 -i {} -c copy {}",
                    manifest.display(),
                    output.display()
                )
            );

            // the manifest the tool saw listed exactly the files, in order
            let snapshot =
                std::fs::read_to_string(temp_dir.path().join("manifest-snapshot.txt")).unwrap();
            assert_eq!(snapshot, manifest_contents(&files));
        }

        #[tokio::test]
        async fn test_merge_failure_is_typed_and_still_removes_manifest() {
            let temp_dir = tempfile::tempdir().unwrap();
            let tool = stub_tool(temp_dir.path(), 1);
            let files = vec![temp_dir.path().join("one.mp4")];

            let concatenator = Concatenator::new(tool);
            let err = concatenator
                .merge(&files, temp_dir.path(), "merged")
                .await
                .unwrap_err();

            assert!(matches!(err, Error::ExternalTool(_)));
            assert!(!temp_dir.path().join(MANIFEST_FILENAME).exists());
        }

        #[tokio::test]
        async fn test_merge_spawn_failure_is_external_tool_error() {
            let temp_dir = tempfile::tempdir().unwrap();
            let concatenator =
                Concatenator::new(temp_dir.path().join("does-not-exist"));
            let err = concatenator
                .merge(&[temp_dir.path().join("one.mp4")], temp_dir.path(), "out")
                .await
                .unwrap_err();
            assert!(matches!(err, Error::ExternalTool(_)));
            assert!(!temp_dir.path().join(MANIFEST_FILENAME).exists());
        }
    }
}
