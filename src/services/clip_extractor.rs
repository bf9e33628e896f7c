//! Audio clip extraction via an external downloader
//!
//! Shells out to yt-dlp (or whatever binary is configured) to pull a
//! 10-second audio clip from a source video. The downloader's executable
//! name/path varies between hosts, so it is configuration rather than logic.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};
use uuid::Uuid;

use super::url_validator::ValidatedUrl;

/// Clip length in seconds, fixed by the recognition API's sampling needs
const CLIP_SECONDS: u32 = 10;

/// Extraction stage errors
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Could not create the work directory or spawn the downloader
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Downloader ran past the configured deadline and was killed
    #[error("Downloader timed out after {0:?}")]
    Timeout(Duration),

    /// Downloader exited with a non-zero status
    #[error("Downloader failed with exit code {code:?}")]
    Failed { code: Option<i32> },

    /// Downloader reported success but produced no output file
    #[error("Output file missing: {0}")]
    MissingOutput(PathBuf),

    /// Downloader reported success but the output file is empty
    #[error("Output file empty: {0}")]
    EmptyOutput(PathBuf),
}

/// Invokes the external downloader to produce temporary clip files
#[derive(Debug, Clone)]
pub struct ClipExtractor {
    binary: String,
    work_dir: PathBuf,
    timeout: Duration,
}

impl ClipExtractor {
    pub fn new(binary: String, work_dir: PathBuf, timeout: Duration) -> Self {
        Self {
            binary,
            work_dir,
            timeout,
        }
    }

    /// Extract a clip starting at `start` (a `00:MM:SS` timecode).
    ///
    /// Succeeds only when the downloader exits 0 AND the output file exists
    /// with non-zero size. Any partial file is removed on failure.
    pub async fn extract(
        &self,
        url: &ValidatedUrl,
        start: &str,
    ) -> Result<PathBuf, ExtractionError> {
        tokio::fs::create_dir_all(&self.work_dir).await?;

        // uuid keeps concurrent requests from colliding on the same path
        let output = self.work_dir.join(format!("clip-{}.mp3", Uuid::new_v4()));

        debug!(
            binary = %self.binary,
            url = %url.as_str(),
            start = %start,
            output = %output.display(),
            "Spawning downloader"
        );

        let mut child = Command::new(&self.binary)
            .arg("-x")
            .args(["--audio-format", "mp3"])
            .args([
                "--postprocessor-args",
                &format!("ffmpeg:-ss {start} -t {CLIP_SECONDS}"),
            ])
            .arg("--no-playlist")
            .arg("--no-warnings")
            .arg("-o")
            .arg(&output)
            .arg("--")
            .arg(url.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        // Drain both pipes as output arrives; a full pipe buffer would
        // otherwise deadlock the child.
        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(drain_lines(stdout, "stdout"));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(drain_lines(stderr, "stderr"));
        }

        let status = match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(url = %url.as_str(), "Downloader timed out, killing");
                let _ = child.kill().await;
                remove_partial(&output).await;
                return Err(ExtractionError::Timeout(self.timeout));
            }
        };

        if !status.success() {
            remove_partial(&output).await;
            return Err(ExtractionError::Failed {
                code: status.code(),
            });
        }

        match tokio::fs::metadata(&output).await {
            Ok(meta) if meta.len() > 0 => Ok(output),
            Ok(_) => {
                remove_partial(&output).await;
                Err(ExtractionError::EmptyOutput(output))
            }
            Err(_) => Err(ExtractionError::MissingOutput(output)),
        }
    }
}

async fn drain_lines<R>(pipe: R, stream: &'static str)
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut lines = BufReader::new(pipe).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        debug!(stream, "downloader: {line}");
    }
}

async fn remove_partial(path: &PathBuf) {
    if tokio::fs::remove_file(path).await.is_ok() {
        debug!(path = %path.display(), "Removed partial clip file");
    }
}
