use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::Stdio,
    time::Duration,
};

use tokio::process::Command;
use tracing::{debug, trace};

use super::{Handler, TrackQuery};

/// Audio source backed by the `yt-dlp` binary.
///
/// Runs a single-result platform search and lets yt-dlp pick the best audio
/// stream. The container format is whatever the platform serves; transcoding
/// to MP3 happens later in the pipeline.
#[derive(Debug)]
pub struct YtDlpSource;

impl YtDlpSource {
    fn search_target(query: &TrackQuery) -> String {
        format!("ytsearch1:{}", query.search_query())
    }

    async fn find_downloaded_file(download_dir: &Path) -> anyhow::Result<PathBuf> {
        trace!("Locating downloaded file");
        let mut entries = tokio::fs::read_dir(download_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }

            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();

            // yt-dlp leaves .part files behind on interrupted downloads
            if file_name.starts_with('.') || file_name.ends_with(".part") {
                continue;
            }

            trace!(?file_name, "Found downloaded file");

            return Ok(entry.path());
        }

        anyhow::bail!("yt-dlp produced no output file");
    }
}

#[async_trait::async_trait]
impl Handler for YtDlpSource {
    #[tracing::instrument(skip_all, fields(query = ?query.search_query()))]
    async fn fetch(&self, download_dir: &Path, query: &TrackQuery) -> anyhow::Result<PathBuf> {
        debug!("Downloading best audio match");

        let output_template = download_dir.join("%(id)s.%(ext)s").into_os_string();

        let cmd_status = tryhard::retry_fn(|| {
            Command::new("yt-dlp")
                .arg(Self::search_target(query))
                .args(["--format", "bestaudio/best"])
                .args(["--no-playlist", "--no-warnings", "--quiet"])
                .args([
                    OsString::from("--output").as_os_str(),
                    output_template.as_os_str(),
                ])
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .kill_on_drop(true)
                .status()
        })
        .retries(2)
        .fixed_backoff(Duration::from_secs(2))
        .await?;

        trace!(status = ?cmd_status, "yt-dlp command finished");

        if !cmd_status.success() {
            anyhow::bail!("yt-dlp exited with code {:?}", cmd_status.code());
        }

        Self::find_downloaded_file(download_dir).await
    }

    async fn available(&self) -> bool {
        Command::new("yt-dlp")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_target_uses_single_result_platform_search() {
        let query = TrackQuery::new("Café del Mar", "Artist").expect("valid query");

        assert_eq!(
            YtDlpSource::search_target(&query),
            "ytsearch1:Café del Mar Artist"
        );
    }
}
