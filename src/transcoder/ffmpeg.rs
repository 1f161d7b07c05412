use std::{
    ffi::OsString,
    fmt::Display,
    path::{Path, PathBuf},
    process::Stdio,
};

use tokio::process::Command;
use tracing::{debug, trace};

use crate::helpers::temp_dir::TempDir;

#[derive(Debug, Clone, Copy)]
#[allow(dead_code)]
pub enum Bitrate {
    Kbps128,
    Kbps192,
    Kbps256,
    Kbps320,
}
impl Display for Bitrate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Kbps128 => f.write_str("128k"),
            Self::Kbps192 => f.write_str("192k"),
            Self::Kbps256 => f.write_str("256k"),
            Self::Kbps320 => f.write_str("320k"),
        }
    }
}
impl Bitrate {
    /// Service-wide default, read from `TUNEFETCH_BITRATE` if set.
    pub fn from_env() -> Self {
        match std::env::var("TUNEFETCH_BITRATE").as_deref() {
            Ok("128") => Self::Kbps128,
            Ok("256") => Self::Kbps256,
            Ok("320") => Self::Kbps320,
            _ => Self::Kbps192,
        }
    }
}

pub struct Mp3Transcoder;
impl Mp3Transcoder {
    /// Transcode `file_path` to MP3 at the given bitrate.
    ///
    /// ffmpeg writes into a private work dir first so the output never
    /// collides with the input, then the result is copied into `output_dir`
    /// named after the input stem.
    #[tracing::instrument]
    pub async fn to_mp3(
        output_dir: &Path,
        file_path: &Path,
        bitrate: Bitrate,
    ) -> anyhow::Result<PathBuf> {
        debug!("Transcoding to mp3");
        let work_dir = TempDir::with_prefix("tunefetch-ffmpeg-")?;
        let encoded_path = work_dir.path().join("audio.mp3");

        let cmd_status = Command::new("ffmpeg")
            .arg("-y")
            .args([
                OsString::from("-i").as_os_str(),
                file_path.as_os_str(),
            ])
            .arg("-vn")
            .args(["-codec:a", "libmp3lame"])
            .args(["-b:a", &bitrate.to_string()])
            .arg(&encoded_path)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await?;

        trace!(status = ?cmd_status, "ffmpeg command finished");

        if !cmd_status.success() {
            anyhow::bail!("Command executed with exit code {:?}", cmd_status.code());
        }

        let file_base_name = {
            let mut f = file_path.file_stem().unwrap_or_default().to_os_string();

            if f.is_empty() {
                f = OsString::from("audio");
            }

            f
        };

        let mp3_path = output_dir.join({
            let mut f = file_base_name;
            f.push(".mp3");
            f
        });
        trace!(?mp3_path, "Copying transcoded file to output directory");
        tokio::fs::copy(&encoded_path, &mp3_path).await?;

        Ok(mp3_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitrate_renders_ffmpeg_argument() {
        assert_eq!(Bitrate::Kbps128.to_string(), "128k");
        assert_eq!(Bitrate::Kbps192.to_string(), "192k");
        assert_eq!(Bitrate::Kbps320.to_string(), "320k");
    }
}
