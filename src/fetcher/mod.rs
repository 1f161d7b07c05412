mod handlers;

use std::path::{Path, PathBuf};

use handlers::HANDLERS;
use tracing::info;

/// A track/artist pair to look up on a media platform.
#[derive(Debug, Clone)]
pub struct TrackQuery {
    track: String,
    artist: String,
}
impl TrackQuery {
    pub fn new(track: &str, artist: &str) -> anyhow::Result<Self> {
        let track = track.trim();
        let artist = artist.trim();

        if track.is_empty() {
            anyhow::bail!("Track name must not be empty");
        }
        if artist.is_empty() {
            anyhow::bail!("Artist name must not be empty");
        }

        Ok(Self {
            track: track.to_owned(),
            artist: artist.to_owned(),
        })
    }

    /// Free-text search string sent to the media platform.
    pub fn search_query(&self) -> String {
        format!("{} {}", self.track, self.artist)
    }

    /// Human-readable name of the file handed back to the client.
    pub fn display_file_name(&self) -> String {
        format!("{} - {}.mp3", self.artist, self.track)
    }
}

pub struct Fetcher;
impl Fetcher {
    pub async fn fetch_track(
        download_dir: &Path,
        query: &TrackQuery,
    ) -> Result<PathBuf, anyhow::Error> {
        info!(?query, "Fetching track...");

        for source in HANDLERS.iter() {
            if source.available().await {
                return source.fetch(download_dir, query).await;
            }
        }

        Err(anyhow::anyhow!("No audio source available"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_rejects_blank_fields() {
        assert!(TrackQuery::new("", "Artist").is_err());
        assert!(TrackQuery::new("Track", "   ").is_err());
        assert!(TrackQuery::new("Track", "Artist").is_ok());
    }

    #[test]
    fn query_trims_and_formats() {
        let query = TrackQuery::new("  Café del Mar ", " Artist ").expect("valid query");

        assert_eq!(query.search_query(), "Café del Mar Artist");
        assert_eq!(query.display_file_name(), "Artist - Café del Mar.mp3");
    }
}
