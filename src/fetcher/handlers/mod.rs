pub(super) mod ytdlp;

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;

use super::TrackQuery;

pub static HANDLERS: Lazy<Vec<SourceHandler>> =
    Lazy::new(|| vec![SourceHandler::new(ytdlp::YtDlpSource)]);

#[derive(Debug)]
pub struct SourceHandler {
    source: Box<dyn Handler>,
}
impl SourceHandler {
    fn new<T>(source: T) -> Self
    where
        T: Handler + 'static,
    {
        Self {
            source: Box::new(source),
        }
    }

    pub async fn available(&self) -> bool {
        self.source.available().await
    }

    pub async fn fetch(
        &self,
        download_dir: &Path,
        query: &TrackQuery,
    ) -> Result<PathBuf, anyhow::Error> {
        self.source.fetch(download_dir, query).await
    }
}

#[async_trait::async_trait]
pub trait Handler: std::fmt::Debug + Send + Sync {
    async fn fetch(&self, download_dir: &Path, query: &TrackQuery) -> anyhow::Result<PathBuf>;

    async fn available(&self) -> bool;
}
