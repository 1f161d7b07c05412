use std::sync::Arc;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use once_cell::sync::Lazy;
use serde::Deserialize;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    fetcher::{Fetcher, TrackQuery},
    helpers::{disposition, download, temp_dir::TempDir},
    transcoder::{Bitrate, Mp3Transcoder},
};

/// Download/transcode jobs are heavyweight; gate them behind a global permit.
static JOB_SEMAPHORE: Lazy<Arc<Semaphore>> =
    Lazy::new(|| Arc::new(Semaphore::new(max_concurrent_jobs())));

fn max_concurrent_jobs() -> usize {
    std::env::var("TUNEFETCH_MAX_JOBS")
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|n| *n > 0)
        .unwrap_or(1)
}

pub fn router() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/download", post(download_track))
        .route("/preview", post(download_preview))
}

struct ApiError {
    status: StatusCode,
    message: String,
}
impl ApiError {
    fn bad_request<T: Into<String>>(message: T) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}
impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: e.to_string(),
        }
    }
}
impl From<std::io::Error> for ApiError {
    fn from(e: std::io::Error) -> Self {
        Self::from(anyhow::Error::from(e))
    }
}
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!(status = %self.status, error = %self.message, "Request failed");

        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
struct DownloadRequest {
    track_name: String,
    artist_name: String,
}

async fn download_track(Json(req): Json<DownloadRequest>) -> Result<Response, ApiError> {
    debug!(?req, "Got download request");
    let query = TrackQuery::new(&req.track_name, &req.artist_name)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let _permit = JOB_SEMAPHORE
        .acquire()
        .await
        .expect("Semaphore should not be closed");

    let temp_dir = TempDir::with_prefix("tunefetch-")?;

    let audio_path = Fetcher::fetch_track(temp_dir.path(), &query).await?;
    debug!(?audio_path, "Track fetched");

    let mp3_path = Mp3Transcoder::to_mp3(temp_dir.path(), &audio_path, Bitrate::from_env()).await?;
    debug!(?mp3_path, "Track transcoded");

    let audio = tokio::fs::read(&mp3_path).await?;

    info!(file = %query.display_file_name(), bytes = audio.len(), "Serving track");

    Ok(attachment_response(audio, &query.display_file_name()))
}

#[derive(Debug, Deserialize)]
struct PreviewRequest {
    preview_url: String,
    track_name: String,
    artist_name: String,
}

async fn download_preview(Json(req): Json<PreviewRequest>) -> Result<Response, ApiError> {
    debug!(?req, "Got preview request");
    let preview_url = Url::parse(&req.preview_url)
        .map_err(|_| ApiError::bad_request("Invalid preview URL"))?;

    if !matches!(preview_url.scheme(), "http" | "https") {
        return Err(ApiError::bad_request("Preview URL must be http or https"));
    }

    let query = TrackQuery::new(&req.track_name, &req.artist_name)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let temp_dir = TempDir::with_prefix("tunefetch-preview-")?;
    let preview_path = temp_dir.path().join("preview.mp3");

    download::download_file(&preview_path, preview_url.as_str()).await?;

    let audio = tokio::fs::read(&preview_path).await?;

    info!(file = %query.display_file_name(), bytes = audio.len(), "Serving preview");

    Ok(attachment_response(audio, &query.display_file_name()))
}

fn attachment_response(audio: Vec<u8>, display_name: &str) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "audio/mpeg".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                disposition::attachment_header(display_name),
            ),
        ],
        audio,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_request_deserializes_snake_case_body() {
        let req: DownloadRequest =
            serde_json::from_str(r#"{"track_name": "測試", "artist_name": "Artist"}"#)
                .expect("valid body");

        assert_eq!(req.track_name, "測試");
        assert_eq!(req.artist_name, "Artist");
    }

    #[test]
    fn attachment_response_sets_download_headers() {
        let resp = attachment_response(vec![0xff, 0xfb], "Café del Mar - Track.mp3");

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            Some("audio/mpeg")
        );

        let disposition = resp
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(disposition.starts_with("attachment; filename=\"Cafe del Mar - Track.mp3\""));
        assert!(disposition.contains("filename*=UTF-8''Caf%C3%A9%20del%20Mar"));
    }

    #[test]
    fn job_limit_defaults_to_one() {
        assert_eq!(max_concurrent_jobs(), 1);
    }
}
