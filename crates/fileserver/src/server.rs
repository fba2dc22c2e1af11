//! HTTP server implementation with range request support

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use vault::{HttpConfig, VaultApi, VaultError};

use crate::state::ServerState;

/// File server API for managing the HTTP server
#[derive(Clone)]
pub struct FileServerApi {
    state: ServerState,
    host: String,
    port: u16,
}

impl FileServerApi {
    /// Create a new file server API
    ///
    /// # Arguments
    /// * `vault` - Vault handle used for digest lookups
    /// * `config` - Bind address and whether raw files are served
    pub fn new(vault: VaultApi, config: &HttpConfig) -> Self {
        Self {
            state: ServerState::new(vault, config.serve_files),
            host: config.host.clone(),
            port: config.port,
        }
    }

    /// Get the server state
    pub fn state(&self) -> &ServerState {
        &self.state
    }

    /// Create the axum router with all routes configured
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(root))
            .route("/video/:digest", get(video_status))
            .route("/video/:digest/raw", get(stream_video))
            .with_state(self.state.clone())
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
    }

    /// Start the file server and run until the listener fails
    pub async fn serve(self) -> crate::Result<()> {
        let addr = format!("{}:{}", self.host, self.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        tracing::info!("HTTP server listening on {}", addr);

        axum::serve(listener, self.router()).await?;

        Ok(())
    }
}

#[derive(Serialize)]
struct Health {
    message: &'static str,
    started_at: String,
}

#[derive(Serialize)]
struct VideoStatus {
    digest: String,
    found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<u64>,
    message: String,
}

/// Health check endpoint
async fn root(State(state): State<ServerState>) -> Json<Health> {
    Json(Health {
        message: "vaultbot is running",
        started_at: state.started_at().to_rfc3339(),
    })
}

/// Whether a digest is stored, without touching the file contents
async fn video_status(
    State(state): State<ServerState>,
    Path(digest): Path<String>,
) -> Result<Response, AppError> {
    match state.vault().peek(&digest).await {
        Ok(record) => Ok(Json(VideoStatus {
            message: format!("Video with hash {} found!", record.digest),
            digest: record.digest.to_string(),
            found: true,
            size: Some(record.size),
        })
        .into_response()),
        Err(e) if e.is_not_found() => Ok((
            StatusCode::NOT_FOUND,
            Json(VideoStatus {
                message: format!("Video with hash {} not found", digest),
                digest,
                found: false,
                size: None,
            }),
        )
            .into_response()),
        Err(e) => Err(e.into()),
    }
}

/// Stream a stored video, honouring `Range` headers
async fn stream_video(
    State(state): State<ServerState>,
    Path(digest): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    if !state.serve_files() {
        return Err(AppError::NotFound("File serving is disabled".to_string()));
    }

    let record = state.vault().peek(&digest).await?;
    let file = state.vault().gateway().open(&record).await?;
    let file_size = record.size;

    // Detect MIME type
    let mime_type = mime_guess::from_path(&record.storage_path)
        .first_or_octet_stream()
        .to_string();

    // Handle range requests
    if let Some(range_header) = headers.get(header::RANGE) {
        return handle_range_request(file, file_size, range_header, &mime_type).await;
    }

    // Full file response
    let stream = ReaderStream::new(file);
    let body = Body::from_stream(stream);

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime_type)
        .header(header::CONTENT_LENGTH, file_size)
        .header(header::ACCEPT_RANGES, "bytes")
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))?;

    Ok(response)
}

/// Parse `bytes=start-end` against a file of `file_size` bytes
fn parse_range(range: &str, file_size: u64) -> Result<(u64, u64), AppError> {
    let range = range
        .strip_prefix("bytes=")
        .ok_or_else(|| AppError::BadRequest("Invalid range format".to_string()))?;

    let (start, end) = range
        .split_once('-')
        .ok_or_else(|| AppError::BadRequest("Invalid range format".to_string()))?;

    if file_size == 0 {
        return Err(AppError::RangeNotSatisfiable(file_size));
    }
    let last = file_size - 1;

    let start: u64 = start
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid range start".to_string()))?;

    let end: u64 = if end.is_empty() {
        last
    } else {
        end.parse::<u64>()
            .map_err(|_| AppError::BadRequest("Invalid range end".to_string()))?
            .min(last)
    };

    if start > end {
        return Err(AppError::RangeNotSatisfiable(file_size));
    }

    Ok((start, end))
}

/// Handle HTTP range requests for video seeking
async fn handle_range_request(
    mut file: File,
    file_size: u64,
    range_header: &header::HeaderValue,
    mime_type: &str,
) -> Result<Response, AppError> {
    let range_str = range_header
        .to_str()
        .map_err(|_| AppError::BadRequest("Invalid range header".to_string()))?;

    let (start, end) = parse_range(range_str, file_size)?;
    let content_length = end - start + 1;

    // Seek to start position
    file.seek(std::io::SeekFrom::Start(start))
        .await
        .map_err(|e| AppError::Internal(format!("Failed to seek file: {}", e)))?;

    // Stream only the requested window
    let body = Body::from_stream(ReaderStream::new(file.take(content_length)));

    let response = Response::builder()
        .status(StatusCode::PARTIAL_CONTENT)
        .header(header::CONTENT_TYPE, mime_type)
        .header(header::CONTENT_LENGTH, content_length)
        .header(
            header::CONTENT_RANGE,
            format!("bytes {}-{}/{}", start, end, file_size),
        )
        .header(header::ACCEPT_RANGES, "bytes")
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))?;

    Ok(response)
}

/// Application error types
#[derive(Debug)]
enum AppError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
    RangeNotSatisfiable(u64),
}

impl From<VaultError> for AppError {
    fn from(err: VaultError) -> Self {
        if err.is_not_found() {
            AppError::NotFound(err.to_string())
        } else {
            tracing::error!(error = %err, "Lookup failed");
            AppError::Internal("Internal error".to_string())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::RangeNotSatisfiable(size) => (
                StatusCode::RANGE_NOT_SATISFIABLE,
                format!("Range not satisfiable. File size: {}", size),
            ),
        };

        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::Request;
    use std::sync::Arc;
    use tower::ServiceExt;
    use vault::{Config, MembershipStatus, StaticDirectory};

    const ADMIN: u64 = 42;
    const DIGITS_SHA256: &str = "84d89877f0d4041efb6bf91a16f0248f2fd573e6af05c19f96bedb9f882f7882";

    async fn server_with_clip(dir: &tempfile::TempDir, serve_files: bool) -> FileServerApi {
        let video_dir = dir.path().join("videos").display().to_string();
        let index_file = dir.path().join("video_hashes.json").display().to_string();
        let config = Config::from_lookup(|key| match key {
            "ADMIN_USER_ID" => Some(ADMIN.to_string()),
            "CHANNEL_USERNAME" => Some("@leafposting".to_string()),
            "VIDEO_DIRECTORY" => Some(video_dir.clone()),
            "HASH_DATA_FILE" => Some(index_file.clone()),
            "HTTP_SERVE_FILES" => Some(serve_files.to_string()),
            _ => None,
        })
        .unwrap();

        let directory = StaticDirectory::new().with_member(ADMIN, MembershipStatus::Owner);
        let vault = VaultApi::from_config(&config, Arc::new(directory)).await.unwrap();

        let permit = vault.begin_upload(ADMIN, "clip").await.unwrap();
        tokio::fs::write(permit.download_path(), b"0123456789").await.unwrap();
        vault.ingest(permit, 1).await.unwrap();

        FileServerApi::new(vault, &config.http)
    }

    async fn get(server: &FileServerApi, uri: &str, range: Option<&str>) -> (StatusCode, Vec<u8>) {
        let mut request = Request::builder().uri(uri);
        if let Some(range) = range {
            request = request.header(header::RANGE, range);
        }
        let response = server
            .router()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn test_root() {
        let dir = tempfile::tempdir().unwrap();
        let server = server_with_clip(&dir, false).await;

        let (status, body) = get(&server, "/", None).await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "vaultbot is running");
    }

    #[tokio::test]
    async fn test_video_status_found() {
        let dir = tempfile::tempdir().unwrap();
        let server = server_with_clip(&dir, false).await;

        let (status, body) = get(&server, &format!("/video/{}", DIGITS_SHA256), None).await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["found"], true);
        assert_eq!(json["size"], 10);
        assert_eq!(json["digest"], DIGITS_SHA256);
    }

    #[tokio::test]
    async fn test_video_status_missing() {
        let dir = tempfile::tempdir().unwrap();
        let server = server_with_clip(&dir, false).await;

        let (status, body) = get(&server, "/video/not-a-digest", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["found"], false);
        assert!(json.get("size").is_none());
    }

    #[tokio::test]
    async fn test_raw_disabled_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let server = server_with_clip(&dir, false).await;

        let (status, _) = get(&server, &format!("/video/{}/raw", DIGITS_SHA256), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_raw_full_and_range() {
        let dir = tempfile::tempdir().unwrap();
        let server = server_with_clip(&dir, true).await;
        let uri = format!("/video/{}/raw", DIGITS_SHA256);

        let (status, body) = get(&server, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"0123456789");

        let (status, body) = get(&server, &uri, Some("bytes=2-5")).await;
        assert_eq!(status, StatusCode::PARTIAL_CONTENT);
        assert_eq!(body, b"2345");

        let (status, body) = get(&server, &uri, Some("bytes=7-")).await;
        assert_eq!(status, StatusCode::PARTIAL_CONTENT);
        assert_eq!(body, b"789");

        let (status, _) = get(&server, &uri, Some("bytes=20-30")).await;
        assert_eq!(status, StatusCode::RANGE_NOT_SATISFIABLE);
    }

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range("bytes=0-9", 10).unwrap(), (0, 9));
        assert_eq!(parse_range("bytes=0-100", 10).unwrap(), (0, 9));
        assert_eq!(parse_range("bytes=3-", 10).unwrap(), (3, 9));
        assert!(matches!(parse_range("bytes=5-2", 10), Err(AppError::RangeNotSatisfiable(10))));
        assert!(matches!(parse_range("bytes=0-0", 0), Err(AppError::RangeNotSatisfiable(0))));
        assert!(matches!(parse_range("items=0-1", 10), Err(AppError::BadRequest(_))));
        assert!(matches!(parse_range("bytes=a-1", 10), Err(AppError::BadRequest(_))));
        assert!(matches!(parse_range("bytes=1", 10), Err(AppError::BadRequest(_))));
    }
}
