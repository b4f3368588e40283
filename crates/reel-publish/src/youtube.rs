//! YouTube Data API v3 resumable uploads.
//!
//! Protocol:
//! 1. `POST {upload_url}?uploadType=resumable&part=snippet,status` with the
//!    video resource as JSON opens a session; its URL is in `Location`.
//! 2. Each `PUT {session}` carries a `Content-Range` for one chunk.
//!    `308` means more is expected (`Range: bytes=0-N` tells how much was
//!    stored), `200`/`201` carries the created video resource.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_RANGE, CONTENT_TYPE, LOCATION, RANGE};
use reqwest::{redirect, Client, Response};
use tracing::{debug, info};
use url::Url;

use crate::credentials::{refresh_access_token, AccessToken, OAuthCredentials};
use crate::error::{PublishError, PublishResult};
use crate::metadata::VideoMetadata;
use crate::upload::{MediaUpload, ResumableUpload, UploadStatus, UploadStep, UploadedVideo, VideoHost};

/// Default resumable upload endpoint.
pub const DEFAULT_UPLOAD_URL: &str = "https://www.googleapis.com/upload/youtube/v3/videos";

/// HTTP status the protocol uses for "resume incomplete".
const RESUME_INCOMPLETE: u16 = 308;

/// Configuration for the YouTube client.
#[derive(Debug, Clone)]
pub struct YouTubeConfig {
    pub upload_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
            timeout: Duration::from_secs(600),
        }
    }
}

impl YouTubeConfig {
    pub fn with_upload_url(mut self, url: impl Into<String>) -> Self {
        self.upload_url = url.into();
        self
    }
}

/// YouTube video host.
pub struct YouTubeClient {
    http: Client,
    upload_url: Url,
}

impl YouTubeClient {
    pub fn new(config: YouTubeConfig) -> PublishResult<Self> {
        let mut upload_url = Url::parse(&config.upload_url)
            .map_err(|e| PublishError::config_error(format!("invalid upload URL: {}", e)))?;
        upload_url
            .query_pairs_mut()
            .append_pair("uploadType", "resumable")
            .append_pair("part", "snippet,status");

        // 308 is "resume incomplete" here, never a redirect to follow
        let http = Client::builder()
            .timeout(config.timeout)
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self { http, upload_url })
    }
}

#[async_trait]
impl VideoHost for YouTubeClient {
    async fn insert(
        &self,
        credentials: &OAuthCredentials,
        metadata: &VideoMetadata,
        media: MediaUpload,
    ) -> PublishResult<Box<dyn ResumableUpload>> {
        let token = refresh_access_token(&self.http, credentials).await?;

        Ok(Box::new(YouTubeUpload {
            http: self.http.clone(),
            upload_url: self.upload_url.clone(),
            token,
            metadata: metadata.clone(),
            media,
            state: SessionState::Pending,
        }))
    }
}

#[derive(Debug, Clone, PartialEq)]
enum SessionState {
    /// No session opened yet
    Pending,
    /// Session open with `offset` bytes stored by the server
    Open { session_url: String, offset: u64 },
    Finished,
}

/// One resumable upload session.
pub struct YouTubeUpload {
    http: Client,
    upload_url: Url,
    token: AccessToken,
    metadata: VideoMetadata,
    media: MediaUpload,
    state: SessionState,
}

impl YouTubeUpload {
    async fn open_session(&self) -> PublishResult<String> {
        debug!("Opening upload session for \"{}\"", self.metadata.title());

        let response = self
            .http
            .post(self.upload_url.clone())
            .bearer_auth(self.token.as_str())
            .header("X-Upload-Content-Type", &self.media.content_type)
            .header("X-Upload-Content-Length", self.media.len())
            .json(&self.metadata)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| PublishError::invalid_response("upload session has no Location header"))?;

        info!("Opened upload session ({} bytes)", self.media.len());
        Ok(location.to_string())
    }

    async fn send_chunk(&self, session_url: &str, offset: u64) -> PublishResult<UploadStep> {
        let total = self.media.len();
        let start = (offset as usize).min(self.media.data.len());
        let end = match self.media.chunk_size {
            Some(size) => (start + size).min(self.media.data.len()),
            None => self.media.data.len(),
        };

        // An empty range asks the server for its current status
        let content_range = if start < end {
            format!("bytes {}-{}/{}", start, end - 1, total)
        } else {
            format!("bytes */{}", total)
        };
        debug!("PUT {} ({})", session_url, content_range);

        let response = self
            .http
            .put(session_url)
            .bearer_auth(self.token.as_str())
            .header(CONTENT_TYPE, &self.media.content_type)
            .header(CONTENT_RANGE, content_range)
            .body(self.media.data[start..end].to_vec())
            .send()
            .await?;

        match response.status().as_u16() {
            200 | 201 => {
                let video: UploadedVideo = response
                    .json()
                    .await
                    .map_err(|e| PublishError::invalid_response(format!("video resource: {}", e)))?;
                if video.id.is_empty() {
                    return Err(PublishError::invalid_response("video resource has an empty id"));
                }
                Ok(UploadStep::Complete(video))
            }
            RESUME_INCOMPLETE => {
                let stored = match response.headers().get(RANGE) {
                    Some(value) => value
                        .to_str()
                        .ok()
                        .and_then(parse_range_header)
                        .ok_or_else(|| {
                            PublishError::invalid_response(format!("bad Range header: {:?}", value))
                        })?,
                    None => 0,
                };
                Ok(UploadStep::InProgress(UploadStatus {
                    bytes_sent: stored,
                    total_bytes: total,
                }))
            }
            _ => Err(error_from_response(response).await),
        }
    }
}

#[async_trait]
impl ResumableUpload for YouTubeUpload {
    async fn next_chunk(&mut self) -> PublishResult<UploadStep> {
        let (session_url, offset) = match &self.state {
            SessionState::Pending => (self.open_session().await?, 0),
            SessionState::Open { session_url, offset } => (session_url.clone(), *offset),
            SessionState::Finished => {
                return Err(PublishError::session_failed("upload already complete"));
            }
        };

        self.state = SessionState::Open {
            session_url: session_url.clone(),
            offset,
        };

        let step = self.send_chunk(&session_url, offset).await?;
        self.state = match &step {
            UploadStep::Complete(_) => SessionState::Finished,
            UploadStep::InProgress(status) => SessionState::Open {
                session_url,
                offset: status.bytes_sent,
            },
        };

        Ok(step)
    }
}

/// Bytes stored according to a `Range: bytes=0-N` header.
fn parse_range_header(value: &str) -> Option<u64> {
    let (_, last) = value.trim().strip_prefix("bytes=")?.split_once('-')?;
    last.trim().parse::<u64>().ok().map(|n| n + 1)
}

async fn error_from_response(response: Response) -> PublishError {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or(text);
    PublishError::from_http_status(status, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::MetadataTemplate;
    use reel_models::StorageKey;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockBuilder, MockServer, ResponseTemplate};

    const PAYLOAD: &[u8] = b"0123456789";

    async fn server_with_session() -> MockServer {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "ya29.token",
                "expires_in": 3599
            })))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/upload/youtube/v3/videos"))
            .and(query_param("uploadType", "resumable"))
            .and(query_param("part", "snippet,status"))
            .and(header("authorization", "Bearer ya29.token"))
            .and(header("x-upload-content-length", "10"))
            .and(body_partial_json(json!({
                "snippet": {"title": "Daily Video — 2025-06-15"},
                "status": {"privacyStatus": "public"}
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Location", format!("{}/session/1", server.uri()).as_str()),
            )
            .expect(1)
            .mount(&server)
            .await;

        server
    }

    fn credentials(server: &MockServer) -> OAuthCredentials {
        OAuthCredentials::from_secret_json(
            &json!({
                "refresh_token": "r",
                "client_id": "c",
                "client_secret": "s",
                "token_uri": format!("{}/token", server.uri()),
            })
            .to_string(),
        )
        .unwrap()
    }

    async fn start_upload(server: &MockServer, chunk_size: Option<usize>) -> Box<dyn ResumableUpload> {
        let client = YouTubeClient::new(
            YouTubeConfig::default()
                .with_upload_url(format!("{}/upload/youtube/v3/videos", server.uri())),
        )
        .unwrap();
        let metadata = MetadataTemplate::default().for_key(&StorageKey::new("2025-06-15.mp4"), ".mp4");
        let mut media = MediaUpload::new(PAYLOAD.to_vec(), "video/mp4");
        media.chunk_size = chunk_size;

        client.insert(&credentials(server), &metadata, media).await.unwrap()
    }

    fn put_range(range: &str) -> MockBuilder {
        Mock::given(method("PUT"))
            .and(path("/session/1"))
            .and(header("content-range", range))
    }

    #[tokio::test]
    async fn test_whole_payload_in_one_request() {
        let server = server_with_session().await;
        put_range("bytes 0-9/10")
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "dQw4w9WgXcQ"})))
            .expect(1)
            .mount(&server)
            .await;

        let mut upload = start_upload(&server, None).await;
        let step = upload.next_chunk().await.unwrap();

        assert_eq!(step, UploadStep::Complete(UploadedVideo { id: "dQw4w9WgXcQ".to_string() }));
    }

    #[tokio::test]
    async fn test_chunked_upload_completes_on_third_advance() {
        let server = server_with_session().await;
        put_range("bytes 0-3/10")
            .respond_with(ResponseTemplate::new(308).insert_header("Range", "bytes=0-3"))
            .expect(1)
            .mount(&server)
            .await;
        put_range("bytes 4-7/10")
            .respond_with(ResponseTemplate::new(308).insert_header("Range", "bytes=0-7"))
            .expect(1)
            .mount(&server)
            .await;
        put_range("bytes 8-9/10")
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "abc123"})))
            .expect(1)
            .mount(&server)
            .await;

        let mut upload = start_upload(&server, Some(4)).await;

        let first = upload.next_chunk().await.unwrap();
        assert_eq!(
            first,
            UploadStep::InProgress(UploadStatus { bytes_sent: 4, total_bytes: 10 })
        );
        let second = upload.next_chunk().await.unwrap();
        assert!(matches!(second, UploadStep::InProgress(s) if s.percent() == 80));
        let third = upload.next_chunk().await.unwrap();
        assert_eq!(third, UploadStep::Complete(UploadedVideo { id: "abc123".to_string() }));

        let after = upload.next_chunk().await.unwrap_err();
        assert!(matches!(after, PublishError::SessionFailed(_)));
    }

    #[tokio::test]
    async fn test_resumes_from_stored_offset() {
        let server = server_with_session().await;
        // Server keeps only the first two bytes of the first chunk
        put_range("bytes 0-3/10")
            .respond_with(ResponseTemplate::new(308).insert_header("Range", "bytes=0-1"))
            .expect(1)
            .mount(&server)
            .await;
        put_range("bytes 2-5/10")
            .respond_with(ResponseTemplate::new(308).insert_header("Range", "bytes=0-5"))
            .expect(1)
            .mount(&server)
            .await;

        let mut upload = start_upload(&server, Some(4)).await;
        upload.next_chunk().await.unwrap();
        let step = upload.next_chunk().await.unwrap();

        assert_eq!(
            step,
            UploadStep::InProgress(UploadStatus { bytes_sent: 6, total_bytes: 10 })
        );
    }

    #[tokio::test]
    async fn test_chunk_rejected() {
        let server = server_with_session().await;
        put_range("bytes 0-9/10")
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {"code": 403, "message": "The user has exceeded the number of videos they may upload."}
            })))
            .mount(&server)
            .await;

        let mut upload = start_upload(&server, None).await;
        let err = upload.next_chunk().await.unwrap_err();

        assert!(matches!(err, PublishError::AuthFailed(ref m) if m.contains("exceeded")));
    }

    #[tokio::test]
    async fn test_session_without_location() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "t"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/upload/youtube/v3/videos"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let mut upload = start_upload(&server, None).await;
        let err = upload.next_chunk().await.unwrap_err();

        assert!(matches!(err, PublishError::InvalidResponse(_)));
    }

    #[test]
    fn test_parse_range_header() {
        assert_eq!(parse_range_header("bytes=0-524287"), Some(524288));
        assert_eq!(parse_range_header("bytes=0-0"), Some(1));
        assert_eq!(parse_range_header("0-10"), None);
    }

    #[test]
    fn test_invalid_upload_url() {
        assert!(matches!(
            YouTubeClient::new(YouTubeConfig::default().with_upload_url("not a url")),
            Err(PublishError::ConfigError(_))
        ));
    }
}
