//! Publish job: credentials, artifact fetch and resumable upload.
//!
//! A run moves through
//! `Idle -> CredentialsLoaded -> ArtifactFetched -> UploadInProgress -> Uploaded`.
//! No step is retried here; the first failure ends the run.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, Instrument};

use reel_models::{PublishEvent, PublishResponse, StorageKey};
use reel_publish::{
    drive_upload, MediaUpload, OAuthCredentials, VideoHost, YouTubeClient, YouTubeConfig,
};
use reel_storage::{load_sdk_config, BlobStore, S3Client, SecretStore, SecretsManagerClient};

use crate::config::DailyConfig;
use crate::error::WorkerResult;
use crate::logging::JobLogger;

/// External capabilities used by a publish.
#[derive(Clone)]
pub struct PublishServices {
    pub secrets: Arc<dyn SecretStore>,
    pub store: Arc<dyn BlobStore>,
    pub host: Arc<dyn VideoHost>,
}

impl PublishServices {
    /// Production services: Secrets Manager, S3 and YouTube.
    pub async fn from_config(config: &DailyConfig) -> WorkerResult<Self> {
        let sdk_config = load_sdk_config(&config.aws_config()).await;

        Ok(Self {
            secrets: Arc::new(SecretsManagerClient::new(&sdk_config)),
            store: Arc::new(S3Client::new(&sdk_config, config.s3_config())?),
            host: Arc::new(YouTubeClient::new(YouTubeConfig::default())?),
        })
    }
}

/// Progress of one publish run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishState {
    Idle,
    CredentialsLoaded,
    ArtifactFetched { key: StorageKey, bytes: usize },
    UploadInProgress { key: StorageKey },
    Uploaded { video_id: String },
}

impl PublishState {
    fn advance(&mut self, next: PublishState) {
        debug!("Publish state: {:?} -> {:?}", self, next);
        *self = next;
    }
}

/// Daily publish job.
pub struct PublishJob {
    config: DailyConfig,
    services: PublishServices,
}

impl PublishJob {
    pub fn new(config: DailyConfig, services: PublishServices) -> Self {
        Self { config, services }
    }

    /// Publish the artifact named by `event`, or today's artifact.
    pub async fn run(&self, event: &PublishEvent) -> WorkerResult<PublishResponse> {
        self.run_at(event, Utc::now()).await
    }

    /// Publish as if the current time were `now`.
    pub async fn run_at(
        &self,
        event: &PublishEvent,
        now: DateTime<Utc>,
    ) -> WorkerResult<PublishResponse> {
        let logger = JobLogger::new("publish");
        let key = StorageKey::resolve(event.key.as_deref(), now, &self.config.extension);

        let result = self
            .execute(&logger, key)
            .instrument(logger.create_span())
            .await;

        match &result {
            Ok(response) => logger.log_completion(&response.body),
            Err(e) => logger.log_error(&e.to_string()),
        }
        result
    }

    async fn execute(&self, logger: &JobLogger, key: StorageKey) -> WorkerResult<PublishResponse> {
        let mut state = PublishState::Idle;
        logger.log_start(&format!("publishing {}", key));

        let raw = self
            .services
            .secrets
            .secret_string(&self.config.secret_name)
            .await?;
        let credentials = OAuthCredentials::from_secret_json(&raw)?;
        state.advance(PublishState::CredentialsLoaded);

        let data = self.services.store.download_bytes(key.as_str()).await?;
        state.advance(PublishState::ArtifactFetched {
            key: key.clone(),
            bytes: data.len(),
        });
        logger.log_progress(&format!("fetched {} ({} bytes)", key, data.len()));

        let metadata = self.config.metadata.for_key(&key, &self.config.extension);
        let mut media = MediaUpload::new(data, &self.config.content_type);
        if let Some(size) = self.config.upload_chunk_size {
            media = media.with_chunk_size(size);
        }

        let mut upload = self
            .services
            .host
            .insert(&credentials, &metadata, media)
            .await?;
        state.advance(PublishState::UploadInProgress { key: key.clone() });
        logger.log_progress(&format!("uploading \"{}\"", metadata.title()));

        let video = drive_upload(upload.as_mut(), self.config.upload_limits).await?;
        state.advance(PublishState::Uploaded {
            video_id: video.id.clone(),
        });

        Ok(PublishResponse::uploaded(video.id)?)
    }
}
