//! Pipeline configuration.
//!
//! Every value has a default matching the production deployment. A few can be
//! overridden from the environment; jobs receive the finished config at
//! construction and never read the environment themselves.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use reel_models::{RenderSettings, DEFAULT_EXTENSION, VIDEO_CONTENT_TYPE};
use reel_publish::{MetadataTemplate, UploadLimits};
use reel_storage::{AwsConfig, S3Config};

use crate::error::{WorkerError, WorkerResult};

/// Fixed daily prompt sent to the text generator.
pub const DAILY_PROMPT: &str = "Write a concise 3-5 minute script (in bullet points) for a YouTube \
     video on today's most interesting topic. Title the script and provide ~5 bullets.";

/// Pipeline configuration.
#[derive(Clone)]
pub struct DailyConfig {
    /// OpenAI API key; required by the render job only
    pub openai_api_key: Option<String>,
    /// OpenAI-compatible endpoint override
    pub openai_base_url: Option<String>,
    pub primary_model: String,
    pub fallback_model: String,
    pub temperature: f32,
    pub prompt: String,

    /// AWS region for every AWS client
    pub region: String,
    /// Custom S3 endpoint (S3-compatible stores, localstack)
    pub s3_endpoint_url: Option<String>,
    pub bucket: String,
    /// Secret holding the OAuth refresh-token bundle
    pub secret_name: String,

    /// Narration voice
    pub voice_id: String,
    /// Narration engine
    pub engine: String,

    pub render: RenderSettings,
    /// Kill FFmpeg after this many seconds
    pub ffmpeg_timeout_secs: Option<u64>,
    /// Parent of the per-run scratch directories
    pub work_dir: PathBuf,

    /// Extension of stored artifacts (part of the date key)
    pub extension: String,
    pub content_type: String,

    pub metadata: MetadataTemplate,
    pub upload_limits: UploadLimits,
    /// Upload chunk size; the whole payload in one request when unset
    pub upload_chunk_size: Option<usize>,
}

impl Default for DailyConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_base_url: None,
            primary_model: "gpt-4o-mini".to_string(),
            fallback_model: "gpt-3.5-turbo".to_string(),
            temperature: 0.7,
            prompt: DAILY_PROMPT.to_string(),
            region: "eu-north-1".to_string(),
            s3_endpoint_url: None,
            bucket: "my-daily-videos-bucket-2025-umar".to_string(),
            secret_name: "prod/YouTubeUploader/credentials".to_string(),
            voice_id: "Maja".to_string(),
            engine: "neural".to_string(),
            render: RenderSettings::default(),
            ffmpeg_timeout_secs: Some(3600),
            work_dir: std::env::temp_dir().join("dailyreel"),
            extension: DEFAULT_EXTENSION.to_string(),
            content_type: VIDEO_CONTENT_TYPE.to_string(),
            metadata: MetadataTemplate::default(),
            upload_limits: UploadLimits::default(),
            upload_chunk_size: None,
        }
    }
}

impl DailyConfig {
    /// Create config from environment variables (and `.env` if present).
    pub fn from_env() -> WorkerResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Create config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> WorkerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        config.openai_api_key = var("OPENAI_API_KEY");
        config.openai_base_url = var("OPENAI_BASE_URL");
        if let Some(model) = var("REEL_PRIMARY_MODEL") {
            config.primary_model = model;
        }
        if let Some(model) = var("REEL_FALLBACK_MODEL") {
            config.fallback_model = model;
        }

        if let Some(region) = var("AWS_REGION") {
            config.region = region;
        }
        config.s3_endpoint_url = var("S3_ENDPOINT_URL");
        if let Some(bucket) = var("REEL_BUCKET") {
            config.bucket = bucket;
        }
        if let Some(secret) = var("REEL_SECRET_NAME") {
            config.secret_name = secret;
        }
        if let Some(voice) = var("REEL_VOICE_ID") {
            config.voice_id = voice;
        }

        if let Some(seconds) = parse_var::<f64>(&var, "REEL_BULLET_SECONDS")? {
            if seconds <= 0.0 {
                return Err(WorkerError::config_error("REEL_BULLET_SECONDS must be positive"));
            }
            config.render = config.render.with_bullet_duration(seconds);
        }
        if let Some(font) = var("REEL_FONT_FILE") {
            config.render.font_file = Some(font);
        }
        if let Some(secs) = parse_var::<u64>(&var, "REEL_FFMPEG_TIMEOUT_SECS")? {
            config.ffmpeg_timeout_secs = Some(secs);
        }
        if let Some(dir) = var("REEL_WORK_DIR") {
            config.work_dir = PathBuf::from(dir);
        }

        config.upload_chunk_size = parse_var::<usize>(&var, "REEL_UPLOAD_CHUNK_SIZE")?;
        if let Some(advances) = parse_var::<u32>(&var, "REEL_UPLOAD_MAX_ADVANCES")? {
            config.upload_limits.max_chunk_advances = advances;
        }
        if let Some(secs) = parse_var::<u64>(&var, "REEL_UPLOAD_DEADLINE_SECS")? {
            config.upload_limits.deadline = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Shared AWS settings (Polly, Secrets Manager, S3).
    pub fn aws_config(&self) -> AwsConfig {
        AwsConfig::for_region(&self.region)
    }

    /// Settings of the bucket holding rendered videos.
    pub fn s3_config(&self) -> S3Config {
        let s3 = S3Config::new(&self.bucket);
        match &self.s3_endpoint_url {
            Some(url) => s3.with_endpoint(url),
            None => s3,
        }
    }

    /// The OpenAI key, or a configuration error when it is unset.
    pub fn require_openai_key(&self) -> WorkerResult<&str> {
        self.openai_api_key
            .as_deref()
            .ok_or_else(|| WorkerError::config_error("OPENAI_API_KEY is not set"))
    }
}

fn parse_var<T>(var: &impl Fn(&str) -> Option<String>, name: &str) -> WorkerResult<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    var(name)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| WorkerError::config_error(format!("{}={:?}: {}", name, raw, e)))
        })
        .transpose()
}

impl fmt::Debug for DailyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DailyConfig")
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "<redacted>"))
            .field("primary_model", &self.primary_model)
            .field("fallback_model", &self.fallback_model)
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("secret_name", &self.secret_name)
            .field("voice_id", &self.voice_id)
            .field("bullet_duration", &self.render.bullet_duration)
            .field("work_dir", &self.work_dir)
            .field("upload_limits", &self.upload_limits)
            .field("upload_chunk_size", &self.upload_chunk_size)
            .finish_non_exhaustive()
    }
}
