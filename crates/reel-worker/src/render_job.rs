//! Render job: script, narration, composition and storage upload.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, Instrument};

use reel_media::{CompositionRequest, FfmpegComposer, VideoComposer};
use reel_ml_client::{
    synthesize_to_file, GenerationRequest, OpenAiClient, OpenAiConfig, PollyClient,
    SpeechRequest, SpeechSynthesizer, TextGenerator,
};
use reel_models::{CompositionPlan, Script, StorageKey};
use reel_storage::{load_sdk_config, BlobStore, S3Client};

use crate::config::DailyConfig;
use crate::error::WorkerResult;
use crate::logging::JobLogger;
use crate::script::generate_script;

/// File name of the synthesized narration inside the run directory.
const NARRATION_FILE: &str = "narration.mp3";

/// External capabilities used by a render.
#[derive(Clone)]
pub struct RenderServices {
    pub generator: Arc<dyn TextGenerator>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    pub composer: Arc<dyn VideoComposer>,
    pub store: Arc<dyn BlobStore>,
}

impl RenderServices {
    /// Production services: OpenAI, Polly, FFmpeg and S3.
    pub async fn from_config(config: &DailyConfig) -> WorkerResult<Self> {
        let mut openai = OpenAiConfig::new(config.require_openai_key()?);
        if let Some(url) = &config.openai_base_url {
            openai = openai.with_base_url(url);
        }

        let sdk_config = load_sdk_config(&config.aws_config()).await;

        let composer = FfmpegComposer::new(config.render.clone());
        let composer = match config.ffmpeg_timeout_secs {
            Some(secs) => composer.with_timeout(secs),
            None => composer,
        };

        Ok(Self {
            generator: Arc::new(OpenAiClient::new(openai)?),
            synthesizer: Arc::new(PollyClient::new(&sdk_config)),
            composer: Arc::new(composer),
            store: Arc::new(S3Client::new(&sdk_config, config.s3_config())?),
        })
    }
}

/// Result of a successful render.
#[derive(Debug, Clone)]
pub struct RenderOutcome {
    pub key: StorageKey,
    pub script: Script,
    pub plan: CompositionPlan,
}

/// Daily render job.
pub struct RenderJob {
    config: DailyConfig,
    services: RenderServices,
}

impl RenderJob {
    pub fn new(config: DailyConfig, services: RenderServices) -> Self {
        Self { config, services }
    }

    /// Render today's video, or the video for `explicit_key`.
    pub async fn run(&self, explicit_key: Option<&str>) -> WorkerResult<RenderOutcome> {
        self.run_at(Utc::now(), explicit_key).await
    }

    /// Render as if the current time were `now`.
    pub async fn run_at(
        &self,
        now: DateTime<Utc>,
        explicit_key: Option<&str>,
    ) -> WorkerResult<RenderOutcome> {
        let logger = JobLogger::new("render");
        let key = StorageKey::resolve(explicit_key, now, &self.config.extension);

        let result = self
            .execute(&logger, key)
            .instrument(logger.create_span())
            .await;

        match &result {
            Ok(outcome) => logger.log_completion(&format!(
                "stored s3://{}/{} ({:.1}s)",
                self.services.store.bucket(),
                outcome.key,
                outcome.plan.output_duration
            )),
            Err(e) => logger.log_error(&e.to_string()),
        }
        result
    }

    async fn execute(&self, logger: &JobLogger, key: StorageKey) -> WorkerResult<RenderOutcome> {
        logger.log_start(&format!("rendering {}", key));

        let request = GenerationRequest::new(
            &self.config.primary_model,
            &self.config.prompt,
            self.config.temperature,
        );
        let script = generate_script(
            self.services.generator.as_ref(),
            &request,
            &self.config.fallback_model,
        )
        .await?;
        logger.log_progress(&format!("script ready with {} bullets", script.bullets.len()));

        // Removed with everything in it when dropped
        tokio::fs::create_dir_all(&self.config.work_dir).await?;
        let run_dir = tempfile::Builder::new()
            .prefix("render-")
            .tempdir_in(&self.config.work_dir)?;

        let narration = self.narrate(&script, run_dir.path()).await?;
        logger.log_progress(match narration {
            Some(_) => "narration synthesized",
            None => "no bullets, rendering a silent title card",
        });

        let output = run_dir.path().join(format!("output{}", self.config.extension));
        let composed = self
            .services
            .composer
            .compose(CompositionRequest {
                script: &script,
                narration: narration.as_deref(),
                workdir: run_dir.path(),
                output: &output,
            })
            .await?;
        logger.log_progress(&format!(
            "composed {} slides, {:.1}s",
            composed.plan.slides.len(),
            composed.plan.output_duration
        ));

        self.services
            .store
            .upload_file(&composed.path, key.as_str(), &self.config.content_type)
            .await?;
        info!("Uploaded {} to bucket {}", key, self.services.store.bucket());

        Ok(RenderOutcome {
            key,
            script,
            plan: composed.plan,
        })
    }

    /// Synthesize the narration, or `None` when there is nothing to say.
    async fn narrate(&self, script: &Script, run_dir: &Path) -> WorkerResult<Option<PathBuf>> {
        if !script.has_bullets() {
            return Ok(None);
        }

        let path = run_dir.join(NARRATION_FILE);
        let request = SpeechRequest::new(
            script.narration_text(),
            &self.config.voice_id,
            &self.config.engine,
        );
        synthesize_to_file(self.services.synthesizer.as_ref(), &request, &path).await?;

        Ok(Some(path))
    }
}
