//! Speech synthesis client.

use std::path::Path;

use async_trait::async_trait;
use aws_sdk_polly::error::DisplayErrorContext;
use aws_sdk_polly::types::{Engine, OutputFormat, VoiceId};
use aws_sdk_polly::Client;
use aws_types::SdkConfig;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{MlError, MlResult};
use crate::types::SpeechRequest;

/// Capability that turns text into compressed (MP3) audio.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, request: &SpeechRequest) -> MlResult<Vec<u8>>;
}

/// Amazon Polly client.
#[derive(Clone)]
pub struct PollyClient {
    client: Client,
}

impl PollyClient {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for PollyClient {
    async fn synthesize(&self, request: &SpeechRequest) -> MlResult<Vec<u8>> {
        if request.text.trim().is_empty() {
            return Err(MlError::InvalidRequest("speech text is empty".to_string()));
        }

        debug!(
            "Synthesizing {} chars with voice {} ({})",
            request.text.len(),
            request.voice_id,
            request.engine
        );

        let output = self
            .client
            .synthesize_speech()
            .text(&request.text)
            .output_format(OutputFormat::Mp3)
            .voice_id(VoiceId::from(request.voice_id.as_str()))
            .engine(Engine::from(request.engine.as_str()))
            .send()
            .await
            .map_err(|e| MlError::synthesis_failed(DisplayErrorContext(&e).to_string()))?;

        let audio = output
            .audio_stream
            .collect()
            .await
            .map_err(|e| MlError::synthesis_failed(e.to_string()))?
            .into_bytes()
            .to_vec();

        if audio.is_empty() {
            return Err(MlError::synthesis_failed("speech service returned no audio"));
        }

        Ok(audio)
    }
}

/// Synthesize speech and write it to `path`.
///
/// The file is flushed, synced and closed before this returns, so the
/// caller can hand the path to a reader straight away.
pub async fn synthesize_to_file(
    synthesizer: &dyn SpeechSynthesizer,
    request: &SpeechRequest,
    path: &Path,
) -> MlResult<u64> {
    let audio = synthesizer.synthesize(request).await?;

    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(&audio).await?;
    file.flush().await?;
    file.sync_all().await?;
    drop(file);

    info!("Wrote {} bytes of narration to {}", audio.len(), path.display());
    Ok(audio.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedAudio(Vec<u8>);

    #[async_trait]
    impl SpeechSynthesizer for FixedAudio {
        async fn synthesize(&self, _request: &SpeechRequest) -> MlResult<Vec<u8>> {
            Ok(self.0.clone())
        }
    }

    struct Failing;

    #[async_trait]
    impl SpeechSynthesizer for Failing {
        async fn synthesize(&self, _request: &SpeechRequest) -> MlResult<Vec<u8>> {
            Err(MlError::synthesis_failed("voice unavailable"))
        }
    }

    #[tokio::test]
    async fn test_synthesize_to_file_writes_audio() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("narration.mp3");
        let request = SpeechRequest::new("one\ntwo", "Maja", "neural");

        let written = synthesize_to_file(&FixedAudio(vec![0xFF, 0xFB, 0x90]), &request, &path)
            .await
            .unwrap();

        assert_eq!(written, 3);
        assert_eq!(tokio::fs::read(&path).await.unwrap(), vec![0xFF, 0xFB, 0x90]);
    }

    #[tokio::test]
    async fn test_synthesize_to_file_failure_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("narration.mp3");
        let request = SpeechRequest::new("one", "Maja", "neural");

        let err = synthesize_to_file(&Failing, &request, &path).await.unwrap_err();
        assert!(matches!(err, MlError::SynthesisFailed(_)));
        assert!(!path.exists());
    }
}
