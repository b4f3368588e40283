//! Tests against the real services.
//!
//! Run with `--ignored` and credentials in the environment.

use reel_ml_client::{GenerationRequest, OpenAiClient, OpenAiConfig};
use reel_models::PublishEvent;
use reel_worker::{generate_script, DailyConfig, PublishServices, RenderJob, RenderServices};

fn install_crypto() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}

#[tokio::test]
#[ignore = "requires OPENAI_API_KEY"]
async fn live_script_generation() {
    install_crypto();
    let config = DailyConfig::from_env().unwrap();
    let client = OpenAiClient::new(OpenAiConfig::new(config.require_openai_key().unwrap())).unwrap();
    let request = GenerationRequest::new(&config.primary_model, &config.prompt, config.temperature);

    let script = generate_script(&client, &request, &config.fallback_model).await.unwrap();

    assert!(!script.title.is_empty());
}

#[tokio::test]
#[ignore = "requires OpenAI, AWS credentials, ffmpeg and a writable bucket"]
async fn live_render_to_scratch_key() {
    install_crypto();
    let config = DailyConfig::from_env().unwrap();
    let services = RenderServices::from_config(&config).await.unwrap();

    let outcome = RenderJob::new(config, services)
        .run(Some("selftest/live-render.mp4"))
        .await
        .unwrap();

    assert_eq!(outcome.key.as_str(), "selftest/live-render.mp4");
    assert!(outcome.plan.output_duration > 0.0);
}

#[tokio::test]
#[ignore = "requires AWS credentials and the upload secret"]
async fn live_publish_missing_key_is_not_found() {
    install_crypto();
    let config = DailyConfig::from_env().unwrap();
    let services = PublishServices::from_config(&config).await.unwrap();
    let event = PublishEvent {
        key: Some("selftest/does-not-exist.mp4".to_string()),
    };

    let err = reel_worker::PublishJob::new(config, services)
        .run(&event)
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
#[ignore = "requires AWS credentials"]
async fn live_bucket_reachable() {
    use reel_storage::{load_sdk_config, S3Client};

    install_crypto();
    let config = DailyConfig::from_env().unwrap();
    let sdk_config = load_sdk_config(&config.aws_config()).await;

    let client = S3Client::new(&sdk_config, config.s3_config()).unwrap();
    client.check_connectivity().await.unwrap();
}
