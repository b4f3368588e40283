//! Script generation with a single fallback on rate limiting.

use tracing::{info, warn};

use reel_ml_client::{GenerationRequest, TextGenerator};
use reel_models::Script;

use crate::error::WorkerResult;

/// Request a script and parse it into title and bullets.
///
/// When the primary model is rate limited the identical request is sent once
/// to `fallback_model`. Any other failure, and any failure of the fallback
/// call, is returned as is.
pub async fn generate_script(
    generator: &dyn TextGenerator,
    request: &GenerationRequest,
    fallback_model: &str,
) -> WorkerResult<Script> {
    let raw = match generator.generate(request).await {
        Ok(text) => text,
        Err(e) if e.is_rate_limited() => {
            warn!(
                "Rate limit hit on {}; falling back to {}",
                request.model, fallback_model
            );
            generator.generate(&request.with_model(fallback_model)).await?
        }
        Err(e) => return Err(e.into()),
    };

    let script = Script::parse(&raw)?;
    info!(
        "Generated script \"{}\" with {} bullets",
        script.title,
        script.bullets.len()
    );
    Ok(script)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mockall::mock;
    use mockall::predicate::function;
    use mockall::Sequence;
    use reel_ml_client::{MlError, MlResult};

    use crate::error::WorkerError;

    mock! {
        Generator {}

        #[async_trait]
        impl TextGenerator for Generator {
            async fn generate(&self, request: &GenerationRequest) -> MlResult<String>;
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new("gpt-4o-mini", "Write a script", 0.7)
    }

    fn for_model(model: &'static str) -> impl Fn(&GenerationRequest) -> bool {
        move |r: &GenerationRequest| r.model == model && r.prompt == "Write a script" && r.temperature == 0.7
    }

    #[tokio::test]
    async fn test_primary_success_skips_fallback() {
        let mut generator = MockGenerator::new();
        generator
            .expect_generate()
            .with(function(for_model("gpt-4o-mini")))
            .times(1)
            .returning(|_| Ok("Ocean facts\n- Whales sing\n- Tides pull".to_string()));

        let script = generate_script(&generator, &request(), "gpt-3.5-turbo").await.unwrap();

        assert_eq!(script.title, "Ocean facts");
        assert_eq!(script.bullets, vec!["Whales sing", "Tides pull"]);
    }

    #[tokio::test]
    async fn test_rate_limit_falls_back_exactly_once() {
        let mut seq = Sequence::new();
        let mut generator = MockGenerator::new();
        generator
            .expect_generate()
            .with(function(for_model("gpt-4o-mini")))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(MlError::RateLimited("429".to_string())));
        generator
            .expect_generate()
            .with(function(for_model("gpt-3.5-turbo")))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok("Fallback title\n- one".to_string()));

        let script = generate_script(&generator, &request(), "gpt-3.5-turbo").await.unwrap();
        assert_eq!(script.title, "Fallback title");
    }

    #[tokio::test]
    async fn test_fallback_failure_is_not_retried() {
        let mut generator = MockGenerator::new();
        generator
            .expect_generate()
            .times(2)
            .returning(|_| Err(MlError::RateLimited("429".to_string())));

        let err = generate_script(&generator, &request(), "gpt-3.5-turbo").await.unwrap_err();
        assert!(matches!(err, WorkerError::Ml(MlError::RateLimited(_))));
    }

    #[tokio::test]
    async fn test_other_errors_do_not_fall_back() {
        let mut generator = MockGenerator::new();
        generator
            .expect_generate()
            .with(function(for_model("gpt-4o-mini")))
            .times(1)
            .returning(|_| Err(MlError::RequestFailed("HTTP 500: upstream".to_string())));

        let err = generate_script(&generator, &request(), "gpt-3.5-turbo").await.unwrap_err();
        assert!(matches!(err, WorkerError::Ml(MlError::RequestFailed(_))));
    }

    #[tokio::test]
    async fn test_single_line_yields_no_bullets() {
        let mut generator = MockGenerator::new();
        generator
            .expect_generate()
            .returning(|_| Ok("Just a title".to_string()));

        let script = generate_script(&generator, &request(), "gpt-3.5-turbo").await.unwrap();
        assert_eq!(script.title, "Just a title");
        assert!(!script.has_bullets());
    }

    #[tokio::test]
    async fn test_empty_completion_is_rejected() {
        let mut generator = MockGenerator::new();
        generator.expect_generate().returning(|_| Ok("  \n ".to_string()));

        let err = generate_script(&generator, &request(), "gpt-3.5-turbo").await.unwrap_err();
        assert!(matches!(err, WorkerError::Script(_)));
    }
}
