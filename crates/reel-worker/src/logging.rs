//! Structured job logging utilities.
//!
//! Every lifecycle line of a run carries the same `run_id` and `operation`
//! fields so the render and publish runs of one day can be told apart.

use tracing::{error, info, warn, Span};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

/// Filter directives added on top of `RUST_LOG`.
///
/// Targets are matched by prefix: `reel` covers every `reel_*` crate and
/// `dailyreel` covers the binary itself.
pub const DEFAULT_LOG_DIRECTIVES: &[&str] = &["reel=info", "dailyreel=info", "aws_config=warn"];

/// Install the global subscriber.
///
/// Log lines go to stderr so stdout carries only the job response.
/// `LOG_FORMAT=json` switches to JSON lines.
pub fn init_tracing() -> anyhow::Result<()> {
    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = DEFAULT_LOG_DIRECTIVES
        .iter()
        .try_fold(EnvFilter::from_default_env(), |filter, directive| {
            Ok::<_, tracing_subscriber::filter::ParseError>(filter.add_directive(directive.parse()?))
        })?;

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .try_init()?;
    }

    Ok(())
}

/// Job logger for structured logging with consistent formatting.
#[derive(Debug, Clone)]
pub struct JobLogger {
    run_id: String,
    operation: String,
}

impl JobLogger {
    /// Create a logger for a new run of `operation` (e.g. "render", "publish").
    pub fn new(operation: &str) -> Self {
        Self::with_run_id(&Uuid::new_v4().to_string(), operation)
    }

    /// Create a logger for an existing run.
    pub fn with_run_id(run_id: &str, operation: &str) -> Self {
        Self {
            run_id: run_id.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            operation = %self.operation,
            "Job started: {}", message
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            operation = %self.operation,
            "Job progress: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            run_id = %self.run_id,
            operation = %self.operation,
            "Job warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            run_id = %self.run_id,
            operation = %self.operation,
            "Job error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            operation = %self.operation,
            "Job completed: {}", message
        );
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Span carrying the run fields, for instrumenting a whole run.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "job",
            run_id = %self.run_id,
            operation = %self.operation
        )
    }
}
