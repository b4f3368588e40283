//! Daily video pipeline jobs.
//!
//! This crate provides:
//! - `DailyConfig` with the deployment constants and env overrides
//! - Script generation with a single rate-limit fallback
//! - `RenderJob`: script, narration, composition, storage upload
//! - `PublishJob`: credentials, artifact fetch, resumable upload
//! - Structured job logging

pub mod config;
pub mod error;
pub mod logging;
pub mod publish_job;
pub mod render_job;
pub mod script;

pub use config::DailyConfig;
pub use error::{WorkerError, WorkerResult};
pub use logging::JobLogger;
pub use publish_job::{PublishJob, PublishServices, PublishState};
pub use render_job::{RenderJob, RenderOutcome, RenderServices};
pub use script::generate_script;
