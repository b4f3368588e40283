//! Shared data models for the DailyReel pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Scripts produced by the text generator
//! - Slides and the composition plan for the rendered video
//! - Render settings (frame, codec, slide styles)
//! - Date-based storage keys shared by the render and publish jobs
//! - Publish job invocation input and output

pub mod artifact;
pub mod encoding;
pub mod publish;
pub mod script;
pub mod slide;

// Re-export common types
pub use artifact::{StorageKey, DEFAULT_EXTENSION, VIDEO_CONTENT_TYPE};
pub use encoding::{RenderSettings, Rgb, SlideStyle};
pub use publish::{invocation_schema, PublishEvent, PublishResponse, UploadedBody};
pub use script::{Script, ScriptError};
pub use slide::{CompositionPlan, Slide, SlideKind};
