//! Publishing rendered videos to the hosting platform.
//!
//! This crate provides:
//! - The OAuth refresh-token credential bundle and access-token refresh
//! - Video metadata for the insert request
//! - The resumable upload session as an explicit state machine
//!   (`ResumableUpload::next_chunk`)
//! - The `VideoHost` capability with a YouTube Data API implementation
//! - A bounded driver for the chunk loop

pub mod credentials;
pub mod driver;
pub mod error;
pub mod metadata;
pub mod upload;
pub mod youtube;

pub use credentials::{refresh_access_token, AccessToken, OAuthCredentials};
pub use driver::{drive_upload, UploadLimits};
pub use error::{PublishError, PublishResult};
pub use metadata::{MetadataTemplate, PrivacyStatus, VideoMetadata};
pub use upload::{MediaUpload, ResumableUpload, UploadStatus, UploadStep, UploadedVideo, VideoHost};
pub use youtube::{YouTubeClient, YouTubeConfig, YouTubeUpload};
