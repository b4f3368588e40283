//! Publish job invocation input and output.

use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

/// Invocation input of the publish job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PublishEvent {
    /// Storage key to upload; today's date key when absent
    #[serde(default)]
    pub key: Option<String>,
}

impl PublishEvent {
    /// Parse an invocation payload. Unknown fields are ignored.
    pub fn from_json(payload: &str) -> serde_json::Result<Self> {
        serde_json::from_str(payload)
    }
}

/// JSON payload carried in the response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UploadedBody {
    #[serde(rename = "videoId")]
    pub video_id: String,
}

/// Structured response of the publish job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PublishResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    /// JSON-encoded [`UploadedBody`]
    pub body: String,
}

impl PublishResponse {
    /// Success response for an uploaded video.
    pub fn uploaded(video_id: impl Into<String>) -> serde_json::Result<Self> {
        let body = serde_json::to_string(&UploadedBody {
            video_id: video_id.into(),
        })?;

        Ok(Self {
            status_code: 200,
            body,
        })
    }

    /// Decode the body payload.
    pub fn uploaded_body(&self) -> serde_json::Result<UploadedBody> {
        serde_json::from_str(&self.body)
    }
}

/// JSON Schema of the publish job's input and output.
pub fn invocation_schema() -> serde_json::Value {
    serde_json::json!({
        "event": schema_for!(PublishEvent),
        "response": schema_for!(PublishResponse),
        "body": schema_for!(UploadedBody),
    })
}
