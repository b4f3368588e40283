//! Video metadata sent with the insert request.

use serde::{Deserialize, Serialize};

use reel_models::StorageKey;

/// Visibility of the published video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyStatus {
    Public,
    Unlisted,
    Private,
}

/// Fixed metadata applied to every daily upload.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataTemplate {
    pub title_prefix: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category_id: String,
    pub privacy: PrivacyStatus,
}

impl Default for MetadataTemplate {
    fn default() -> Self {
        Self {
            title_prefix: "Daily Video — ".to_string(),
            description: "Automated daily upload".to_string(),
            tags: vec!["daily".to_string(), "automation".to_string()],
            category_id: "22".to_string(),
            privacy: PrivacyStatus::Public,
        }
    }
}

impl MetadataTemplate {
    /// Metadata for the artifact stored under `key`.
    ///
    /// The title is the prefix followed by the key without its extension.
    pub fn for_key(&self, key: &StorageKey, extension: &str) -> VideoMetadata {
        VideoMetadata {
            snippet: Snippet {
                title: format!("{}{}", self.title_prefix, key.stem(extension)),
                description: self.description.clone(),
                tags: self.tags.clone(),
                category_id: self.category_id.clone(),
            },
            status: Status {
                privacy_status: self.privacy,
            },
        }
    }
}

/// Video resource body (`part=snippet,status`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub snippet: Snippet,
    pub status: Status,
}

impl VideoMetadata {
    pub fn title(&self) -> &str {
        &self.snippet.title
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub privacy_status: PrivacyStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_title_strips_extension() {
        let key = StorageKey::new("2025-06-15.mp4");
        let metadata = MetadataTemplate::default().for_key(&key, ".mp4");
        assert_eq!(metadata.title(), "Daily Video — 2025-06-15");
    }

    #[test]
    fn test_serializes_resource_body() {
        let key = StorageKey::new("2025-06-15.mp4");
        let value = serde_json::to_value(MetadataTemplate::default().for_key(&key, ".mp4")).unwrap();

        assert_eq!(
            value,
            json!({
                "snippet": {
                    "title": "Daily Video — 2025-06-15",
                    "description": "Automated daily upload",
                    "tags": ["daily", "automation"],
                    "categoryId": "22"
                },
                "status": {"privacyStatus": "public"}
            })
        );
    }
}
