//! Shared AWS SDK configuration.

use aws_config::BehaviorVersion;
use aws_types::region::Region;
use aws_types::SdkConfig;
use tracing::debug;

/// Connection settings shared by every AWS client of a job.
///
/// Credentials come from the default provider chain (environment, profile,
/// or the execution role).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsConfig {
    /// AWS region (e.g. "eu-north-1")
    pub region: String,
}

impl AwsConfig {
    pub fn for_region(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
        }
    }
}

/// Load an SDK configuration from settings.
pub async fn load_sdk_config(config: &AwsConfig) -> SdkConfig {
    debug!("Loading AWS config for region {}", config.region);

    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.region.clone()))
        .load()
        .await
}
