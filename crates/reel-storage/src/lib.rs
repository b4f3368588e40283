//! Blob store and secret store clients.
//!
//! This crate provides:
//! - Shared AWS SDK configuration loading
//! - The `BlobStore` capability with an S3 implementation
//! - The `SecretStore` capability with a Secrets Manager implementation
//! - In-memory implementations of both for tests and dry runs

pub mod aws;
pub mod blob;
pub mod client;
pub mod error;
pub mod secrets;

pub use aws::{load_sdk_config, AwsConfig};
pub use blob::{BlobStore, MemoryBlobStore, StoredObject};
pub use client::{S3Client, S3Config};
pub use error::{StorageError, StorageResult};
pub use secrets::{MemorySecretStore, SecretStore, SecretsManagerClient};
