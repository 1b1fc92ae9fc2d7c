//! Compute Engine provider error types

use envstate_cloud::CloudError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GceError {
    #[error("gcloud not found. Please install the Google Cloud SDK: https://cloud.google.com/sdk/docs/install")]
    GcloudNotFound,

    #[error("gcloud authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("gcloud command failed: {0}")]
    CommandFailed(String),

    #[error("Instance not found: {0}")]
    InstanceNotFound(String),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<GceError> for CloudError {
    fn from(e: GceError) -> Self {
        match e {
            GceError::InstanceNotFound(name) => CloudError::InstanceNotFound(name),
            GceError::AuthenticationFailed(msg) => CloudError::AuthenticationFailed(msg),
            GceError::CommandFailed(msg) => CloudError::CommandFailed(msg),
            GceError::JsonError(e) => CloudError::Json(e),
            GceError::IoError(e) => CloudError::Io(e),
            other => CloudError::ApiError(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, GceError>;
