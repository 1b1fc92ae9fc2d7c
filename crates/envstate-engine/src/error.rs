//! Engine error types

use envstate_cloud::CloudError;
use envstate_core::EnvError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Environment(#[from] EnvError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("provider error: {0}")]
    Provider(#[from] CloudError),

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// Error reported by a remote server, message passed through verbatim
    #[error("{message}")]
    Remote { status: u16, message: String },
}

/// How bad an error is, independent of where it surfaced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Bad flags, unreadable document, template failure
    Config,
    /// Named environment absent or label matched nothing
    NotFound,
    /// The provider answer was the point of the request
    Provider,
    /// The remote server could not be reached or answered garbage
    Remote,
}

impl EngineError {
    pub fn severity(&self) -> Severity {
        match self {
            EngineError::Environment(e) if e.is_not_found() => Severity::NotFound,
            EngineError::Environment(_) | EngineError::InvalidRequest(_) => Severity::Config,
            EngineError::Provider(CloudError::InstanceNotFound(_)) => Severity::NotFound,
            EngineError::Provider(_) => Severity::Provider,
            EngineError::Transport { .. } => Severity::Remote,
            EngineError::Remote { status, .. } => match status {
                400 | 405 => Severity::Config,
                404 => Severity::NotFound,
                _ => Severity::Remote,
            },
        }
    }

    /// Status code used by the HTTP front end
    pub fn http_status(&self) -> u16 {
        match self.severity() {
            Severity::Config => 400,
            Severity::NotFound => 404,
            Severity::Provider | Severity::Remote => 502,
        }
    }
}

/// DNS reconciliation failures
#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error(transparent)]
    Provider(#[from] CloudError),

    /// The upsert went through but never reported INSYNC
    #[error("record {record} not in sync after {polls} polls (change {change_id})")]
    Timeout {
        record: String,
        change_id: String,
        polls: u32,
    },
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_mapping() {
        let not_found = EngineError::from(EnvError::NoLabelMatch("prod".to_string()));
        assert_eq!(not_found.severity(), Severity::NotFound);
        assert_eq!(not_found.http_status(), 404);

        let config = EngineError::from(EnvError::InvalidConfig("bad".to_string()));
        assert_eq!(config.severity(), Severity::Config);
        assert_eq!(config.http_status(), 400);

        let provider = EngineError::from(CloudError::ApiError("quota".to_string()));
        assert_eq!(provider.http_status(), 502);

        let transport = EngineError::Transport {
            url: "http://peer:8080".to_string(),
            message: "connection refused".to_string(),
        };
        assert_eq!(transport.severity(), Severity::Remote);
    }

    #[test]
    fn test_remote_message_passes_through() {
        let remote = EngineError::Remote {
            status: 404,
            message: "environment \"api\" with label \"prod\" not found".to_string(),
        };
        assert_eq!(remote.severity(), Severity::NotFound);
        assert_eq!(
            remote.to_string(),
            "environment \"api\" with label \"prod\" not found"
        );
    }
}
