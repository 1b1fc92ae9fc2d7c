//! Route 53 provider error types

use aws_sdk_route53::error::{BuildError, DisplayErrorContext, SdkError};
use envstate_cloud::CloudError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Route53Error {
    #[error("aws authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Route 53 API error: {0}")]
    Api(String),

    #[error("Hosted zone not found for domain: {0}")]
    HostedZoneNotFound(String),

    #[error("invalid record change: {0}")]
    InvalidChange(#[from] BuildError),

    #[error("Route 53 response carried no change info")]
    MissingChangeInfo,
}

const AUTH_MARKERS: [&str; 4] = [
    "credentials",
    "InvalidClientTokenId",
    "ExpiredToken",
    "AccessDenied",
];

impl<E, R> From<SdkError<E, R>> for Route53Error
where
    E: std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    fn from(e: SdkError<E, R>) -> Self {
        let message = DisplayErrorContext(e).to_string();
        if AUTH_MARKERS.iter().any(|marker| message.contains(marker)) {
            Route53Error::AuthenticationFailed(message)
        } else {
            Route53Error::Api(message)
        }
    }
}

impl From<Route53Error> for CloudError {
    fn from(e: Route53Error) -> Self {
        match e {
            Route53Error::HostedZoneNotFound(domain) => CloudError::HostedZoneNotFound(domain),
            Route53Error::AuthenticationFailed(msg) => CloudError::AuthenticationFailed(msg),
            Route53Error::InvalidChange(e) => CloudError::InvalidConfig(e.to_string()),
            other => CloudError::ApiError(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Route53Error>;
