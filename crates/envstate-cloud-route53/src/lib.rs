//! Amazon Route 53 provider for envstate
//!
//! Implements [`envstate_cloud::DnsProvider`] on the AWS SDK. Credentials
//! and region come from the SDK's default chain (`AWS_PROFILE`, environment
//! variables, `~/.aws/credentials`).

pub mod aws;
pub mod dns;
pub mod error;

pub use dns::Route53Dns;
pub use error::{Result, Route53Error};
