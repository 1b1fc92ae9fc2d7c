//! Google Compute Engine provider for envstate
//!
//! Implements [`envstate_cloud::ComputeProvider`] on top of the `gcloud`
//! CLI.
//!
//! # Requirements
//!
//! - `gcloud` must be installed and authenticated (`gcloud auth login` or
//!   a service account via `GOOGLE_APPLICATION_CREDENTIALS`)
//!
//! # Example
//!
//! ```ignore
//! use envstate_cloud::{ComputeProvider, Scope};
//! use envstate_cloud_gce::GceProvider;
//!
//! let scope = Scope::new("acme-staging", "us-east1-b");
//! let status = GceProvider::new().status(&scope, "web-1").await?;
//! ```

pub mod error;
pub mod gcloud;
pub mod provider;

pub use error::{GceError, Result};
pub use gcloud::{Gcloud, GceInstance};
pub use provider::GceProvider;
