//! envstate cloud abstractions
//!
//! Traits the transition engine drives, plus the implementations that need
//! nothing beyond the operating system.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │               envstate-engine                │
//! │      (driver / reconciler / instance ops)     │
//! └───┬───────────┬───────────┬───────────┬──────┘
//!     │           │           │           │
//! ComputeProvider DnsProvider HostResolver RemoteExecutor
//!     │           │           │           │
//!  cloud-gce  cloud-route53  System      ssh CLI
//!  (gcloud)   (aws route53)  resolver
//! ```

pub mod error;
pub mod provider;
pub mod ssh;

// Re-exports
pub use error::{CloudError, Result};
pub use provider::{
    ChangeStatus, CommandOutput, ComputeProvider, DEFAULT_RECORD_TTL, DnsProvider, HostResolver,
    InstanceInfo, RecordChange, RemoteExecutor, Scope, SystemResolver,
};
pub use ssh::{SshExecutor, SshOptions, SshTarget};
