//! Provider trait definitions

use crate::error::{CloudError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Project and zone an instance lives in
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope {
    pub project: String,
    pub zone: String,
}

impl Scope {
    pub fn new(project: impl Into<String>, zone: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            zone: zone.into(),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.project, self.zone)
    }
}

/// Live details of one compute instance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceInfo {
    pub name: String,

    /// Provider status string, e.g. `RUNNING`, `TERMINATED`
    pub status: String,

    #[serde(rename = "internal", default)]
    pub internal_ip: String,

    /// Empty unless the instance is running with an access config
    #[serde(rename = "external", default)]
    pub external_ip: String,

    #[serde(rename = "type", default)]
    pub machine_type: String,

    #[serde(default)]
    pub preemptible: bool,
}

impl InstanceInfo {
    pub fn external_ip(&self) -> Option<&str> {
        Some(self.external_ip.as_str()).filter(|ip| !ip.is_empty())
    }
}

/// Compute provider abstraction
///
/// Every call is scoped to one project/zone; instance names are unique
/// within a scope.
#[async_trait]
pub trait ComputeProvider: Send + Sync {
    /// Returns the provider name (e.g., "gce")
    fn name(&self) -> &str;

    /// All instances in the scope
    async fn list_instances(&self, scope: &Scope) -> Result<Vec<InstanceInfo>>;

    /// Live details of one instance
    async fn describe(&self, scope: &Scope, instance: &str) -> Result<InstanceInfo>;

    /// Start an instance and wait for the operation to finish
    async fn start(&self, scope: &Scope, instance: &str) -> Result<()>;

    /// Stop an instance and wait for the operation to finish
    async fn stop(&self, scope: &Scope, instance: &str) -> Result<()>;

    async fn status(&self, scope: &Scope, instance: &str) -> Result<String> {
        Ok(self.describe(scope, instance).await?.status)
    }

    /// Current external IP, `None` when the instance has none
    async fn external_ip(&self, scope: &Scope, instance: &str) -> Result<Option<String>> {
        let info = self.describe(scope, instance).await?;
        Ok(info.external_ip().map(str::to_string))
    }
}

/// One UPSERT of a record set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordChange {
    /// Domain of the hosted zone the record belongs to
    pub domain: String,

    /// Fully qualified record name
    pub name: String,

    pub record_type: String,

    pub values: Vec<String>,

    pub ttl: u32,

    pub comment: String,
}

/// Record TTL used for instance records
pub const DEFAULT_RECORD_TTL: u32 = 10;

impl RecordChange {
    pub fn upsert(
        domain: impl Into<String>,
        name: impl Into<String>,
        record_type: impl Into<String>,
        values: Vec<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            name: name.into(),
            record_type: record_type.into(),
            values,
            ttl: DEFAULT_RECORD_TTL,
            comment: "Update record to reflect new IP address for a system".to_string(),
        }
    }
}

/// Propagation status of a submitted change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeStatus {
    Pending,
    InSync,
}

/// DNS provider abstraction
#[async_trait]
pub trait DnsProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Submit an UPSERT; returns the change ID to poll
    async fn upsert_record(&self, change: &RecordChange) -> Result<String>;

    async fn change_status(&self, change_id: &str) -> Result<ChangeStatus>;
}

/// Standard name resolution
#[async_trait]
pub trait HostResolver: Send + Sync {
    /// Addresses `host` currently resolves to
    async fn lookup(&self, host: &str) -> Result<Vec<String>>;
}

/// Resolver backed by the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

#[async_trait]
impl HostResolver for SystemResolver {
    async fn lookup(&self, host: &str) -> Result<Vec<String>> {
        let addrs = tokio::net::lookup_host(format!("{host}:0"))
            .await
            .map_err(|e| CloudError::LookupFailed {
                host: host.to_string(),
                message: e.to_string(),
            })?;

        let mut ips: Vec<String> = Vec::new();
        for addr in addrs {
            let ip = addr.ip().to_string();
            if !ips.contains(&ip) {
                ips.push(ip);
            }
        }

        tracing::debug!(host = %host, ips = ?ips, "Resolved host");
        Ok(ips)
    }
}

/// Output of a remote command
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs shell commands on a remote host
#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    async fn run(&self, target: &crate::SshTarget, command: &str) -> Result<CommandOutput>;
}
