//! gcloud CLI wrapper
//!
//! Wraps `gcloud compute instances` for one project/zone.

use crate::error::{GceError, Result};
use envstate_cloud::InstanceInfo;
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use tokio::process::Command;

/// gcloud CLI wrapper
pub struct Gcloud {
    project: String,
    zone: String,
}

impl Gcloud {
    pub fn new(project: impl Into<String>, zone: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            zone: zone.into(),
        }
    }

    /// Run a `gcloud compute instances` subcommand and return stdout
    async fn run_command(&self, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new("gcloud");
        cmd.args(["compute", "instances"]);
        cmd.args(args);
        cmd.arg("--project").arg(&self.project);
        cmd.arg("--quiet");
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!(
            "Running: gcloud compute instances {} --project {}",
            args.join(" "),
            self.project
        );

        let output = cmd.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                GceError::GcloudNotFound
            } else {
                GceError::IoError(e)
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(classify_failure(stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// List every instance in the zone
    pub async fn list_instances(&self) -> Result<Vec<GceInstance>> {
        let output = self
            .run_command(&["list", "--zones", &self.zone, "--format", "json"])
            .await?;

        if output.trim().is_empty() || output.trim() == "[]" {
            return Ok(Vec::new());
        }

        let instances: Vec<GceInstance> = serde_json::from_str(&output)?;
        Ok(instances)
    }

    /// Describe one instance
    pub async fn describe(&self, name: &str) -> Result<GceInstance> {
        let output = self
            .run_command(&["describe", name, "--zone", &self.zone, "--format", "json"])
            .await
            .map_err(|e| not_found_as(e, name))?;

        let instance: GceInstance = serde_json::from_str(&output)?;
        Ok(instance)
    }

    /// Start an instance (blocks until the operation completes)
    pub async fn start(&self, name: &str) -> Result<()> {
        self.run_command(&["start", name, "--zone", &self.zone])
            .await
            .map_err(|e| not_found_as(e, name))?;
        Ok(())
    }

    /// Stop an instance (blocks until the operation completes)
    pub async fn stop(&self, name: &str) -> Result<()> {
        self.run_command(&["stop", name, "--zone", &self.zone])
            .await
            .map_err(|e| not_found_as(e, name))?;
        Ok(())
    }
}

fn classify_failure(stderr: String) -> GceError {
    let lower = stderr.to_lowercase();
    if lower.contains("was not found") || lower.contains("notfound") {
        GceError::InstanceNotFound(stderr)
    } else if lower.contains("gcloud auth login") || lower.contains("credentials") {
        GceError::AuthenticationFailed(stderr)
    } else {
        GceError::CommandFailed(stderr)
    }
}

fn not_found_as(e: GceError, name: &str) -> GceError {
    match e {
        GceError::InstanceNotFound(_) => GceError::InstanceNotFound(name.to_string()),
        other => other,
    }
}

/// Instance resource as printed by `--format json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GceInstance {
    pub name: String,

    pub status: String,

    /// Full machine type URL
    #[serde(default)]
    pub machine_type: String,

    #[serde(default)]
    pub network_interfaces: Vec<NetworkInterface>,

    #[serde(default)]
    pub scheduling: Scheduling,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterface {
    #[serde(rename = "networkIP", default)]
    pub network_ip: Option<String>,

    #[serde(default)]
    pub access_configs: Vec<AccessConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessConfig {
    #[serde(rename = "natIP", default)]
    pub nat_ip: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scheduling {
    #[serde(default)]
    pub preemptible: bool,
}

impl GceInstance {
    /// Short machine type, e.g. `e2-small`
    pub fn machine_type_name(&self) -> &str {
        self.machine_type
            .rsplit('/')
            .next()
            .unwrap_or(&self.machine_type)
    }

    pub fn internal_ip(&self) -> Option<&str> {
        self.network_interfaces.first()?.network_ip.as_deref()
    }

    /// NAT IP of the first access config; only reported while running
    pub fn external_ip(&self) -> Option<&str> {
        if self.status != "RUNNING" {
            return None;
        }
        self.network_interfaces
            .first()?
            .access_configs
            .first()?
            .nat_ip
            .as_deref()
    }
}

impl From<GceInstance> for InstanceInfo {
    fn from(instance: GceInstance) -> Self {
        Self {
            internal_ip: instance.internal_ip().unwrap_or_default().to_string(),
            external_ip: instance.external_ip().unwrap_or_default().to_string(),
            machine_type: instance.machine_type_name().to_string(),
            preemptible: instance.scheduling.preemptible,
            status: instance.status,
            name: instance.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RUNNING: &str = r#"{
  "name": "web-1",
  "status": "RUNNING",
  "machineType": "https://www.googleapis.com/compute/v1/projects/acme/zones/us-east1-b/machineTypes/e2-small",
  "networkInterfaces": [
    {
      "networkIP": "10.142.0.2",
      "accessConfigs": [{"name": "External NAT", "natIP": "34.75.1.2", "type": "ONE_TO_ONE_NAT"}]
    }
  ],
  "scheduling": {"automaticRestart": false, "preemptible": true},
  "zone": "https://www.googleapis.com/compute/v1/projects/acme/zones/us-east1-b"
}"#;

    #[test]
    fn test_parse_running_instance() {
        let instance: GceInstance = serde_json::from_str(RUNNING).unwrap();
        assert_eq!(instance.machine_type_name(), "e2-small");
        assert_eq!(instance.internal_ip(), Some("10.142.0.2"));
        assert_eq!(instance.external_ip(), Some("34.75.1.2"));

        let info = InstanceInfo::from(instance);
        assert_eq!(info.name, "web-1");
        assert_eq!(info.status, "RUNNING");
        assert_eq!(info.external_ip, "34.75.1.2");
        assert!(info.preemptible);
    }

    #[test]
    fn test_stopped_instance_has_no_external_ip() {
        let doc = r#"{
  "name": "db-1",
  "status": "TERMINATED",
  "machineType": "zones/us-east1-b/machineTypes/n2-standard-4",
  "networkInterfaces": [{"networkIP": "10.142.0.9", "accessConfigs": [{"name": "External NAT"}]}]
}"#;
        let instance: GceInstance = serde_json::from_str(doc).unwrap();
        assert_eq!(instance.external_ip(), None);

        let info = InstanceInfo::from(instance);
        assert_eq!(info.external_ip, "");
        assert_eq!(info.machine_type, "n2-standard-4");
        assert!(!info.preemptible);
    }

    #[test]
    fn test_instance_without_interfaces() {
        let instance: GceInstance =
            serde_json::from_str(r#"{"name": "x", "status": "PROVISIONING"}"#).unwrap();
        assert_eq!(instance.internal_ip(), None);
        assert_eq!(instance.machine_type_name(), "");
    }

    #[test]
    fn test_classify_failure() {
        assert!(matches!(
            classify_failure("ERROR: The resource 'projects/acme/zones/z/instances/x' was not found".to_string()),
            GceError::InstanceNotFound(_)
        ));
        assert!(matches!(
            classify_failure("You do not currently have an active account selected. Please run: gcloud auth login".to_string()),
            GceError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            classify_failure("ERROR: quota exceeded".to_string()),
            GceError::CommandFailed(_)
        ));
    }
}
