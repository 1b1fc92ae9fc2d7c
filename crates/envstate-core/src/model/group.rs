//! Group and resource definitions

use super::instance::{Instance, Script, Ssh};
use serde::{Deserialize, Serialize};

/// A project/zone scoped collection of instances
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,

    /// Cloud project ID
    #[serde(default)]
    pub project: String,

    /// Compute zone, e.g. `us-east1-b`
    #[serde(default)]
    pub zone: String,

    #[serde(default)]
    pub resource: Resource,
}

impl Group {
    pub fn instances(&self) -> &[Instance] {
        &self.resource.vm.instances
    }

    /// Group-level script shared by every instance
    pub fn script(&self) -> Option<&Script> {
        self.resource.vm.script.as_ref()
    }

    /// SSH settings for an instance-level command: the instance's own values,
    /// completed field by field from the group script.
    pub fn instance_ssh(&self, instance: &Instance) -> Ssh {
        let group_ssh = self.group_ssh();
        match instance.script.as_ref().and_then(|s| s.ssh.as_ref()) {
            Some(ssh) => ssh.or(&group_ssh),
            None => group_ssh,
        }
    }

    /// SSH settings for a group-level command
    pub fn group_ssh(&self) -> Ssh {
        self.script()
            .and_then(|s| s.ssh.clone())
            .unwrap_or_default()
    }
}

/// Resources declared in a group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default)]
    pub vm: VmResource,
}

/// Virtual machine resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VmResource {
    #[serde(rename = "instance", default)]
    pub instances: Vec<Instance>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<Script>,
}
