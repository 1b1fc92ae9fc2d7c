//! Environment show: declared topology joined with live instance details

use envstate_cloud::{ComputeProvider, InstanceInfo, Scope};
use envstate_core::Environment;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentView {
    pub name: String,

    #[serde(default)]
    pub label: String,

    #[serde(rename = "group", default)]
    pub groups: Vec<GroupView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupView {
    pub name: String,
    pub project: String,
    pub zone: String,

    /// Live details of the declared instances that exist
    #[serde(rename = "vm", default)]
    pub instances: Vec<InstanceInfo>,

    /// Declared instances missing from the provider, or the listing error
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// List each group's project/zone once and keep the declared instances,
/// in declaration order.
pub async fn show_environment(compute: &dyn ComputeProvider, env: &Environment) -> EnvironmentView {
    let mut groups = Vec::with_capacity(env.groups.len());

    for group in &env.groups {
        let scope = Scope::new(&group.project, &group.zone);
        let mut view = GroupView {
            name: group.name.clone(),
            project: group.project.clone(),
            zone: group.zone.clone(),
            instances: Vec::new(),
            errors: Vec::new(),
        };

        match compute.list_instances(&scope).await {
            Ok(live) => {
                for declared in group.instances() {
                    match live.iter().find(|info| info.name == declared.name) {
                        Some(info) => view.instances.push(info.clone()),
                        None => view
                            .errors
                            .push(format!("instance {} not found in {}", declared.name, scope)),
                    }
                }
            }
            Err(e) => {
                warn!(group = %group.name, "failed to list {}: {}", scope, e);
                view.errors.push(format!("list {scope}: {e}"));
            }
        }

        groups.push(view);
    }

    EnvironmentView {
        name: env.name.clone(),
        label: env.label.clone(),
        groups,
    }
}
