//! Compute Engine provider implementation

use crate::gcloud::Gcloud;
use async_trait::async_trait;
use envstate_cloud::{ComputeProvider, InstanceInfo, Scope};
use tracing::info;

/// Compute Engine provider
///
/// Stateless: the project and zone come with every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct GceProvider;

impl GceProvider {
    pub fn new() -> Self {
        Self
    }

    fn gcloud(scope: &Scope) -> Gcloud {
        Gcloud::new(&scope.project, &scope.zone)
    }
}

#[async_trait]
impl ComputeProvider for GceProvider {
    fn name(&self) -> &str {
        "gce"
    }

    async fn list_instances(&self, scope: &Scope) -> envstate_cloud::Result<Vec<InstanceInfo>> {
        let instances = Self::gcloud(scope).list_instances().await?;
        Ok(instances.into_iter().map(InstanceInfo::from).collect())
    }

    async fn describe(&self, scope: &Scope, instance: &str) -> envstate_cloud::Result<InstanceInfo> {
        Ok(Self::gcloud(scope).describe(instance).await?.into())
    }

    async fn start(&self, scope: &Scope, instance: &str) -> envstate_cloud::Result<()> {
        info!(instance = %instance, scope = %scope, "Starting instance");
        Self::gcloud(scope).start(instance).await?;
        Ok(())
    }

    async fn stop(&self, scope: &Scope, instance: &str) -> envstate_cloud::Result<()> {
        info!(instance = %instance, scope = %scope, "Stopping instance");
        Self::gcloud(scope).stop(instance).await?;
        Ok(())
    }
}
