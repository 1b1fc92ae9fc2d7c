//! Host resolution for remote commands

use envstate_cloud::{ComputeProvider, Result, Scope};
use envstate_core::{Instance, InstanceRequest};
use tracing::warn;

/// Host to SSH into for a declared instance.
///
/// Tried in order: the record name, the first explicit record address, then
/// the live external IP. `None` when every candidate is empty.
pub async fn instance_host(
    compute: &dyn ComputeProvider,
    scope: &Scope,
    instance: &Instance,
) -> Result<Option<String>> {
    if let Some(record) = &instance.record {
        if !record.zone.is_empty() {
            return Ok(Some(record.zone.clone()));
        }
        if let Some(ip) = record.ip.first().filter(|ip| !ip.is_empty()) {
            return Ok(Some(ip.clone()));
        }
    }

    compute.external_ip(scope, &instance.name).await
}

/// Host to SSH into after `vm start`.
///
/// Tried in order: `<record_name>.<domain>`, the external IP when requested,
/// then the first explicit address. An external IP lookup failure falls
/// back to the explicit addresses when there are any.
pub async fn request_host(
    compute: &dyn ComputeProvider,
    request: &InstanceRequest,
) -> Result<Option<String>> {
    if let Some(record) = request.record() {
        return Ok(Some(record.zone));
    }

    let explicit = request.ip.first().filter(|ip| !ip.is_empty()).cloned();

    if request.external_ip {
        let scope = Scope::new(&request.project, &request.zone);
        match compute.external_ip(&scope, &request.name).await {
            Ok(Some(ip)) => return Ok(Some(ip)),
            Ok(None) => {}
            Err(e) if explicit.is_some() => {
                warn!("external IP of {} unavailable, using --ip: {}", request.name, e);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(explicit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockWorld;
    use envstate_core::{InstanceVerb, Record};

    fn scope() -> Scope {
        Scope::new("acme", "us-east1-b")
    }

    #[tokio::test]
    async fn test_record_name_comes_first() {
        let world = MockWorld::new();
        world.add_instance("web-1", "RUNNING", "34.1.2.3");

        let mut instance = Instance::new("web-1");
        instance.record = Some(Record {
            zone: "web.example.com".to_string(),
            ip: vec!["5.6.7.8".to_string()],
            ..Default::default()
        });

        let host = instance_host(world.as_ref(), &scope(), &instance).await.unwrap();
        assert_eq!(host.as_deref(), Some("web.example.com"));
        assert!(world.calls().is_empty());
    }

    #[tokio::test]
    async fn test_explicit_ip_before_external_ip() {
        let world = MockWorld::new();
        world.add_instance("web-1", "RUNNING", "34.1.2.3");

        let mut instance = Instance::new("web-1");
        instance.record = Some(Record {
            ip: vec!["5.6.7.8".to_string()],
            ..Default::default()
        });

        let host = instance_host(world.as_ref(), &scope(), &instance).await.unwrap();
        assert_eq!(host.as_deref(), Some("5.6.7.8"));
    }

    #[tokio::test]
    async fn test_falls_back_to_external_ip() {
        let world = MockWorld::new();
        world.add_instance("web-1", "RUNNING", "34.1.2.3");

        let host = instance_host(world.as_ref(), &scope(), &Instance::new("web-1"))
            .await
            .unwrap();
        assert_eq!(host.as_deref(), Some("34.1.2.3"));
    }

    #[tokio::test]
    async fn test_no_candidate() {
        let world = MockWorld::new();
        world.add_instance("web-1", "TERMINATED", "");

        let host = instance_host(world.as_ref(), &scope(), &Instance::new("web-1"))
            .await
            .unwrap();
        assert_eq!(host, None);
    }

    #[tokio::test]
    async fn test_request_host_order() {
        let world = MockWorld::new();
        world.add_instance("web-1", "RUNNING", "34.1.2.3");

        let mut request = InstanceRequest::new(InstanceVerb::Start, "web-1", "acme", "us-east1-b");
        request.ip = vec!["5.6.7.8".to_string()];
        assert_eq!(
            request_host(world.as_ref(), &request).await.unwrap().as_deref(),
            Some("5.6.7.8")
        );

        request.external_ip = true;
        assert_eq!(
            request_host(world.as_ref(), &request).await.unwrap().as_deref(),
            Some("34.1.2.3")
        );

        request.dns.domain = "example.com".to_string();
        request.dns.record_name = "web".to_string();
        assert_eq!(
            request_host(world.as_ref(), &request).await.unwrap().as_deref(),
            Some("web.example.com")
        );
    }

    #[tokio::test]
    async fn test_request_host_external_ip_error_falls_back() {
        let world = MockWorld::new();
        world.fail("describe:web-1");

        let mut request = InstanceRequest::new(InstanceVerb::Start, "web-1", "acme", "us-east1-b");
        request.external_ip = true;
        assert!(request_host(world.as_ref(), &request).await.is_err());

        request.ip = vec!["5.6.7.8".to_string()];
        assert_eq!(
            request_host(world.as_ref(), &request).await.unwrap().as_deref(),
            Some("5.6.7.8")
        );
    }
}
