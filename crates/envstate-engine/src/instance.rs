//! Single-instance operations on an explicit project/zone

use crate::driver::Providers;
use crate::error::Result;
use crate::host::request_host;
use crate::reconcile::{DnsReconciler, ReconcileOptions};
use crate::report::{Location, Step, TransitionReport};
use crate::response::Outcome;
use crate::script::run_commands;
use envstate_cloud::Scope;
use envstate_core::{InstanceRequest, InstanceVerb};
use std::time::Instant;
use tracing::info;

/// Run a validated instance request.
///
/// `list` and `status` fail with the provider error; `start` and `stop`
/// record failures in the returned report.
pub async fn execute(
    providers: &Providers,
    options: ReconcileOptions,
    request: &InstanceRequest,
) -> Result<Outcome> {
    let scope = Scope::new(&request.project, &request.zone);

    match request.verb {
        InstanceVerb::List => {
            let instances = providers.compute.list_instances(&scope).await?;
            info!("{} instances in {}", instances.len(), scope);
            Ok(Outcome::Instances { instances })
        }
        InstanceVerb::Status => {
            let status = providers.compute.status(&scope, &request.name).await?;
            Ok(Outcome::Status {
                name: request.name.clone(),
                status,
            })
        }
        InstanceVerb::Start => Ok(Outcome::Transition {
            report: start(providers, options, &scope, request).await,
        }),
        InstanceVerb::Stop => {
            let started = Instant::now();
            let at = location(&scope, &request.name);
            let mut report = TransitionReport::new(request.verb.to_string());

            match providers.compute.stop(&scope, &request.name).await {
                Ok(()) => report.succeeded(&at, Step::Stop, format!("stopped {}", request.name)),
                Err(e) => report.failed(&at, Step::Stop, format!("stop {}: {}", request.name, e)),
            }

            report.duration_ms = started.elapsed().as_millis() as u64;
            Ok(Outcome::Transition { report })
        }
    }
}

async fn start(
    providers: &Providers,
    options: ReconcileOptions,
    scope: &Scope,
    request: &InstanceRequest,
) -> TransitionReport {
    let started = Instant::now();
    let at = location(scope, &request.name);
    let mut report = TransitionReport::new(request.verb.to_string());

    match providers.compute.start(scope, &request.name).await {
        Ok(()) => report.succeeded(&at, Step::Start, format!("started {}", request.name)),
        Err(e) => report.failed(&at, Step::Start, format!("start {}: {}", request.name, e)),
    }

    if let Some(record) = request.record() {
        let reconciler = DnsReconciler::new(
            providers.compute.clone(),
            providers.dns.clone(),
            providers.resolver.clone(),
            options,
        );
        let outcome = reconciler.reconcile(scope, &request.name, &record).await;
        report.record_dns(&at, &record, outcome);
    }

    if let Some(script) = request.script.as_ref().filter(|s| !s.trim().is_empty()) {
        match request_host(providers.compute.as_ref(), request).await {
            Ok(Some(host)) => {
                report.succeeded(&at, Step::Host, format!("using host {host}"));
                run_commands(
                    providers.remote.as_ref(),
                    &host,
                    &request.ssh,
                    std::slice::from_ref(script),
                    &at,
                    &mut report,
                )
                .await;
            }
            Ok(None) => report.skipped(
                &at,
                Step::Script,
                format!("no host for {}: script not run", request.name),
            ),
            Err(e) => report.failed(
                &at,
                Step::Host,
                format!("resolve host of {}: {}", request.name, e),
            ),
        }
    }

    report.duration_ms = started.elapsed().as_millis() as u64;
    report
}

fn location(scope: &Scope, instance: &str) -> Location {
    Location::new("", scope.to_string(), instance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::mock::MockWorld;
    use crate::report::StepStatus;
    use envstate_core::Ssh;
    use std::time::Duration;

    fn options() -> ReconcileOptions {
        ReconcileOptions {
            max_polls: 2,
            poll_interval: Duration::ZERO,
        }
    }

    fn request(verb: InstanceVerb) -> InstanceRequest {
        InstanceRequest::new(verb, "web-1", "acme", "us-east1-b")
    }

    #[tokio::test]
    async fn test_list_and_status() {
        let world = MockWorld::new();
        world.add_instance("web-1", "RUNNING", "34.1.2.3");
        world.add_instance("web-2", "TERMINATED", "");
        let providers = world.providers();

        let outcome = execute(&providers, options(), &request(InstanceVerb::List))
            .await
            .unwrap();
        match outcome {
            Outcome::Instances { instances } => assert_eq!(instances.len(), 2),
            other => panic!("unexpected outcome {other:?}"),
        }

        let outcome = execute(&providers, options(), &request(InstanceVerb::Status))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            Outcome::Status {
                name: "web-1".to_string(),
                status: "RUNNING".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_status_of_unknown_instance_is_an_error() {
        let world = MockWorld::new();
        let err = execute(&world.providers(), options(), &request(InstanceVerb::Status))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Provider(_)));
        assert_eq!(err.http_status(), 404);
    }

    #[tokio::test]
    async fn test_start_with_record_and_script() {
        let world = MockWorld::new();
        world.add_instance("web-1", "TERMINATED", "34.1.2.3");

        let mut request = request(InstanceVerb::Start);
        request.dns.domain = "example.com".to_string();
        request.dns.record_name = "web".to_string();
        request.external_ip = true;
        request.script = Some("systemctl restart app".to_string());
        request.ssh = Ssh {
            key: "/keys/id".to_string(),
            port: Some(2222),
            user: "ops".to_string(),
        };

        let outcome = execute(&world.providers(), options(), &request).await.unwrap();
        let Outcome::Transition { report } = outcome else {
            panic!("expected a transition report");
        };

        assert!(report.is_success());
        assert_eq!(world.upserts()[0].name, "web.example.com");
        assert_eq!(world.upserts()[0].values, vec!["34.1.2.3"]);
        assert_eq!(
            world.calls().last().map(String::as_str),
            Some("ssh:web.example.com:systemctl restart app")
        );
        assert_eq!(world.ssh_targets()[0].port, 2222);
    }

    #[tokio::test]
    async fn test_start_failure_is_reported_not_raised() {
        let world = MockWorld::new();
        world.fail("start:web-1");

        let outcome = execute(&world.providers(), options(), &request(InstanceVerb::Start))
            .await
            .unwrap();
        let Outcome::Transition { report } = outcome else {
            panic!("expected a transition report");
        };
        assert_eq!(report.steps.len(), 1);
        assert_eq!(report.steps[0].status, StepStatus::Failed);
    }

    #[tokio::test]
    async fn test_stop() {
        let world = MockWorld::new();
        world.add_instance("web-1", "RUNNING", "34.1.2.3");

        let outcome = execute(&world.providers(), options(), &request(InstanceVerb::Stop))
            .await
            .unwrap();
        let Outcome::Transition { report } = outcome else {
            panic!("expected a transition report");
        };
        assert!(report.is_success());
        assert_eq!(report.steps[0].location.group, "acme/us-east1-b");
        assert_eq!(world.status_of("web-1").as_deref(), Some("TERMINATED"));
    }
}
