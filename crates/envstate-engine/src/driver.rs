//! State transition driver
//!
//! Walks environments, groups and instances in declaration order and brings
//! each instance up or down. Provider failures are recorded in the report
//! and never stop the walk.

use crate::host::instance_host;
use crate::reconcile::{DnsReconciler, ReconcileOptions};
use crate::report::{Location, Step, TransitionReport};
use crate::script::run_commands;
use envstate_cloud::{ComputeProvider, DnsProvider, HostResolver, RemoteExecutor, Scope};
use envstate_core::{Environment, Group, Instance, Ssh, Verb};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};

/// The four collaborators of a transition
#[derive(Clone)]
pub struct Providers {
    pub compute: Arc<dyn ComputeProvider>,
    pub dns: Arc<dyn DnsProvider>,
    pub resolver: Arc<dyn HostResolver>,
    pub remote: Arc<dyn RemoteExecutor>,
}

pub struct StateDriver {
    providers: Providers,
    reconciler: DnsReconciler,
}

/// One batch of commands sharing SSH settings
struct Batch<'a> {
    commands: &'a [String],
    ssh: Ssh,
}

impl StateDriver {
    pub fn new(providers: Providers, options: ReconcileOptions) -> Self {
        let reconciler = DnsReconciler::new(
            providers.compute.clone(),
            providers.dns.clone(),
            providers.resolver.clone(),
            options,
        );
        Self {
            providers,
            reconciler,
        }
    }

    pub fn providers(&self) -> &Providers {
        &self.providers
    }

    /// Run `verb` over `environments`. `Show` is not a transition and yields
    /// an empty report.
    pub async fn transition(&self, verb: Verb, environments: &[&Environment]) -> TransitionReport {
        match verb {
            Verb::Up => self.up(environments).await,
            Verb::Down => self.down(environments).await,
            Verb::Show => TransitionReport::new(verb.to_string()),
        }
    }

    pub async fn up(&self, environments: &[&Environment]) -> TransitionReport {
        self.run(Verb::Up, environments).await
    }

    pub async fn down(&self, environments: &[&Environment]) -> TransitionReport {
        self.run(Verb::Down, environments).await
    }

    async fn run(&self, verb: Verb, environments: &[&Environment]) -> TransitionReport {
        let started = Instant::now();
        let mut report = TransitionReport::new(verb.to_string());

        for env in environments {
            info!(environment = %env.name, label = %env.label, "{} environment", verb);
            report.environments.push(env.name.clone());

            for group in &env.groups {
                let scope = Scope::new(&group.project, &group.zone);
                for instance in group.instances() {
                    let at = Location::new(&env.name, &group.name, &instance.name);
                    match verb {
                        Verb::Up => self.instance_up(&scope, group, instance, &at, &mut report).await,
                        Verb::Down => {
                            self.instance_down(&scope, group, instance, &at, &mut report)
                                .await
                        }
                        Verb::Show => {}
                    }
                }
            }
        }

        report.duration_ms = started.elapsed().as_millis() as u64;
        info!("{} finished: {}", verb, report.summary());
        report
    }

    #[instrument(skip_all, fields(instance = %instance.name))]
    async fn instance_up(
        &self,
        scope: &Scope,
        group: &Group,
        instance: &Instance,
        at: &Location,
        report: &mut TransitionReport,
    ) {
        match self.providers.compute.start(scope, &instance.name).await {
            Ok(()) => report.succeeded(at, Step::Start, format!("started {}", instance.name)),
            Err(e) => report.failed(at, Step::Start, format!("start {}: {}", instance.name, e)),
        }

        match instance.dns_record() {
            Some(record) => {
                let outcome = self.reconciler.reconcile(scope, &instance.name, record).await;
                report.record_dns(at, record, outcome);
            }
            None => report.skipped(at, Step::Dns, "no DNS record declared"),
        }

        let batches = [
            Batch {
                commands: group.script().map_or(&[][..], |s| s.up.as_slice()),
                ssh: group.group_ssh(),
            },
            Batch {
                commands: instance.script.as_ref().map_or(&[][..], |s| s.up.as_slice()),
                ssh: group.instance_ssh(instance),
            },
        ];
        self.run_batches(scope, instance, &batches, at, report).await;
    }

    #[instrument(skip_all, fields(instance = %instance.name))]
    async fn instance_down(
        &self,
        scope: &Scope,
        group: &Group,
        instance: &Instance,
        at: &Location,
        report: &mut TransitionReport,
    ) {
        let batches = [
            Batch {
                commands: instance.script.as_ref().map_or(&[][..], |s| s.down.as_slice()),
                ssh: group.instance_ssh(instance),
            },
            Batch {
                commands: group.script().map_or(&[][..], |s| s.down.as_slice()),
                ssh: group.group_ssh(),
            },
        ];
        self.run_batches(scope, instance, &batches, at, report).await;

        match self.providers.compute.stop(scope, &instance.name).await {
            Ok(()) => report.succeeded(at, Step::Stop, format!("stopped {}", instance.name)),
            Err(e) => report.failed(at, Step::Stop, format!("stop {}: {}", instance.name, e)),
        }
    }

    /// Resolve the host once, then run every batch against it.
    async fn run_batches(
        &self,
        scope: &Scope,
        instance: &Instance,
        batches: &[Batch<'_>],
        at: &Location,
        report: &mut TransitionReport,
    ) {
        let total: usize = batches.iter().map(|b| b.commands.len()).sum();
        if total == 0 {
            return;
        }

        let host = match instance_host(self.providers.compute.as_ref(), scope, instance).await {
            Ok(Some(host)) => host,
            Ok(None) => {
                report.skipped(
                    at,
                    Step::Script,
                    format!(
                        "no host for {}: {} command(s) not run",
                        instance.name, total
                    ),
                );
                return;
            }
            Err(e) => {
                report.failed(
                    at,
                    Step::Host,
                    format!("resolve host of {}: {}", instance.name, e),
                );
                return;
            }
        };
        report.succeeded(at, Step::Host, format!("using host {host}"));

        for batch in batches {
            run_commands(
                self.providers.remote.as_ref(),
                &host,
                &batch.ssh,
                batch.commands,
                at,
                report,
            )
            .await;
        }
    }
}
