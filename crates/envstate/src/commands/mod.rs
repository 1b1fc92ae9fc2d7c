pub mod env;
pub mod serve;
pub mod vm;

use envstate_cloud::{SshExecutor, SshOptions, SystemResolver};
use envstate_cloud_gce::GceProvider;
use envstate_cloud_route53::Route53Dns;
use envstate_engine::{Dispatcher, LocalExecutor, Providers, ReconcileOptions, RemoteClient};
use std::sync::Arc;

/// Executor backed by gcloud, Route 53, the system resolver and ssh
pub fn local_executor() -> LocalExecutor {
    let providers = Providers {
        compute: Arc::new(GceProvider::new()),
        dns: Arc::new(Route53Dns::new()),
        resolver: Arc::new(SystemResolver),
        remote: Arc::new(SshExecutor::new(SshOptions::default())),
    };
    LocalExecutor::new(providers, ReconcileOptions::default())
}

pub fn dispatcher(host: Option<&str>) -> Dispatcher {
    match host.filter(|h| !h.is_empty()) {
        Some(host) => Dispatcher::Remote(RemoteClient::new(host)),
        None => Dispatcher::Local(local_executor()),
    }
}
