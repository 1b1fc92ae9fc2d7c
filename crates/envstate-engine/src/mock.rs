//! In-memory providers for tests
//!
//! One `MockWorld` plays compute, DNS, resolver and SSH at once so that a
//! single call log captures the cross-provider ordering.

use crate::driver::Providers;
use async_trait::async_trait;
use envstate_cloud::{
    ChangeStatus, CloudError, CommandOutput, ComputeProvider, DnsProvider, HostResolver,
    InstanceInfo, RecordChange, RemoteExecutor, Result, Scope, SshTarget,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub struct WorldState {
    pub instances: BTreeMap<String, InstanceInfo>,
    pub records: HashMap<String, Vec<String>>,
    pub calls: Vec<String>,
    pub upserts: Vec<RecordChange>,
    pub ssh_targets: Vec<SshTarget>,
    /// Keys such as `start:web-1`, `ssh:uptime`, `upsert`, `describe:web-1`
    pub failing: HashSet<String>,
    /// Number of `get-change` polls answered PENDING before INSYNC
    pub pending_polls: u32,
    pub polls: u32,
}

#[derive(Default)]
pub struct MockWorld {
    state: Mutex<WorldState>,
}

impl MockWorld {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn providers(self: &Arc<Self>) -> Providers {
        Providers {
            compute: self.clone(),
            dns: self.clone(),
            resolver: self.clone(),
            remote: self.clone(),
        }
    }

    pub fn add_instance(&self, name: &str, status: &str, external_ip: &str) {
        self.state().instances.insert(
            name.to_string(),
            InstanceInfo {
                name: name.to_string(),
                status: status.to_string(),
                internal_ip: "10.0.0.2".to_string(),
                external_ip: external_ip.to_string(),
                machine_type: "e2-small".to_string(),
                preemptible: false,
            },
        );
    }

    pub fn set_record(&self, name: &str, ips: &[&str]) {
        self.state()
            .records
            .insert(name.to_string(), ips.iter().map(|s| s.to_string()).collect());
    }

    pub fn fail(&self, key: &str) {
        self.state().failing.insert(key.to_string());
    }

    pub fn set_pending_polls(&self, polls: u32) {
        self.state().pending_polls = polls;
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn upserts(&self) -> Vec<RecordChange> {
        self.state().upserts.clone()
    }

    pub fn ssh_targets(&self) -> Vec<SshTarget> {
        self.state().ssh_targets.clone()
    }

    pub fn status_of(&self, name: &str) -> Option<String> {
        self.state().instances.get(name).map(|i| i.status.clone())
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, WorldState> {
        self.state.lock().unwrap()
    }

    fn call(&self, call: String) -> bool {
        let mut state = self.state();
        state.calls.push(call.clone());
        let key = call.split_once(':').map(|(verb, rest)| match verb {
            // ssh calls are keyed by command only
            "ssh" => format!("ssh:{}", rest.split_once(':').map_or(rest, |(_, c)| c)),
            _ => call.clone(),
        });
        key.is_some_and(|k| state.failing.contains(&k)) || state.failing.contains(&call)
    }
}

#[async_trait]
impl ComputeProvider for MockWorld {
    fn name(&self) -> &str {
        "mock"
    }

    async fn list_instances(&self, scope: &Scope) -> Result<Vec<InstanceInfo>> {
        if self.call(format!("list:{scope}")) {
            return Err(CloudError::ApiError("list failed".to_string()));
        }
        Ok(self.state().instances.values().cloned().collect())
    }

    async fn describe(&self, _scope: &Scope, instance: &str) -> Result<InstanceInfo> {
        if self.call(format!("describe:{instance}")) {
            return Err(CloudError::ApiError("describe failed".to_string()));
        }
        self.state()
            .instances
            .get(instance)
            .cloned()
            .ok_or_else(|| CloudError::InstanceNotFound(instance.to_string()))
    }

    async fn start(&self, _scope: &Scope, instance: &str) -> Result<()> {
        if self.call(format!("start:{instance}")) {
            return Err(CloudError::ApiError("start failed".to_string()));
        }
        match self.state().instances.get_mut(instance) {
            Some(info) => {
                info.status = "RUNNING".to_string();
                Ok(())
            }
            None => Err(CloudError::InstanceNotFound(instance.to_string())),
        }
    }

    async fn stop(&self, _scope: &Scope, instance: &str) -> Result<()> {
        if self.call(format!("stop:{instance}")) {
            return Err(CloudError::ApiError("stop failed".to_string()));
        }
        match self.state().instances.get_mut(instance) {
            Some(info) => {
                info.status = "TERMINATED".to_string();
                Ok(())
            }
            None => Err(CloudError::InstanceNotFound(instance.to_string())),
        }
    }
}

#[async_trait]
impl DnsProvider for MockWorld {
    fn name(&self) -> &str {
        "mock"
    }

    async fn upsert_record(&self, change: &RecordChange) -> Result<String> {
        if self.call(format!("upsert:{}", change.name)) || self.state().failing.contains("upsert") {
            return Err(CloudError::ApiError("upsert failed".to_string()));
        }
        let mut state = self.state();
        state.upserts.push(change.clone());
        state.records.insert(change.name.clone(), change.values.clone());
        Ok(format!("/change/C{}", state.upserts.len()))
    }

    async fn change_status(&self, change_id: &str) -> Result<ChangeStatus> {
        self.call(format!("get-change:{change_id}"));
        let mut state = self.state();
        state.polls += 1;
        if state.polls > state.pending_polls {
            Ok(ChangeStatus::InSync)
        } else {
            Ok(ChangeStatus::Pending)
        }
    }
}

#[async_trait]
impl HostResolver for MockWorld {
    async fn lookup(&self, host: &str) -> Result<Vec<String>> {
        self.call(format!("lookup:{host}"));
        self.state()
            .records
            .get(host)
            .cloned()
            .ok_or_else(|| CloudError::LookupFailed {
                host: host.to_string(),
                message: "no such host".to_string(),
            })
    }
}

#[async_trait]
impl RemoteExecutor for MockWorld {
    async fn run(&self, target: &SshTarget, command: &str) -> Result<CommandOutput> {
        self.state().ssh_targets.push(target.clone());
        if self.call(format!("ssh:{}:{command}", target.host)) {
            return Err(CloudError::CommandFailed(format!("`{command}` exited with 1")));
        }
        Ok(CommandOutput {
            stdout: format!("ran {command}\n"),
            stderr: String::new(),
        })
    }
}
