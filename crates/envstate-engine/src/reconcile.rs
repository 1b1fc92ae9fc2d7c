//! DNS reconciliation
//!
//! Compares what a record should point at with what it resolves to right
//! now, and submits an UPSERT only when the two differ. Running it twice in
//! a row is a no-op the second time.

use crate::error::ReconcileError;
use envstate_cloud::{
    ChangeStatus, ComputeProvider, DnsProvider, HostResolver, RecordChange, Scope,
};
use envstate_core::Record;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Change status polling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOptions {
    pub max_polls: u32,
    pub poll_interval: Duration,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            max_polls: 30,
            poll_interval: Duration::from_secs(2),
        }
    }
}

/// Outcome of a reconciliation that did not fail
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Whether a change was submitted
    pub updated: bool,

    pub desired: Vec<String>,

    pub observed: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl ReconcileReport {
    pub fn message(&self, record: &Record) -> String {
        let mut message = if self.updated {
            format!(
                "{} {} -> {}",
                record.record_type,
                record.zone,
                self.desired.join(",")
            )
        } else if self.desired.is_empty() {
            format!("{} has no address to publish", record.zone)
        } else {
            format!("{} already points at {}", record.zone, self.desired.join(","))
        };

        for note in &self.notes {
            message.push_str("; ");
            message.push_str(note);
        }
        message
    }
}

pub struct DnsReconciler {
    compute: Arc<dyn ComputeProvider>,
    dns: Arc<dyn DnsProvider>,
    resolver: Arc<dyn HostResolver>,
    options: ReconcileOptions,
}

impl DnsReconciler {
    pub fn new(
        compute: Arc<dyn ComputeProvider>,
        dns: Arc<dyn DnsProvider>,
        resolver: Arc<dyn HostResolver>,
        options: ReconcileOptions,
    ) -> Self {
        Self {
            compute,
            dns,
            resolver,
            options,
        }
    }

    /// Bring `record` in line with `instance`.
    #[instrument(skip(self, record), fields(record = %record.zone))]
    pub async fn reconcile(
        &self,
        scope: &Scope,
        instance: &str,
        record: &Record,
    ) -> Result<ReconcileReport, ReconcileError> {
        let mut report = ReconcileReport::default();

        let mut desired: Vec<String> = record
            .ip
            .iter()
            .filter(|ip| !ip.is_empty())
            .cloned()
            .collect();
        if record.external_ip {
            match self.compute.external_ip(scope, instance).await? {
                Some(ip) => desired.push(ip),
                None => report
                    .notes
                    .push(format!("{instance} has no external IP")),
            }
        }
        desired.sort();
        desired.dedup();
        report.desired = desired;

        if report.desired.is_empty() {
            debug!("nothing to publish");
            return Ok(report);
        }

        report.observed = self.observe(record).await;

        if report.observed == report.desired {
            info!("record already up to date");
            return Ok(report);
        }

        let change = RecordChange::upsert(
            &record.domain,
            &record.zone,
            &record.record_type,
            report.desired.clone(),
        );
        let change_id = self.dns.upsert_record(&change).await?;
        info!(
            "submitted change {} ({} -> {})",
            change_id,
            report.observed.join(","),
            report.desired.join(",")
        );

        self.wait_in_sync(&record.zone, &change_id).await?;

        report.updated = true;
        report.change_id = Some(change_id);
        Ok(report)
    }

    /// Addresses the record resolves to now, restricted to the record's family.
    /// A lookup failure counts as no address.
    async fn observe(&self, record: &Record) -> Vec<String> {
        let addresses = match self.resolver.lookup(&record.zone).await {
            Ok(addresses) => addresses,
            Err(e) => {
                debug!("lookup of {} failed: {}", record.zone, e);
                Vec::new()
            }
        };

        let mut observed: Vec<String> = addresses
            .into_iter()
            .filter(|addr| matches_family(&record.record_type, addr))
            .collect();
        observed.sort();
        observed.dedup();
        observed
    }

    async fn wait_in_sync(&self, record: &str, change_id: &str) -> Result<(), ReconcileError> {
        for poll in 0..self.options.max_polls {
            if self.dns.change_status(change_id).await? == ChangeStatus::InSync {
                debug!("change {} in sync after {} polls", change_id, poll + 1);
                return Ok(());
            }
            if poll + 1 < self.options.max_polls {
                tokio::time::sleep(self.options.poll_interval).await;
            }
        }

        Err(ReconcileError::Timeout {
            record: record.to_string(),
            change_id: change_id.to_string(),
            polls: self.options.max_polls,
        })
    }
}

/// A keeps IPv4, AAAA keeps IPv6, anything else keeps everything.
fn matches_family(record_type: &str, address: &str) -> bool {
    match (record_type, address.parse::<IpAddr>()) {
        ("A", Ok(ip)) => ip.is_ipv4(),
        ("AAAA", Ok(ip)) => ip.is_ipv6(),
        ("A" | "AAAA", Err(_)) => false,
        _ => true,
    }
}
