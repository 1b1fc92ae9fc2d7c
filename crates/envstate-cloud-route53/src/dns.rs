//! Route 53 record management

use crate::aws::{hosted_zone_id, is_in_sync, load_client, upsert_batch};
use crate::error::{Result, Route53Error};
use async_trait::async_trait;
use aws_sdk_route53::Client;
use envstate_cloud::{ChangeStatus, DnsProvider, RecordChange};
use tokio::sync::OnceCell;
use tracing::info;

/// Route 53 DNS provider
///
/// The SDK client is loaded on first use, so building the provider never
/// touches credentials.
#[derive(Debug, Default)]
pub struct Route53Dns {
    client: OnceCell<Client>,
}

impl Route53Dns {
    pub fn new() -> Self {
        Self::default()
    }

    async fn client(&self) -> &Client {
        self.client.get_or_init(load_client).await
    }

    /// Resolve the hosted zone ID for `domain`
    pub async fn find_hosted_zone(&self, domain: &str) -> Result<String> {
        let output = self
            .client()
            .await
            .list_hosted_zones_by_name()
            .dns_name(domain)
            .send()
            .await?;

        hosted_zone_id(domain, output.hosted_zones())
            .map(str::to_string)
            .ok_or_else(|| Route53Error::HostedZoneNotFound(domain.to_string()))
    }

    async fn submit(&self, change: &RecordChange) -> Result<String> {
        let zone_id = self.find_hosted_zone(&change.domain).await?;

        info!(
            record = %change.name,
            record_type = %change.record_type,
            values = ?change.values,
            zone_id = %zone_id,
            "Upserting record"
        );

        let output = self
            .client()
            .await
            .change_resource_record_sets()
            .hosted_zone_id(&zone_id)
            .change_batch(upsert_batch(change)?)
            .send()
            .await?;

        let info = output.change_info().ok_or(Route53Error::MissingChangeInfo)?;
        Ok(info.id().to_string())
    }

    async fn poll(&self, change_id: &str) -> Result<bool> {
        let output = self
            .client()
            .await
            .get_change()
            .id(change_id)
            .send()
            .await?;

        let info = output.change_info().ok_or(Route53Error::MissingChangeInfo)?;
        Ok(is_in_sync(info))
    }
}

#[async_trait]
impl DnsProvider for Route53Dns {
    fn name(&self) -> &str {
        "route53"
    }

    async fn upsert_record(&self, change: &RecordChange) -> envstate_cloud::Result<String> {
        Ok(self.submit(change).await?)
    }

    async fn change_status(&self, change_id: &str) -> envstate_cloud::Result<ChangeStatus> {
        Ok(if self.poll(change_id).await? {
            ChangeStatus::InSync
        } else {
            ChangeStatus::Pending
        })
    }
}
