//! Route 53 SDK plumbing
//!
//! Client construction plus the conversions between envstate's record
//! types and the SDK's.

use crate::error::Result;
use aws_config::BehaviorVersion;
use aws_config::meta::region::RegionProviderChain;
use aws_sdk_route53::Client;
use aws_sdk_route53::types::{
    Change, ChangeAction, ChangeBatch, ChangeInfo, ChangeStatus, HostedZone, ResourceRecord,
    ResourceRecordSet, RrType,
};
use envstate_cloud::RecordChange;

/// Route 53 is global, but the SDK still needs a region for its endpoint
const FALLBACK_REGION: &str = "us-east-1";

/// Client built from the default credential chain (`AWS_PROFILE`,
/// environment variables, `~/.aws/credentials`, instance metadata).
pub async fn load_client() -> Client {
    let region = RegionProviderChain::default_provider().or_else(FALLBACK_REGION);
    let config = aws_config::defaults(BehaviorVersion::latest())
        .region(region)
        .load()
        .await;

    tracing::debug!(region = ?config.region(), "Loaded AWS config");
    Client::new(&config)
}

/// Id of the hosted zone whose name is exactly `domain.`
pub fn hosted_zone_id<'a>(domain: &str, zones: &'a [HostedZone]) -> Option<&'a str> {
    let fqdn = format!("{}.", domain.trim_end_matches('.'));
    zones
        .iter()
        .find(|zone| zone.name() == fqdn)
        .map(|zone| zone.id())
}

/// UPSERT batch for one record set
pub fn upsert_batch(change: &RecordChange) -> Result<ChangeBatch> {
    let records = change
        .values
        .iter()
        .map(|value| ResourceRecord::builder().value(value).build())
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let record_set = ResourceRecordSet::builder()
        .name(&change.name)
        .r#type(RrType::from(change.record_type.as_str()))
        .ttl(i64::from(change.ttl))
        .set_resource_records(Some(records))
        .build()?;

    let upsert = Change::builder()
        .action(ChangeAction::Upsert)
        .resource_record_set(record_set)
        .build()?;

    Ok(ChangeBatch::builder()
        .comment(&change.comment)
        .changes(upsert)
        .build()?)
}

pub fn is_in_sync(info: &ChangeInfo) -> bool {
    *info.status() == ChangeStatus::Insync
}
