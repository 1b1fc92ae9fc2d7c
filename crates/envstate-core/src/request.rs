//! Request values shared by the CLI, the dispatcher and the HTTP server
//!
//! A request is built once from flags (or decoded from a request body) and
//! moved through selection and dispatch unchanged; JSON only appears at the
//! process boundary.

use crate::error::{EnvError, Result};
use crate::model::{EnvironmentSet, Record, Ssh};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which environments a request targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Named(String),
    All,
}

/// Target plus label filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub target: Target,
    pub label: String,
}

impl Selection {
    /// A name wins over `all`; one of the two is required.
    pub fn from_flags(name: Option<&str>, all: bool, label: &str) -> Result<Self> {
        let target = match name.filter(|n| !n.is_empty()) {
            Some(name) => Target::Named(name.to_string()),
            None if all => Target::All,
            None => {
                return Err(EnvError::InvalidConfig(
                    "provide an environment name or select all environments".to_string(),
                ));
            }
        };

        Ok(Self {
            target,
            label: label.to_string(),
        })
    }
}

/// Environment-level verbs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verb {
    Up,
    Down,
    Show,
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verb::Up => write!(f, "up"),
            Verb::Down => write!(f, "down"),
            Verb::Show => write!(f, "show"),
        }
    }
}

/// Environment request as sent to a remote server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvRequest {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub all: bool,

    pub verb: Verb,

    /// Resolved environment document
    #[serde(default)]
    pub data: EnvironmentSet,
}

impl EnvRequest {
    pub fn new(verb: Verb, selection: &Selection, data: EnvironmentSet) -> Self {
        let (name, all) = match &selection.target {
            Target::Named(name) => (name.clone(), false),
            Target::All => (String::new(), true),
        };

        Self {
            name,
            label: selection.label.clone(),
            all,
            verb,
            data,
        }
    }

    pub fn selection(&self) -> Result<Selection> {
        Selection::from_flags(Some(&self.name), self.all, &self.label)
    }
}

/// Instance-level verbs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceVerb {
    List,
    Start,
    Status,
    Stop,
}

impl fmt::Display for InstanceVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceVerb::List => write!(f, "list"),
            InstanceVerb::Start => write!(f, "start"),
            InstanceVerb::Status => write!(f, "status"),
            InstanceVerb::Stop => write!(f, "stop"),
        }
    }
}

/// DNS record flags of an instance request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DnsOptions {
    /// Hosted zone domain
    #[serde(default)]
    pub domain: String,

    /// Record name relative to `domain`
    #[serde(default)]
    pub record_name: String,

    #[serde(default)]
    pub record_type: String,
}

/// Request against a single instance (or a whole project/zone for `list`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceRequest {
    pub verb: InstanceVerb,

    #[serde(default)]
    pub name: String,

    pub project: String,

    pub zone: String,

    #[serde(default)]
    pub dns: DnsOptions,

    /// Explicit record addresses
    #[serde(default)]
    pub ip: Vec<String>,

    /// Publish the instance's external IP as well
    #[serde(default)]
    pub external_ip: bool,

    /// Command to run over SSH after a start
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,

    #[serde(default)]
    pub ssh: Ssh,
}

impl InstanceRequest {
    pub fn new(
        verb: InstanceVerb,
        name: impl Into<String>,
        project: impl Into<String>,
        zone: impl Into<String>,
    ) -> Self {
        Self {
            verb,
            name: name.into(),
            project: project.into(),
            zone: zone.into(),
            dns: DnsOptions::default(),
            ip: Vec::new(),
            external_ip: false,
            script: None,
            ssh: Ssh::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.project.is_empty() {
            return Err(EnvError::InvalidConfig("project is required".to_string()));
        }
        if self.zone.is_empty() {
            return Err(EnvError::InvalidConfig("zone is required".to_string()));
        }
        if self.verb != InstanceVerb::List && self.name.is_empty() {
            return Err(EnvError::InvalidConfig(
                "please provide the instance's name".to_string(),
            ));
        }
        Ok(())
    }

    /// Record `<record_name>.<domain>` when both are set
    pub fn record(&self) -> Option<Record> {
        if self.dns.record_name.is_empty() || self.dns.domain.is_empty() {
            return None;
        }

        let mut record = Record {
            domain: self.dns.domain.clone(),
            external_ip: self.external_ip,
            ip: self.ip.clone(),
            zone: format!("{}.{}", self.dns.record_name, self.dns.domain),
            ..Default::default()
        };
        if !self.dns.record_type.is_empty() {
            record.record_type = self.dns.record_type.clone();
        }
        Some(record)
    }
}
