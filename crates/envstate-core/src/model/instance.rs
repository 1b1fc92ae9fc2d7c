//! Instance, DNS record and script definitions

use serde::{Deserialize, Deserializer, Serialize};

/// Default SSH port used when a script does not declare one
pub const DEFAULT_SSH_PORT: u16 = 22;

/// One compute instance reference
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    /// Compute instance name in the group's project/zone
    pub name: String,

    /// DNS record pointing at the instance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<Record>,

    /// Instance-level shell commands
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<Script>,
}

impl Instance {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Record with a non-empty domain, i.e. one that takes part in reconciliation
    pub fn dns_record(&self) -> Option<&Record> {
        self.record.as_ref().filter(|r| !r.domain.is_empty())
    }
}

/// DNS record descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Hosted zone domain, e.g. `example.com`
    #[serde(default)]
    pub domain: String,

    /// Also publish the instance's current external IP
    #[serde(default)]
    pub external_ip: bool,

    /// Explicit addresses
    #[serde(default)]
    pub ip: Vec<String>,

    /// Record type
    #[serde(rename = "type", default = "default_record_type")]
    pub record_type: String,

    /// Record name, e.g. `web.example.com`
    #[serde(default)]
    pub zone: String,
}

impl Default for Record {
    fn default() -> Self {
        Self {
            domain: String::new(),
            external_ip: false,
            ip: Vec::new(),
            record_type: default_record_type(),
            zone: String::new(),
        }
    }
}

impl Record {
    /// A record with no explicit address and no external IP publishes nothing.
    pub fn is_noop(&self) -> bool {
        self.ip.is_empty() && !self.external_ip
    }
}

fn default_record_type() -> String {
    "A".to_string()
}

/// Up/down shell commands plus the SSH settings used to run them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub up: Vec<String>,

    #[serde(default)]
    pub down: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh: Option<Ssh>,
}

/// SSH connection settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ssh {
    /// Path to the private key
    #[serde(default)]
    pub key: String,

    #[serde(default, deserialize_with = "deserialize_port")]
    pub port: Option<u16>,

    #[serde(default)]
    pub user: String,
}

impl Ssh {
    /// Fill missing fields from `fallback`.
    pub fn or(&self, fallback: &Ssh) -> Ssh {
        Ssh {
            key: if self.key.is_empty() {
                fallback.key.clone()
            } else {
                self.key.clone()
            },
            port: self.port.or(fallback.port),
            user: if self.user.is_empty() {
                fallback.user.clone()
            } else {
                self.user.clone()
            },
        }
    }

    pub fn port_or_default(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_SSH_PORT)
    }
}

/// Ports show up both as `22` and `"22"` once templates are rendered.
fn deserialize_port<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PortValue {
        Number(u16),
        Text(String),
    }

    match Option::<PortValue>::deserialize(deserializer)? {
        None => Ok(None),
        Some(PortValue::Number(port)) => Ok(Some(port)),
        Some(PortValue::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(PortValue::Text(text)) => text
            .trim()
            .parse::<u16>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid ssh port: {text:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_defaults() {
        let record: Record = serde_yaml::from_str("domain: example.com\nzone: web.example.com").unwrap();
        assert_eq!(record.record_type, "A");
        assert!(record.ip.is_empty());
        assert!(!record.external_ip);
        assert!(record.is_noop());
    }

    #[test]
    fn test_record_with_external_ip_is_not_noop() {
        let record = Record {
            external_ip: true,
            ..Default::default()
        };
        assert!(!record.is_noop());
    }

    #[test]
    fn test_ssh_port_accepts_number_and_string() {
        let ssh: Ssh = serde_yaml::from_str("key: /k\nport: 2222\nuser: ops").unwrap();
        assert_eq!(ssh.port, Some(2222));

        let ssh: Ssh = serde_yaml::from_str("key: /k\nport: \"22\"\nuser: ops").unwrap();
        assert_eq!(ssh.port, Some(22));

        let ssh: Ssh = serde_yaml::from_str("key: /k\nuser: ops").unwrap();
        assert_eq!(ssh.port, None);
        assert_eq!(ssh.port_or_default(), 22);

        assert!(serde_yaml::from_str::<Ssh>("port: ssh").is_err());
    }

    #[test]
    fn test_ssh_fallback_fills_missing_fields() {
        let instance = Ssh {
            key: String::new(),
            port: Some(2200),
            user: "deploy".to_string(),
        };
        let group = Ssh {
            key: "/keys/id_ed25519".to_string(),
            port: Some(22),
            user: "root".to_string(),
        };

        let merged = instance.or(&group);
        assert_eq!(merged.key, "/keys/id_ed25519");
        assert_eq!(merged.port, Some(2200));
        assert_eq!(merged.user, "deploy");
    }

    #[test]
    fn test_dns_record_requires_domain() {
        let mut instance = Instance::new("web-1");
        assert!(instance.dns_record().is_none());

        instance.record = Some(Record {
            zone: "web.example.com".to_string(),
            ..Default::default()
        });
        assert!(instance.dns_record().is_none());

        instance.record.as_mut().unwrap().domain = "example.com".to_string();
        assert!(instance.dns_record().is_some());
    }
}
