//! Remote command execution over the `ssh` CLI

use crate::error::{CloudError, Result};
use crate::provider::{CommandOutput, RemoteExecutor};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// A fully specified SSH destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SshTarget {
    pub host: String,
    pub port: u16,
    pub user: String,
    /// Path to the private key
    pub key: String,
}

impl SshTarget {
    /// Every field is required.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        key: impl Into<String>,
    ) -> Result<Self> {
        let target = Self {
            host: host.into(),
            port,
            user: user.into(),
            key: key.into(),
        };

        if target.host.is_empty() {
            return Err(CloudError::InvalidConfig("ssh host value is empty".to_string()));
        }
        if target.port == 0 {
            return Err(CloudError::InvalidConfig("ssh port value is empty".to_string()));
        }
        if target.user.is_empty() {
            return Err(CloudError::InvalidConfig("ssh user value is empty".to_string()));
        }
        if target.key.is_empty() {
            return Err(CloudError::InvalidConfig(
                "ssh key path value is empty".to_string(),
            ));
        }

        Ok(target)
    }

    pub fn destination(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }
}

/// Options passed to every `ssh` invocation
#[derive(Debug, Clone)]
pub struct SshOptions {
    /// Refuse unknown host keys instead of prompting
    pub strict_host_key_checking: bool,
    pub connect_timeout: Duration,
}

impl Default for SshOptions {
    fn default() -> Self {
        Self {
            strict_host_key_checking: true,
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// [`RemoteExecutor`] that shells out to `ssh`
#[derive(Debug, Clone, Default)]
pub struct SshExecutor {
    options: SshOptions,
}

impl SshExecutor {
    pub fn new(options: SshOptions) -> Self {
        Self { options }
    }

    /// Arguments for `ssh`, destination and command last
    pub fn args(&self, target: &SshTarget, command: &str) -> Vec<String> {
        let strict = if self.options.strict_host_key_checking {
            "yes"
        } else {
            "no"
        };

        vec![
            "-i".to_string(),
            target.key.clone(),
            "-p".to_string(),
            target.port.to_string(),
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            format!("StrictHostKeyChecking={strict}"),
            "-o".to_string(),
            format!("ConnectTimeout={}", self.options.connect_timeout.as_secs().max(1)),
            target.destination(),
            command.to_string(),
        ]
    }
}

#[async_trait]
impl RemoteExecutor for SshExecutor {
    async fn run(&self, target: &SshTarget, command: &str) -> Result<CommandOutput> {
        if !std::path::Path::new(&target.key).exists() {
            return Err(CloudError::InvalidConfig(format!(
                "ssh key not found: {}",
                target.key
            )));
        }

        tracing::debug!(host = %target.host, port = target.port, command = %command, "Running remote command");

        let output = Command::new("ssh")
            .args(self.args(target, command))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        let result = CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if !output.status.success() {
            let detail = result.stderr.trim();
            return Err(CloudError::CommandFailed(format!(
                "{} on {}: {}",
                output.status,
                target.host,
                if detail.is_empty() { "no output" } else { detail }
            )));
        }

        Ok(result)
    }
}
