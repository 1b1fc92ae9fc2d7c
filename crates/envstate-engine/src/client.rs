//! HTTP client for a remote envstate server

use crate::error::{EngineError, Result};
use crate::response::{ErrorBody, Outcome, SuccessBody};
use envstate_core::{EnvRequest, InstanceRequest};
use serde::Serialize;
use tracing::debug;

pub struct RemoteClient {
    base_url: String,
    client: reqwest::Client,
}

impl RemoteClient {
    /// `host` is `host:port` or a full URL.
    pub fn new(host: &str) -> Self {
        let host = host.trim_end_matches('/');
        let base_url = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("http://{host}")
        };

        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn env(&self, request: &EnvRequest) -> Result<Outcome> {
        self.post(&format!("/v1/env/{}", request.verb), request).await
    }

    pub async fn instance(&self, request: &InstanceRequest) -> Result<Outcome> {
        self.post(&format!("/v1/vm/{}", request.verb), request).await
    }

    async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Outcome> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);

        let transport = |e: reqwest::Error| EngineError::Transport {
            url: url.clone(),
            message: e.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let text = response.text().await.map_err(transport)?;

        if status.is_success() {
            let body: SuccessBody =
                serde_json::from_str(&text).map_err(|e| EngineError::Transport {
                    url: url.clone(),
                    message: format!("unexpected response body: {e}"),
                })?;
            return Ok(body.result);
        }

        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or_else(|_| format!("{status}: {}", text.trim()));
        Err(EngineError::Remote {
            status: status.as_u16(),
            message,
        })
    }
}
