//! Local or remote execution of a resolved request

use crate::client::RemoteClient;
use crate::error::Result;
use crate::local::LocalExecutor;
use crate::response::Outcome;
use envstate_core::{EnvRequest, InstanceRequest};
use tracing::info;

pub enum Dispatcher {
    Local(LocalExecutor),
    Remote(RemoteClient),
}

impl Dispatcher {
    pub async fn env(&self, request: &EnvRequest) -> Result<Outcome> {
        match self {
            Dispatcher::Local(executor) => executor.execute_env(request).await,
            Dispatcher::Remote(client) => {
                // Fail on a missing environment before any round trip
                request.data.select(&request.selection()?)?;
                info!("forwarding {} to {}", request.verb, client.base_url());
                client.env(request).await
            }
        }
    }

    pub async fn instance(&self, request: &InstanceRequest) -> Result<Outcome> {
        match self {
            Dispatcher::Local(executor) => executor.execute_instance(request).await,
            Dispatcher::Remote(client) => {
                request.validate()?;
                info!("forwarding vm {} to {}", request.verb, client.base_url());
                client.instance(request).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EngineError, Severity};
    use envstate_core::{EnvironmentSet, Selection, Verb};

    #[tokio::test]
    async fn test_remote_checks_label_locally() {
        // Nothing listens here; a round trip would be a transport error
        let dispatcher = Dispatcher::Remote(RemoteClient::new("127.0.0.1:9"));
        let data: EnvironmentSet =
            serde_yaml::from_str("environment:\n  - name: api\n    label: dev\n").unwrap();
        let selection = Selection::from_flags(None, true, "prod").unwrap();

        let err = dispatcher
            .env(&EnvRequest::new(Verb::Up, &selection, data))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Environment(_)));
        assert_eq!(err.severity(), Severity::NotFound);
    }
}
