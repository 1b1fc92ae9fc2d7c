//! In-process execution

use crate::driver::{Providers, StateDriver};
use crate::error::Result;
use crate::instance;
use crate::reconcile::ReconcileOptions;
use crate::response::Outcome;
use crate::show::show_environment;
use envstate_core::{EnvRequest, InstanceRequest, Verb};
use tracing::info;

/// Runs requests against the configured providers
pub struct LocalExecutor {
    driver: StateDriver,
    options: ReconcileOptions,
}

impl LocalExecutor {
    pub fn new(providers: Providers, options: ReconcileOptions) -> Self {
        Self {
            driver: StateDriver::new(providers, options),
            options,
        }
    }

    pub async fn execute_env(&self, request: &EnvRequest) -> Result<Outcome> {
        let selection = request.selection()?;
        let environments = request.data.select(&selection)?;
        info!(
            verb = %request.verb,
            "{} environment(s) selected",
            environments.len()
        );

        match request.verb {
            Verb::Up | Verb::Down => Ok(Outcome::Transition {
                report: self.driver.transition(request.verb, &environments).await,
            }),
            Verb::Show => {
                let compute = self.driver.providers().compute.as_ref();
                let mut views = Vec::with_capacity(environments.len());
                for env in environments {
                    views.push(show_environment(compute, env).await);
                }
                Ok(Outcome::Environments { environments: views })
            }
        }
    }

    pub async fn execute_instance(&self, request: &InstanceRequest) -> Result<Outcome> {
        request.validate()?;
        instance::execute(self.driver.providers(), self.options, request).await
    }
}
