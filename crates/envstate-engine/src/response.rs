//! Wire bodies shared by the HTTP server and client

use crate::report::TransitionReport;
use crate::show::EnvironmentView;
use envstate_cloud::InstanceInfo;
use serde::{Deserialize, Serialize};

/// What a request produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Transition { report: TransitionReport },
    Environments { environments: Vec<EnvironmentView> },
    Instances { instances: Vec<InstanceInfo> },
    Status { name: String, status: String },
}

/// `{"status":"success","result":{...}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessBody {
    pub status: String,
    pub result: Outcome,
}

impl SuccessBody {
    pub fn new(result: Outcome) -> Self {
        Self {
            status: "success".to_string(),
            result,
        }
    }
}

/// `{"error":"<message>"}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
