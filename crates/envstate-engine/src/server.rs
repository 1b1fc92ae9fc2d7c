//! HTTP front end
//!
//! ```text
//! GET  /health         {"status":"ok"}
//! POST /v1/env/up      EnvRequest       -> {"status":"success","result":...}
//! POST /v1/env/down
//! POST /v1/env/show
//! POST /v1/vm/list     InstanceRequest
//! POST /v1/vm/start
//! POST /v1/vm/status
//! POST /v1/vm/stop
//! ```
//!
//! Failures answer `{"error":"<message>"}` with a 4xx/5xx status.

use crate::error::EngineError;
use crate::local::LocalExecutor;
use crate::response::{ErrorBody, SuccessBody};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use envstate_core::{EnvRequest, InstanceRequest, InstanceVerb, Verb};
use serde::de::DeserializeOwned;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

type AppState = Arc<LocalExecutor>;

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::BAD_GATEWAY);
        error_response(status, self.to_string())
    }
}

fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorBody { error })).into_response()
}

pub fn router(executor: AppState) -> Router {
    Router::new()
        .route("/health", get(health).fallback(method_not_allowed))
        .route("/v1/env/up", post(env_up).fallback(method_not_allowed))
        .route("/v1/env/down", post(env_down).fallback(method_not_allowed))
        .route("/v1/env/show", post(env_show).fallback(method_not_allowed))
        .route("/v1/vm/list", post(vm_list).fallback(method_not_allowed))
        .route("/v1/vm/start", post(vm_start).fallback(method_not_allowed))
        .route("/v1/vm/status", post(vm_status).fallback(method_not_allowed))
        .route("/v1/vm/stop", post(vm_stop).fallback(method_not_allowed))
        .fallback(not_found)
        .with_state(executor)
}

/// Bind `addr` and serve until the process is stopped
pub async fn serve(addr: SocketAddr, executor: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("envstate server listening on {}", listener.local_addr()?);
    axum::serve(listener, router(executor)).await
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn method_not_allowed() -> Response {
    error_response(StatusCode::METHOD_NOT_ALLOWED, "method not allowed".to_string())
}

async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "not found".to_string())
}

/// Parse a request body, taking the verb from the path.
fn parse<T: DeserializeOwned>(body: &str, verb: &str) -> Result<T, EngineError> {
    let mut value: serde_json::Value = if body.trim().is_empty() {
        serde_json::json!({})
    } else {
        serde_json::from_str(body)
            .map_err(|e| EngineError::InvalidRequest(format!("malformed body: {e}")))?
    };

    match value.as_object_mut() {
        Some(object) => {
            object.insert("verb".to_string(), serde_json::Value::String(verb.to_string()));
        }
        None => {
            return Err(EngineError::InvalidRequest(
                "body must be a JSON object".to_string(),
            ));
        }
    }

    serde_json::from_value(value)
        .map_err(|e| EngineError::InvalidRequest(format!("malformed body: {e}")))
}

async fn run_env(executor: AppState, verb: Verb, body: String) -> Response {
    let result = match parse::<EnvRequest>(&body, &verb.to_string()) {
        Ok(request) => executor.execute_env(&request).await,
        Err(e) => Err(e),
    };
    respond(&format!("env {verb}"), result)
}

async fn run_vm(executor: AppState, verb: InstanceVerb, body: String) -> Response {
    let result = match parse::<InstanceRequest>(&body, &verb.to_string()) {
        Ok(request) => executor.execute_instance(&request).await,
        Err(e) => Err(e),
    };
    respond(&format!("vm {verb}"), result)
}

fn respond(what: &str, result: crate::error::Result<crate::response::Outcome>) -> Response {
    match result {
        Ok(outcome) => {
            info!("{} succeeded", what);
            (StatusCode::OK, Json(SuccessBody::new(outcome))).into_response()
        }
        Err(e) => {
            warn!("{} failed: {}", what, e);
            e.into_response()
        }
    }
}

async fn env_up(State(executor): State<AppState>, body: String) -> Response {
    run_env(executor, Verb::Up, body).await
}

async fn env_down(State(executor): State<AppState>, body: String) -> Response {
    run_env(executor, Verb::Down, body).await
}

async fn env_show(State(executor): State<AppState>, body: String) -> Response {
    run_env(executor, Verb::Show, body).await
}

async fn vm_list(State(executor): State<AppState>, body: String) -> Response {
    run_vm(executor, InstanceVerb::List, body).await
}

async fn vm_start(State(executor): State<AppState>, body: String) -> Response {
    run_vm(executor, InstanceVerb::Start, body).await
}

async fn vm_status(State(executor): State<AppState>, body: String) -> Response {
    run_vm(executor, InstanceVerb::Status, body).await
}

async fn vm_stop(State(executor): State<AppState>, body: String) -> Response {
    run_vm(executor, InstanceVerb::Stop, body).await
}
