//! envstate engine
//!
//! Everything that acts on a resolved request: the state transition driver,
//! the DNS reconciler, single-instance operations and the local/remote
//! dispatcher with its HTTP client and server.
//!
//! ```text
//!                 ┌──────────── Dispatcher ────────────┐
//!                 │                                    │
//!           LocalExecutor                        RemoteClient ──HTTP──► server::router
//!                 │                                                        │
//!     ┌───────────┼──────────────┐                                   LocalExecutor
//! StateDriver  show_environment  instance::execute
//!     │
//!     ├─ compute.start / stop
//!     ├─ DnsReconciler ─► resolver.lookup, dns.upsert_record, dns.change_status
//!     └─ instance_host ─► run_commands ─► remote.run
//! ```

pub mod client;
pub mod dispatch;
pub mod driver;
pub mod error;
pub mod host;
pub mod instance;
pub mod local;
pub mod reconcile;
pub mod report;
pub mod response;
pub mod script;
pub mod server;
pub mod show;

#[cfg(test)]
mod mock;

pub use client::RemoteClient;
pub use dispatch::Dispatcher;
pub use driver::{Providers, StateDriver};
pub use error::{EngineError, ReconcileError, Result, Severity};
pub use local::LocalExecutor;
pub use reconcile::{DnsReconciler, ReconcileOptions, ReconcileReport};
pub use report::{Location, ReportSummary, Step, StepRecord, StepStatus, TransitionReport};
pub use response::{ErrorBody, Outcome, SuccessBody};
pub use show::{EnvironmentView, GroupView};
