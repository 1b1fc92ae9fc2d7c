//! envstate core
//!
//! Environment document model, template resolution and label-based
//! selection. Everything in this crate is pure: no cloud calls, no
//! subprocesses.
//!
//! ```text
//! environment.yaml ──► extract variables ──► render (Tera) ──► parse (serde_yaml)
//!                                                                   │
//!                                      Selection ──► select() ◄─────┘
//! ```

pub mod error;
pub mod loader;
pub mod model;
pub mod request;
pub mod template;

// Re-exports
pub use error::{EnvError, Result};
pub use loader::{load_environment_file, load_environment_str};
pub use model::*;
pub use request::{
    DnsOptions, EnvRequest, InstanceRequest, InstanceVerb, Selection, Target, Verb,
};
pub use template::{TemplateProcessor, Variables, extract_variables};
