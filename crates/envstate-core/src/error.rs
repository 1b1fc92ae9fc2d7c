use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnvError {
    #[error("IO error: {path}\nreason: {message}")]
    IoError { path: PathBuf, message: String },

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("template error: {file}\nreason: {message}")]
    TemplateError { file: PathBuf, message: String },

    #[error("template render error: {0}")]
    TemplateRenderError(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("environment {name:?} with label {label:?} not found")]
    EnvironmentNotFound { name: String, label: String },

    #[error("no environment is labeled with {0:?}")]
    NoLabelMatch(String),

    #[error("no environment is declared in the environment file")]
    NoEnvironments,
}

impl EnvError {
    /// Lookup failures, as opposed to configuration failures.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EnvError::EnvironmentNotFound { .. } | EnvError::NoLabelMatch(_) | EnvError::NoEnvironments
        )
    }
}

pub type Result<T> = std::result::Result<T, EnvError>;
