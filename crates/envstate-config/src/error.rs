use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "environment file not found. Looked in:\n\
        - current directory: envstate.local.yaml, envstate.yaml, environment.yaml\n\
        - ./.envstate/environment.yaml\n\
        - ~/.config/envstate/environment.yaml\n\
        Pass --env-file or set ENVSTATE_ENV_FILE to point at one"
    )]
    EnvironmentFileNotFound,

    #[error("environment file does not exist: {0}")]
    ExplicitFileMissing(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
