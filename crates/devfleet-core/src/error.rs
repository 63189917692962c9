use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FleetError {
    #[error("not initialized: run 'devfleet init'")]
    NotInitialized,

    #[error("cannot locate compose template: {}", .0.display())]
    TemplateMissing(PathBuf),

    #[error("invalid service name '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidServiceName(String),

    #[error("invalid git repository url: {0}")]
    InvalidRepoUrl(String),

    #[error("git binary not found on PATH")]
    GitNotFound,

    #[error("command failed: {0}")]
    CommandFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, FleetError>;
