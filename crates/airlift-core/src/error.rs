//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("{name} should be specified ({var})")]
    MissingVariable { name: String, var: String },

    #[error("Acceptable DEPLOY_DESTINATION values are: gke, minikube, docker (got '{value}')")]
    UnknownDestination { value: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Failed to walk manifest tree: {0}")]
    Glob(#[from] glob::GlobError),

    #[error("Invalid manifest document in {path}: {message}")]
    InvalidDocument { path: String, message: String },

    #[error("Cannot read package metadata at {path}: {message}")]
    PackageMeta { path: String, message: String },

    #[error("Manifest {path} has no build context directory two levels up")]
    NoBuildContext { path: String },

    #[error("Expected exactly one image placeholder in document, found {found}")]
    MarkerSubstitution { found: usize },
}

pub type Result<T> = std::result::Result<T, CoreError>;
