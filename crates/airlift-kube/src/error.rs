//! Error types for airlift-kube

use thiserror::Error;

/// Result type for airlift-kube operations
pub type Result<T> = std::result::Result<T, KubeError>;

/// Errors that can occur during cluster operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KubeError {
    /// External command exited non-zero. Carries everything needed to
    /// diagnose the failure: the command text and both captured streams.
    #[error("command failed: {command}\nexit code: {code:?}\nstdout: {stdout}\nstderr: {stderr}")]
    Command {
        command: String,
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    /// External command could not be started at all.
    #[error("failed to spawn command: {command}: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    /// An entity reached the applier with a build context but no resolved
    /// image reference.
    #[error("entity {kind}/{name} has a build context but no resolved image")]
    UnresolvedImage { kind: String, name: String },

    /// Core-layer error (configuration, collection, resolution primitives)
    #[error(transparent)]
    Core(#[from] airlift_core::CoreError),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_yaml::Error> for KubeError {
    fn from(e: serde_yaml::Error) -> Self {
        KubeError::Serialization(e.to_string())
    }
}

impl KubeError {
    /// Whether this is the idempotent-setup conflict class: the external
    /// tool reported that the object being created already exists.
    ///
    /// kubectl phrases this as `Error from server (AlreadyExists)`, gcloud
    /// as `... already exists`.
    pub fn is_already_exists(&self) -> bool {
        match self {
            KubeError::Command { stdout, stderr, .. } => {
                let output = format!("{stdout}\n{stderr}").to_lowercase();
                output.contains("already exists") || output.contains("alreadyexists")
            }
            _ => false,
        }
    }
}
