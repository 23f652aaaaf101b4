//! CLI error types with exit code handling
//!
//! This module provides a unified error type for CLI operations that
//! maps errors to appropriate exit codes.

#![allow(dead_code)] // Some constructors are for future subcommands

use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// Run configuration is invalid or incomplete
    #[error("Configuration error: {message}")]
    #[diagnostic(code(airlift::cli::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// The deployment pipeline failed
    #[error("Deploy error: {message}")]
    #[diagnostic(code(airlift::cli::deploy))]
    Deploy { message: String },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(airlift::cli::io))]
    Io { message: String },

    /// Wrapped error for passthrough (stores the formatted message)
    #[error("{message}")]
    #[diagnostic(code(airlift::cli::error))]
    Other { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config { .. } => exit_codes::CONFIG_ERROR,
            CliError::Deploy { .. } => exit_codes::DEPLOY_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Other { .. } => exit_codes::ERROR,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Create a configuration error with help text
    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create a deploy error
    pub fn deploy(message: impl Into<String>) -> Self {
        Self::Deploy {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<airlift_core::CoreError> for CliError {
    fn from(err: airlift_core::CoreError) -> Self {
        use airlift_core::CoreError;
        match err {
            // Precondition failures, detected before any external action
            CoreError::MissingVariable { .. } | CoreError::UnknownDestination { .. } => {
                CliError::config(err.to_string())
            }
            // Everything else from the core layer surfaces mid-pipeline
            // (collection, resolution) and is a deploy failure
            other => CliError::deploy(other.to_string()),
        }
    }
}

impl From<airlift_kube::KubeError> for CliError {
    fn from(err: airlift_kube::KubeError) -> Self {
        match err {
            airlift_kube::KubeError::Core(core) => core.into(),
            other => CliError::deploy(other.to_string()),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
