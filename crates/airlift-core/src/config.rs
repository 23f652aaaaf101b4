//! Deployment run configuration
//!
//! A `DeployConfig` is resolved once at startup from whatever the CLI shell
//! collected (flags or environment) and passed by reference into every
//! component. Library code never reads process state directly, so the whole
//! run is a function of one immutable value.

use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// Target execution environment class for a deployment run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Remote managed cluster (Google Kubernetes Engine)
    Gke,
    /// Local multi-node VM cluster
    Minikube,
    /// Local single-node cluster (Docker Desktop)
    Docker,
}

impl Destination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Destination::Gke => "gke",
            Destination::Minikube => "minikube",
            Destination::Docker => "docker",
        }
    }

    /// Whether this destination is the remote class. Drives secret-directory
    /// exclusion during collection, registry-qualified image identities, and
    /// image pushes.
    pub fn is_remote(&self) -> bool {
        matches!(self, Destination::Gke)
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Destination {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "gke" => Ok(Destination::Gke),
            "minikube" => Ok(Destination::Minikube),
            "docker" => Ok(Destination::Docker),
            other => Err(CoreError::UnknownDestination {
                value: other.to_string(),
            }),
        }
    }
}

/// Remote-cluster identifiers, required when the destination is `Gke`.
#[derive(Debug, Clone)]
pub struct GkeConfig {
    pub cluster: String,
    pub project_id: String,
    pub zone: String,
}

/// Configuration for one deployment run.
#[derive(Debug, Clone)]
pub struct DeployConfig {
    pub destination: Destination,
    /// Registry auth token forwarded to image builds as a build argument.
    pub npm_token: String,
    gke: Option<GkeConfig>,
    /// Retain transient manifest files after apply.
    pub keep_deploy_files: bool,
    /// Automated execution context. Only collaborator defaults look at this;
    /// the orchestrator itself does not branch on it.
    pub ci: bool,
}

impl DeployConfig {
    /// Validate raw inputs into a run configuration.
    ///
    /// All precondition failures (unknown destination, missing token, missing
    /// remote identifiers) surface here, before any external action runs.
    pub fn resolve(
        destination: &str,
        npm_token: Option<String>,
        cluster: Option<String>,
        project_id: Option<String>,
        zone: Option<String>,
        keep_deploy_files: bool,
        ci: bool,
    ) -> Result<Self> {
        let destination = Destination::from_str(destination)?;

        let npm_token = npm_token.ok_or_else(|| CoreError::MissingVariable {
            name: "NPM token".to_string(),
            var: "NPM_TOKEN".to_string(),
        })?;

        let gke = if destination.is_remote() {
            Some(GkeConfig {
                cluster: required(cluster, "GKE cluster", "GCLOUD_CLUSTER")?,
                project_id: required(project_id, "GKE project id", "GCLOUD_PROJECT_ID")?,
                zone: required(zone, "GKE zone", "GCLOUD_ZONE")?,
            })
        } else {
            None
        };

        Ok(Self {
            destination,
            npm_token,
            gke,
            keep_deploy_files,
            ci,
        })
    }

    /// The remote-cluster identifiers.
    ///
    /// `resolve` guarantees these exist whenever the destination is remote;
    /// asking for them on a local run is a logic error surfaced as a missing
    /// variable rather than a panic.
    pub fn gke(&self) -> Result<&GkeConfig> {
        self.gke.as_ref().ok_or_else(|| CoreError::MissingVariable {
            name: "GKE project id".to_string(),
            var: "GCLOUD_PROJECT_ID".to_string(),
        })
    }
}

fn required(value: Option<String>, name: &str, var: &str) -> Result<String> {
    value.ok_or_else(|| CoreError::MissingVariable {
        name: name.to_string(),
        var: var.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gke_config() -> Result<DeployConfig> {
        DeployConfig::resolve(
            "gke",
            Some("token".into()),
            Some("cluster-1".into()),
            Some("my-project".into()),
            Some("europe-west1-b".into()),
            false,
            false,
        )
    }

    #[test]
    fn test_local_destination_needs_no_gke_config() {
        let config =
            DeployConfig::resolve("docker", Some("token".into()), None, None, None, false, false)
                .unwrap();
        assert_eq!(config.destination, Destination::Docker);
        assert!(!config.destination.is_remote());
        assert!(config.gke().is_err());
    }

    #[test]
    fn test_gke_destination_resolves() {
        let config = gke_config().unwrap();
        assert!(config.destination.is_remote());
        assert_eq!(config.gke().unwrap().project_id, "my-project");
    }

    #[test]
    fn test_missing_token_is_fatal() {
        let err =
            DeployConfig::resolve("docker", None, None, None, None, false, false).unwrap_err();
        assert!(err.to_string().contains("NPM_TOKEN"));
    }

    #[test]
    fn test_missing_remote_variable_is_fatal() {
        let err = DeployConfig::resolve(
            "gke",
            Some("token".into()),
            Some("cluster-1".into()),
            Some("my-project".into()),
            None,
            false,
            false,
        )
        .unwrap_err();
        assert!(err.to_string().contains("GCLOUD_ZONE"));
    }

    #[test]
    fn test_unknown_destination_is_fatal() {
        let err = DeployConfig::resolve("swarm", Some("token".into()), None, None, None, false, false)
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("gke, minikube, docker"));
        assert!(message.contains("swarm"));
    }
}
