//! Container image build and push
//!
//! Builds the image for a resolved entity from its build context, tagged
//! with the entity's content-addressed identity. Only the remote
//! destination pushes; the local multi-node destination builds inside the
//! cluster VM's own image store instead.

use std::path::Path;

use tracing::info;

use airlift_core::{DeployConfig, Destination};

use crate::error::Result;
use crate::exec::CommandRunner;

/// Destination-conditional image builder.
pub struct ImagePackager<'a> {
    runner: &'a dyn CommandRunner,
    config: &'a DeployConfig,
}

impl<'a> ImagePackager<'a> {
    pub fn new(runner: &'a dyn CommandRunner, config: &'a DeployConfig) -> Self {
        Self { runner, config }
    }

    /// Build (and for the remote destination push) the image for one build
    /// context. Build or push failure is fatal.
    pub async fn package(&self, context: &Path, image: &str) -> Result<()> {
        info!("Start image build for {image}");

        match self.config.destination {
            Destination::Gke => {
                self.runner.run(&self.build_command(context, image)).await?;
                info!("Push image to registry");
                self.runner.run(&format!("docker push {image}")).await?;
            }
            Destination::Minikube => {
                // Build against the VM's docker daemon so the cluster can
                // pull the image without a registry.
                self.runner
                    .run(&format!(
                        "eval $(minikube docker-env); {}",
                        self.build_command(context, image)
                    ))
                    .await?;
            }
            Destination::Docker => {
                self.runner.run(&self.build_command(context, image)).await?;
            }
        }

        info!("Finished image build for {image}");
        Ok(())
    }

    fn build_command(&self, context: &Path, image: &str) -> String {
        format!(
            "cd {}; docker build --build-arg NPM_TOKEN={} -t {} .",
            context.display(),
            self.config.npm_token,
            image
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::ScriptedRunner;
    use std::path::PathBuf;

    fn config(destination: &str) -> DeployConfig {
        DeployConfig::resolve(
            destination,
            Some("s3cret".into()),
            Some("cluster-1".into()),
            Some("my-project".into()),
            Some("europe-west1-b".into()),
            false,
            false,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_remote_builds_then_pushes() {
        let runner = ScriptedRunner::new();
        let config = config("gke");
        ImagePackager::new(&runner, &config)
            .package(&PathBuf::from("services/api"), "gcr.io/my-project/api:abc")
            .await
            .unwrap();

        let commands = runner.commands();
        assert_eq!(commands.len(), 2);
        assert_eq!(
            commands[0],
            "cd services/api; docker build --build-arg NPM_TOKEN=s3cret -t gcr.io/my-project/api:abc ."
        );
        assert_eq!(commands[1], "docker push gcr.io/my-project/api:abc");
    }

    #[tokio::test]
    async fn test_minikube_builds_in_vm_store_without_push() {
        let runner = ScriptedRunner::new();
        let config = config("minikube");
        ImagePackager::new(&runner, &config)
            .package(&PathBuf::from("services/api"), "api:abc")
            .await
            .unwrap();

        let commands = runner.commands();
        assert_eq!(commands.len(), 1);
        assert!(commands[0].starts_with("eval $(minikube docker-env); cd services/api"));
        assert!(commands[0].contains("-t api:abc"));
    }

    #[tokio::test]
    async fn test_docker_builds_locally_without_push() {
        let runner = ScriptedRunner::new();
        let config = config("docker");
        ImagePackager::new(&runner, &config)
            .package(&PathBuf::from("services/api"), "api:abc")
            .await
            .unwrap();

        let commands = runner.commands();
        assert_eq!(commands.len(), 1);
        assert!(!commands[0].contains("push"));
    }

    #[tokio::test]
    async fn test_build_failure_is_fatal() {
        let runner = ScriptedRunner::new().fail("docker build", "no Dockerfile");
        let config = config("gke");
        let err = ImagePackager::new(&runner, &config)
            .package(&PathBuf::from("services/api"), "api:abc")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("docker build"));
        // Push never ran
        assert_eq!(runner.commands().len(), 1);
    }
}
