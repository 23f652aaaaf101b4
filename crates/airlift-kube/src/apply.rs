//! Ordered application of entity groups to the cluster
//!
//! Groups apply in the fixed kind priority order, entities within a group
//! in discovery order. Entities carrying a build context get their image
//! built (and pushed, remote) immediately before apply, so the reference
//! inside the manifest always exists by the time kubectl reads it. Each
//! document is written to a transient file, applied, and cleaned up unless
//! retention was requested.

use std::path::{Path, PathBuf};

use tracing::info;

use airlift_core::{DeployConfig, Entity, EntityGroup};

use crate::error::{KubeError, Result};
use crate::exec::CommandRunner;
use crate::package::ImagePackager;

/// Transient manifest directory, relative to the run root.
pub const DEPLOY_DIR: &str = "temp/deploy";

/// Applies an `EntityGroup` to the cluster in priority order.
pub struct OrderedApplier<'a> {
    runner: &'a dyn CommandRunner,
    config: &'a DeployConfig,
    deploy_dir: PathBuf,
}

impl<'a> OrderedApplier<'a> {
    pub fn new(runner: &'a dyn CommandRunner, config: &'a DeployConfig) -> Self {
        Self {
            runner,
            config,
            deploy_dir: PathBuf::from(DEPLOY_DIR),
        }
    }

    /// Override the transient manifest directory.
    pub fn with_deploy_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.deploy_dir = dir.into();
        self
    }

    /// Apply all groups. Any apply failure aborts the remaining entities
    /// and groups; already-applied resources stay applied.
    pub async fn apply(&self, group: &EntityGroup) -> Result<()> {
        std::fs::create_dir_all(&self.deploy_dir)?;
        let packager = ImagePackager::new(self.runner, self.config);

        for (index, (kind, entities)) in group.in_priority_order().into_iter().enumerate() {
            info!("{}. {kind}", index + 1);

            for entity in entities {
                self.apply_entity(&packager, kind, entity).await?;
            }
        }

        Ok(())
    }

    async fn apply_entity(
        &self,
        packager: &ImagePackager<'_>,
        kind: &str,
        entity: &Entity,
    ) -> Result<()> {
        let name = entity.document.name();
        info!("Apply {kind} {name}");

        // Build before apply: the manifest references this image.
        if let Some(context) = &entity.build_context {
            let image = entity
                .image
                .as_deref()
                .ok_or_else(|| KubeError::UnresolvedImage {
                    kind: kind.to_string(),
                    name: name.to_string(),
                })?;
            packager.package(context, image).await?;
        }

        let file = self.deploy_dir.join(format!("{kind}-{name}.yaml"));
        std::fs::write(&file, entity.document.to_yaml()?)?;

        let result = self.apply_file(kind, &file).await;

        if self.config.keep_deploy_files {
            return result;
        }
        match result {
            Ok(()) => {
                std::fs::remove_file(&file)?;
                Ok(())
            }
            Err(e) => {
                // Best effort: the apply failure is the error worth surfacing.
                let _ = std::fs::remove_file(&file);
                Err(e)
            }
        }
    }

    async fn apply_file(&self, kind: &str, file: &Path) -> Result<()> {
        // Jobs are immutable once created; reapplication requires deletion.
        if kind == "Job" {
            self.runner
                .run(&format!(
                    "kubectl delete -f {} --ignore-not-found=true",
                    file.display()
                ))
                .await?;
        }

        info!("Start application of {}", file.display());
        self.runner
            .run(&format!("kubectl apply -f {}", file.display()))
            .await?;
        info!("Finished application of {}", file.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::ScriptedRunner;
    use airlift_core::{EntityGroup, ManifestDocument};
    use tempfile::TempDir;

    fn config(keep_deploy_files: bool) -> DeployConfig {
        DeployConfig::resolve(
            "docker",
            Some("token".into()),
            None,
            None,
            None,
            keep_deploy_files,
            false,
        )
        .unwrap()
    }

    fn entity(kind: &str, name: &str) -> Entity {
        let yaml = format!("apiVersion: v1\nkind: {kind}\nmetadata:\n  name: {name}\n");
        Entity::new(
            ManifestDocument::from_yaml(&yaml, "test.yaml").unwrap(),
            PathBuf::from("test.yaml"),
        )
    }

    fn built_entity(kind: &str, name: &str, image: Option<&str>) -> Entity {
        let mut e = entity(kind, name);
        e.build_context = Some(PathBuf::from("services/api"));
        e.image = image.map(String::from);
        e
    }

    #[tokio::test]
    async fn test_priority_scenario_secret_deployment_job() {
        let dir = TempDir::new().unwrap();
        let group = EntityGroup::from_entities([
            entity("Deployment", "b"),
            entity("Job", "c"),
            entity("Secret", "a"),
        ]);

        let runner = ScriptedRunner::new();
        let config = config(false);
        OrderedApplier::new(&runner, &config)
            .with_deploy_dir(dir.path())
            .apply(&group)
            .await
            .unwrap();

        let commands = runner.commands();
        assert_eq!(commands.len(), 4);
        assert!(commands[0].starts_with("kubectl apply -f"));
        assert!(commands[0].contains("Secret-a.yaml"));
        assert!(commands[1].contains("Deployment-b.yaml"));
        // Jobs get delete-if-exists immediately before apply
        assert!(commands[2].starts_with("kubectl delete -f"));
        assert!(commands[2].contains("Job-c.yaml"));
        assert!(commands[2].contains("--ignore-not-found=true"));
        assert!(commands[3].starts_with("kubectl apply -f"));
        assert!(commands[3].contains("Job-c.yaml"));
    }

    #[tokio::test]
    async fn test_build_runs_before_apply() {
        let dir = TempDir::new().unwrap();
        let group = EntityGroup::from_entities([built_entity("Deployment", "api", Some("api:abc"))]);

        let runner = ScriptedRunner::new();
        let config = config(false);
        OrderedApplier::new(&runner, &config)
            .with_deploy_dir(dir.path())
            .apply(&group)
            .await
            .unwrap();

        let commands = runner.commands();
        assert_eq!(commands.len(), 2);
        assert!(commands[0].contains("docker build"));
        assert!(commands[1].starts_with("kubectl apply"));
    }

    #[tokio::test]
    async fn test_unresolved_image_is_an_invariant_violation() {
        let dir = TempDir::new().unwrap();
        let group = EntityGroup::from_entities([built_entity("Deployment", "api", None)]);

        let runner = ScriptedRunner::new();
        let config = config(false);
        let err = OrderedApplier::new(&runner, &config)
            .with_deploy_dir(dir.path())
            .apply(&group)
            .await
            .unwrap_err();

        assert!(matches!(err, KubeError::UnresolvedImage { .. }));
        assert!(runner.commands().is_empty());
    }

    #[tokio::test]
    async fn test_transient_files_are_cleaned_up() {
        let dir = TempDir::new().unwrap();
        let group = EntityGroup::from_entities([entity("Service", "api")]);

        let runner = ScriptedRunner::new();
        let config = config(false);
        OrderedApplier::new(&runner, &config)
            .with_deploy_dir(dir.path())
            .apply(&group)
            .await
            .unwrap();

        assert!(!dir.path().join("Service-api.yaml").exists());
    }

    #[tokio::test]
    async fn test_retention_flag_keeps_transient_files() {
        let dir = TempDir::new().unwrap();
        let group = EntityGroup::from_entities([entity("Service", "api")]);

        let runner = ScriptedRunner::new();
        let config = config(true);
        OrderedApplier::new(&runner, &config)
            .with_deploy_dir(dir.path())
            .apply(&group)
            .await
            .unwrap();

        let file = dir.path().join("Service-api.yaml");
        assert!(file.exists());
        let content = std::fs::read_to_string(file).unwrap();
        assert!(content.contains("kind: Service"));
    }

    #[tokio::test]
    async fn test_apply_failure_aborts_remaining_groups_and_cleans_up() {
        let dir = TempDir::new().unwrap();
        let group = EntityGroup::from_entities([
            entity("Secret", "a"),
            entity("Deployment", "b"),
            entity("Job", "c"),
        ]);

        let runner = ScriptedRunner::new().fail("Deployment-b.yaml", "connection refused");
        let config = config(false);
        let err = OrderedApplier::new(&runner, &config)
            .with_deploy_dir(dir.path())
            .apply(&group)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Deployment-b.yaml"));
        // The Job group never ran
        let commands = runner.commands();
        assert!(!commands.iter().any(|c| c.contains("Job-c")));
        // Cleanup happened despite the failure
        assert!(!dir.path().join("Deployment-b.yaml").exists());
    }
}
