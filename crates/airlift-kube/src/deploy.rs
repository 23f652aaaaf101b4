//! End-to-end deployment pipeline
//!
//! Environment setup, manifest collection, image resolution, ConfigMap
//! synchronization, then ordered application. One logical thread of
//! control: every external action completes before the next begins, so
//! the priority-table order is also the wall-clock order.

use std::path::Path;

use tracing::info;

use airlift_core::{collect_entities, DeployConfig};

use crate::apply::{OrderedApplier, DEPLOY_DIR};
use crate::configmap::{sync_config_maps, CONFIGURATION_ROOT};
use crate::configure::configure_environment;
use crate::error::Result;
use crate::exec::CommandRunner;
use crate::resolve::ImageResolver;

/// Runs the whole deployment pipeline against one run root.
pub struct Deployer<R: CommandRunner> {
    config: DeployConfig,
    runner: R,
}

impl<R: CommandRunner> Deployer<R> {
    pub fn new(config: DeployConfig, runner: R) -> Self {
        Self { config, runner }
    }

    pub fn config(&self) -> &DeployConfig {
        &self.config
    }

    /// Execute one deployment run. Fatal failures abort immediately;
    /// resources applied before the failure stay applied.
    pub async fn run(&self, root: &Path) -> Result<()> {
        stamp("START CONFIGURATION");
        configure_environment(&self.runner, &self.config).await?;
        stamp("FINISHED CONFIGURATION");

        let mut entities = collect_entities(root, self.config.destination.is_remote())?;
        info!(
            "Collected {} entities across {} kinds",
            entities.entity_count(),
            entities.kind_count()
        );

        ImageResolver::new(&self.runner, &self.config)
            .resolve_group(&mut entities)
            .await?;

        sync_config_maps(&self.runner, &root.join(CONFIGURATION_ROOT)).await?;

        stamp("START DEPLOYMENT");
        OrderedApplier::new(&self.runner, &self.config)
            .with_deploy_dir(root.join(DEPLOY_DIR))
            .apply(&entities)
            .await?;
        stamp("FINISHED DEPLOYMENT");

        Ok(())
    }
}

fn stamp(message: &str) {
    info!(
        "========= {} - {message}",
        chrono::Local::now().format("%H:%M:%S")
    );
}
