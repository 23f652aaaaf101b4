//! Image resolution over collected entities
//!
//! For every entity that carries a build context, compute the image
//! identity from the context's package metadata and the folder hash,
//! rewrite the placeholder in the document, and stamp the version label.

use std::path::Path;

use tracing::info;

use airlift_core::{
    substitute_image, DeployConfig, Entity, EntityGroup, ManifestDocument, PackageMeta,
};

use crate::error::Result;
use crate::exec::CommandRunner;
use crate::hash::hash_folder_state;

/// Registry host for remote-destination image identities.
pub const REGISTRY_HOST: &str = "gcr.io";

/// Resolves placeholder image references over an entity group.
pub struct ImageResolver<'a> {
    runner: &'a dyn CommandRunner,
    config: &'a DeployConfig,
}

impl<'a> ImageResolver<'a> {
    pub fn new(runner: &'a dyn CommandRunner, config: &'a DeployConfig) -> Self {
        Self { runner, config }
    }

    /// Resolve every entity that was marked during collection. After this
    /// returns, no applied document contains the placeholder marker.
    pub async fn resolve_group(&self, group: &mut EntityGroup) -> Result<()> {
        for entity in group.entities_mut() {
            let Some(context) = entity.build_context.clone() else {
                continue;
            };
            self.resolve_entity(entity, &context).await?;
        }
        Ok(())
    }

    async fn resolve_entity(&self, entity: &mut Entity, context: &Path) -> Result<()> {
        let meta = PackageMeta::load(context)?;
        let name = meta.sanitized_name();

        let hash = hash_folder_state(self.runner, context).await?;
        let image = self.image_identity(&name, &hash)?;
        info!("Resolved image {image} for {}", entity.document.name());

        let yaml = entity.document.to_yaml()?;
        let rewritten = substitute_image(&yaml, &image)?;
        let mut document =
            ManifestDocument::from_yaml(&rewritten, &entity.manifest_path.display().to_string())?;
        document.set_version_label(&meta.version)?;

        entity.document = document;
        entity.image = Some(image);
        Ok(())
    }

    /// Local destinations tag bare `<name>:<hash>`; the remote destination
    /// qualifies with the registry and project.
    fn image_identity(&self, name: &str, hash: &str) -> Result<String> {
        if self.config.destination.is_remote() {
            let project = &self.config.gke()?.project_id;
            Ok(format!("{REGISTRY_HOST}/{project}/{name}:{hash}"))
        } else {
            Ok(format!("{name}:{hash}"))
        }
    }
}
