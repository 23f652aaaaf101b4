//! Manifest discovery and entity collection
//!
//! Discovery walks the tree for `k8s*.yaml` files; collection parses each
//! file as a sequence of YAML documents and groups the results by kind.
//! The two halves are separate functions so grouping and marker detection
//! are testable without a filesystem walk.

use std::path::{Component, Path, PathBuf};

use serde::Deserialize;
use serde_yaml::Value;

use crate::entity::{Entity, EntityGroup, ManifestDocument};
use crate::error::{CoreError, Result};
use crate::image::IMAGE_MARKER;

/// Include pattern for manifest files, relative to the run root.
pub const MANIFEST_PATTERN: &str = "**/k8s*.yaml";

/// Dependency directories are never scanned.
const DEPENDENCY_DIR: &str = "node_modules";

/// Secret manifests stay local; excluded for the remote destination.
const SECRETS_DIR: &str = "secrets";

/// Find manifest files under `root`, in deterministic (sorted) order.
pub fn discover_manifests(root: &Path, exclude_secrets: bool) -> Result<Vec<PathBuf>> {
    let pattern = root.join(MANIFEST_PATTERN);
    let pattern = pattern.to_string_lossy();

    let mut files = Vec::new();
    for path in glob::glob(&pattern)? {
        let path = path?;
        if has_component(&path, DEPENDENCY_DIR) {
            continue;
        }
        if exclude_secrets && has_component(&path, SECRETS_DIR) {
            continue;
        }
        files.push(path);
    }

    files.sort();
    Ok(files)
}

fn has_component(path: &Path, dir: &str) -> bool {
    path.components()
        .any(|c| matches!(c, Component::Normal(name) if name == dir))
}

/// Parse the discovered manifest files into an `EntityGroup`.
///
/// Pure apart from reading the named files: ordering and grouping depend
/// only on the input sequence. A document whose serialized form contains
/// the image placeholder gets its build context recorded (two directory
/// levels above the manifest file). Malformed documents are fatal.
pub fn entities_from_files(files: &[PathBuf]) -> Result<EntityGroup> {
    let mut entities = Vec::new();

    for file in files {
        let content = std::fs::read_to_string(file)?;
        let path_label = file.display().to_string();

        for deserializer in serde_yaml::Deserializer::from_str(&content) {
            let value = Value::deserialize(deserializer)?;
            if value.is_null() {
                continue;
            }

            let document = ManifestDocument::from_value(value, &path_label)?;
            let mut entity = Entity::new(document, file.clone());

            if entity.document.to_yaml()?.contains(IMAGE_MARKER) {
                entity.build_context = Some(build_context_for(file)?);
            }

            entities.push(entity);
        }
    }

    Ok(EntityGroup::from_entities(entities))
}

/// Discover and collect in one step.
pub fn collect_entities(root: &Path, exclude_secrets: bool) -> Result<EntityGroup> {
    let files = discover_manifests(root, exclude_secrets)?;
    entities_from_files(&files)
}

/// The build context is the manifest directory's parent: manifests live in
/// `<context>/k8s/k8s-*.yaml`.
fn build_context_for(manifest: &Path) -> Result<PathBuf> {
    manifest
        .parent()
        .and_then(Path::parent)
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .ok_or_else(|| CoreError::NoBuildContext {
            path: manifest.display().to_string(),
        })
}
