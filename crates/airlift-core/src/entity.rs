//! Entity model: parsed manifest documents grouped by resource kind

use std::path::PathBuf;

use indexmap::IndexMap;
use serde_yaml::Value;

use crate::error::{CoreError, Result};

/// Kind application order. Lower index applies first; kinds absent from the
/// table apply after all listed kinds, stable in discovery order.
pub const KIND_PRIORITY: [&str; 11] = [
    "Role",
    "RoleBinding",
    "ConfigMap",
    "Secret",
    "PersistentVolume",
    "PersistentVolumeClaim",
    "ServiceAccount",
    "Service",
    "StatefulSet",
    "Deployment",
    "Job",
];

fn kind_rank(kind: &str) -> usize {
    KIND_PRIORITY
        .iter()
        .position(|k| *k == kind)
        .unwrap_or(KIND_PRIORITY.len())
}

/// One structured configuration document as parsed from a manifest file.
///
/// `kind` and `metadata.name` are extracted at parse time; the full document
/// value is retained for rewriting and serialization.
#[derive(Debug, Clone)]
pub struct ManifestDocument {
    value: Value,
    kind: String,
    name: String,
}

impl ManifestDocument {
    /// Wrap an already-parsed YAML value. Fails if the document is not a
    /// mapping carrying `kind` and `metadata.name`.
    pub fn from_value(value: Value, path: &str) -> Result<Self> {
        let kind = value
            .get("kind")
            .and_then(Value::as_str)
            .map(String::from)
            .ok_or_else(|| CoreError::InvalidDocument {
                path: path.to_string(),
                message: "document has no kind".to_string(),
            })?;

        let name = value
            .get("metadata")
            .and_then(|m| m.get("name"))
            .and_then(Value::as_str)
            .map(String::from)
            .ok_or_else(|| CoreError::InvalidDocument {
                path: path.to_string(),
                message: "document has no metadata.name".to_string(),
            })?;

        Ok(Self { value, kind, name })
    }

    /// Parse a single YAML document.
    pub fn from_yaml(yaml: &str, path: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(yaml)?;
        Self::from_value(value, path)
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Serialize the document back to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.value)?)
    }

    /// Set `metadata.labels.version`, creating the labels mapping when the
    /// document has none.
    pub fn set_version_label(&mut self, version: &str) -> Result<()> {
        let metadata = self
            .value
            .get_mut("metadata")
            .and_then(Value::as_mapping_mut)
            .ok_or_else(|| CoreError::InvalidDocument {
                path: format!("{}/{}", self.kind, self.name),
                message: "metadata is not a mapping".to_string(),
            })?;

        let labels_key = Value::from("labels");
        if !metadata.contains_key(&labels_key) {
            metadata.insert(labels_key.clone(), Value::Mapping(Default::default()));
        }

        let labels = metadata
            .get_mut(&labels_key)
            .and_then(Value::as_mapping_mut)
            .ok_or_else(|| CoreError::InvalidDocument {
                path: format!("{}/{}", self.kind, self.name),
                message: "metadata.labels is not a mapping".to_string(),
            })?;

        labels.insert(Value::from("version"), Value::from(version));
        Ok(())
    }
}

/// A manifest document plus orchestrator-derived resolution state.
#[derive(Debug, Clone)]
pub struct Entity {
    pub document: ManifestDocument,
    /// The manifest file this document came from.
    pub manifest_path: PathBuf,
    /// Directory holding the build instructions for this entity's image,
    /// set when the document carried the image placeholder.
    pub build_context: Option<PathBuf>,
    /// Resolved content-addressed image reference.
    pub image: Option<String>,
}

impl Entity {
    pub fn new(document: ManifestDocument, manifest_path: PathBuf) -> Self {
        Self {
            document,
            manifest_path,
            build_context: None,
            image: None,
        }
    }
}

/// Entities partitioned by resource kind, insertion order preserved.
#[derive(Debug, Default)]
pub struct EntityGroup {
    groups: IndexMap<String, Vec<Entity>>,
}

impl EntityGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a group from discovered entities. Pure: ordering and grouping
    /// depend only on the input sequence.
    pub fn from_entities(entities: impl IntoIterator<Item = Entity>) -> Self {
        let mut group = Self::new();
        for entity in entities {
            group.insert(entity);
        }
        group
    }

    pub fn insert(&mut self, entity: Entity) {
        self.groups
            .entry(entity.document.kind().to_string())
            .or_default()
            .push(entity);
    }

    /// Number of distinct kinds.
    pub fn kind_count(&self) -> usize {
        self.groups.len()
    }

    /// Total number of entities across all kinds.
    pub fn entity_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// All entities in discovery order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.groups.values().flatten()
    }

    /// Mutable view over all entities, for image resolution.
    pub fn entities_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.groups.values_mut().flatten()
    }

    /// Kinds with their entities, sorted by the priority table. The sort is
    /// stable, so kinds outside the table keep their discovery order after
    /// all known kinds.
    pub fn in_priority_order(&self) -> Vec<(&str, &[Entity])> {
        let mut ordered: Vec<(&str, &[Entity])> = self
            .groups
            .iter()
            .map(|(kind, entities)| (kind.as_str(), entities.as_slice()))
            .collect();
        ordered.sort_by_key(|(kind, _)| kind_rank(kind));
        ordered
    }
}
