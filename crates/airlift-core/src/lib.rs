//! Airlift Core - Core types for the Airlift deployment orchestrator
//!
//! This crate provides the foundational pieces used throughout Airlift:
//! - `DeployConfig` / `Destination`: run configuration resolved once at startup
//! - `ManifestDocument` / `Entity` / `EntityGroup`: the parsed manifest model
//! - Manifest collection: glob discovery and multi-document parsing
//! - Image primitives: the placeholder substitution contract and build-context
//!   package metadata
//!
//! Everything here is synchronous and side-effect free apart from reading the
//! manifest tree; process execution lives in `airlift-kube`.

pub mod collect;
pub mod config;
pub mod entity;
pub mod error;
pub mod image;

pub use collect::{collect_entities, discover_manifests, entities_from_files, MANIFEST_PATTERN};
pub use config::{DeployConfig, Destination, GkeConfig};
pub use entity::{Entity, EntityGroup, ManifestDocument, KIND_PRIORITY};
pub use error::{CoreError, Result};
pub use image::{sanitize_image_name, substitute_image, PackageMeta, IMAGE_MARKER};
