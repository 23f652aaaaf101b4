//! Image reference primitives
//!
//! The placeholder substitution is a textual rewrite of the serialized
//! document with a fixed contract: the marker text is exactly
//! `<!--image-->` and each document carries exactly one occurrence. Keeping
//! the contract here lets it be tested independently of document parsing.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::error::{CoreError, Result};

/// Textual sentinel marking an image reference to be resolved before apply.
pub const IMAGE_MARKER: &str = "<!--image-->";

static NON_ALPHABETIC: Lazy<Regex> =
    Lazy::new(|| Regex::new("[^a-zA-Z]").expect("valid regex"));

/// Replace the image placeholder with a resolved reference.
///
/// Exactly one occurrence must be present; zero or multiple occurrences
/// violate the contract and fail.
pub fn substitute_image(yaml: &str, image: &str) -> Result<String> {
    let found = yaml.matches(IMAGE_MARKER).count();
    if found != 1 {
        return Err(CoreError::MarkerSubstitution { found });
    }
    Ok(yaml.replacen(IMAGE_MARKER, image, 1))
}

/// Strip everything but ASCII letters, so package names are valid image
/// repository names.
pub fn sanitize_image_name(name: &str) -> String {
    NON_ALPHABETIC.replace_all(name, "").into_owned()
}

/// `name`/`version` read from a build context's `package.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageMeta {
    pub name: String,
    pub version: String,
}

impl PackageMeta {
    /// Load the package metadata file from a build context directory.
    pub fn load(context_dir: &Path) -> Result<Self> {
        let path = context_dir.join("package.json");
        let content = std::fs::read_to_string(&path).map_err(|e| CoreError::PackageMeta {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| CoreError::PackageMeta {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// The package name with all non-alphabetic characters removed.
    pub fn sanitized_name(&self) -> String {
        sanitize_image_name(&self.name)
    }
}
