//! Build-context state hashing
//!
//! The tag for a build context is `<commit id><md5 of the uncommitted diff
//! restricted to that path>`. A clean tree at a given commit always hashes
//! the same, so image caches stay warm; any local edit under the context
//! produces a distinct, reproducible tag without requiring a commit.

use std::path::Path;

use md5::{Digest, Md5};

use crate::error::Result;
use crate::exec::CommandRunner;

/// Derive the content-addressed tag for a build context directory.
///
/// Read-only against version control: one commit-id query plus one diff
/// restricted to `path`.
pub async fn hash_folder_state(runner: &dyn CommandRunner, path: &Path) -> Result<String> {
    let commit = runner.run("git rev-parse HEAD").await?;
    let commit = commit.stdout.trim();

    let diff = runner
        .run(&format!("git diff {}", path.display()))
        .await?;
    let diff = diff.stdout.trim();

    let digest = Md5::digest(diff.as_bytes());
    Ok(format!("{commit}{}", hex::encode(digest)))
}
