//! ConfigMap synchronization from a configuration tree
//!
//! Each immediate subdirectory of the configuration root becomes one
//! ConfigMap named `<subdirectory>-config`, sourced from that directory's
//! files. Delete-then-create gives replace-all semantics: no stale keys
//! survive a re-run. Must run before the applier so Pods referencing these
//! objects resolve at apply time.

use std::path::Path;

use crate::error::Result;
use crate::exec::CommandRunner;

/// Configuration root, relative to the run root.
pub const CONFIGURATION_ROOT: &str = "services/configurations";

/// Rebuild one ConfigMap per subdirectory of `root`.
pub async fn sync_config_maps(runner: &dyn CommandRunner, root: &Path) -> Result<()> {
    let mut dirs: Vec<_> = std::fs::read_dir(root)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .filter(|entry| entry.path().is_dir())
        .collect();
    dirs.sort_by_key(|entry| entry.file_name());

    for dir in dirs {
        let name = dir.file_name().to_string_lossy().into_owned();
        runner
            .run(&format!(
                "kubectl delete configmap {name}-config --ignore-not-found=true"
            ))
            .await?;
        runner
            .run(&format!(
                "kubectl create configmap {name}-config --from-file={}",
                dir.path().display()
            ))
            .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::ScriptedRunner;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_delete_then_create_per_subdirectory() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("gateway")).unwrap();
        fs::write(dir.path().join("gateway/settings.json"), "{}").unwrap();
        fs::create_dir(dir.path().join("auth")).unwrap();
        fs::write(dir.path().join("stray-file.txt"), "ignored").unwrap();

        let runner = ScriptedRunner::new();
        sync_config_maps(&runner, dir.path()).await.unwrap();

        let commands = runner.commands();
        assert_eq!(commands.len(), 4);
        assert_eq!(
            commands[0],
            "kubectl delete configmap auth-config --ignore-not-found=true"
        );
        assert!(commands[1].starts_with("kubectl create configmap auth-config --from-file="));
        assert_eq!(
            commands[2],
            "kubectl delete configmap gateway-config --ignore-not-found=true"
        );
        assert!(commands[3].contains("gateway-config"));
    }

    #[tokio::test]
    async fn test_create_failure_is_fatal() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("gateway")).unwrap();

        let runner = ScriptedRunner::new().fail("create configmap", "connection refused");
        assert!(sync_config_maps(&runner, dir.path()).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_root_is_fatal() {
        let dir = TempDir::new().unwrap();
        let runner = ScriptedRunner::new();
        assert!(
            sync_config_maps(&runner, &dir.path().join("missing"))
                .await
                .is_err()
        );
    }
}
