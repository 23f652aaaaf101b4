//! Deploy command - run the full deployment pipeline

use std::path::Path;

use console::style;

use airlift_core::DeployConfig;
use airlift_kube::{Deployer, ShellRunner};

use crate::error::Result;

/// Run the deploy command
#[allow(clippy::too_many_arguments)]
pub async fn run(
    destination: &str,
    npm_token: Option<String>,
    cluster: Option<String>,
    project_id: Option<String>,
    zone: Option<String>,
    keep_deploy_files: bool,
    ci: bool,
    root: &Path,
) -> Result<()> {
    // All precondition checks happen here, before any external action.
    let config = DeployConfig::resolve(
        destination,
        npm_token,
        cluster,
        project_id,
        zone,
        keep_deploy_files,
        ci,
    )?;

    println!(
        "{} Deploying to {} from {}",
        style("→").blue().bold(),
        style(config.destination).cyan(),
        style(root.display()).yellow()
    );

    let deployer = Deployer::new(config, ShellRunner::new());
    deployer.run(root).await?;

    println!(
        "{} Deployment complete",
        style("✓").green().bold()
    );

    Ok(())
}
