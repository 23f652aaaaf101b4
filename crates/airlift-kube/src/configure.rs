//! One-time environment setup per destination
//!
//! A single setup pass runs before anything else touches the cluster.
//! Context and project selection failures are fatal; the GKE bootstrap
//! actions are idempotent and individually tolerated, with the
//! already-exists conflict class recognized explicitly.

use tracing::{info, warn};

use airlift_core::{DeployConfig, Destination, GkeConfig};

use crate::error::Result;
use crate::exec::CommandRunner;

/// Run the setup pass for the configured destination.
pub async fn configure_environment(
    runner: &dyn CommandRunner,
    config: &DeployConfig,
) -> Result<()> {
    match config.destination {
        Destination::Gke => configure_gke(runner, config.gke()?).await,
        Destination::Minikube => configure_minikube(runner).await,
        Destination::Docker => {
            runner
                .run("kubectl config use-context docker-for-desktop")
                .await?;
            Ok(())
        }
    }
}

/// Idempotent GKE bootstrap actions: privilege binding plus the four
/// service firewall rules.
const GKE_BOOTSTRAP: [&str; 5] = [
    "kubectl create clusterrolebinding cluster-admin-binding --clusterrole cluster-admin --user $(gcloud config get-value account)",
    "gcloud compute firewall-rules create minio --allow tcp:30009",
    "gcloud compute firewall-rules create ganache --allow tcp:30045",
    "gcloud compute firewall-rules create pg --allow tcp:30032",
    "gcloud compute firewall-rules create rabbitmq --allow tcp:30672",
];

async fn configure_gke(runner: &dyn CommandRunner, gke: &GkeConfig) -> Result<()> {
    runner
        .run(&format!(
            "kubectl config use-context gke_{}_{}_{}",
            gke.project_id, gke.zone, gke.cluster
        ))
        .await?;
    runner
        .run(&format!("gcloud config set project {}", gke.project_id))
        .await?;

    for action in GKE_BOOTSTRAP {
        match runner.run(action).await {
            Ok(_) => {}
            Err(e) if e.is_already_exists() => {
                info!("Bootstrap object already exists, continuing: {action}");
            }
            Err(e) => {
                warn!("Bootstrap action failed, continuing: {e}");
            }
        }
    }

    Ok(())
}

async fn configure_minikube(runner: &dyn CommandRunner) -> Result<()> {
    runner.run("kubectl config use-context minikube").await?;
    runner.run("minikube addons enable ingress").await?;

    // Persistent data directories inside the VM, symlinked to survive
    // minikube restarts.
    for dir in ["minio", "ganache"] {
        runner
            .run(&format!(
                "echo \"sudo mkdir /data/{dir}; sudo ln -s /data/{dir} /var/{dir}; exit\" | minikube ssh"
            ))
            .await?;
    }

    Ok(())
}
