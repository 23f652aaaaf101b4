//! Airlift CLI - deploy declarative manifests and content-addressed images
//! to a Kubernetes cluster

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod error;
mod exit_codes;

#[derive(Parser)]
#[command(name = "airlift")]
#[command(author = "Airlift Contributors")]
#[command(version)]
#[command(about = "Deploy declarative manifests to a Kubernetes cluster", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve images, build containers, and apply manifests in order
    Deploy {
        /// Deployment destination: gke, minikube, or docker
        #[arg(long, env = "DEPLOY_DESTINATION")]
        destination: String,

        /// Registry auth token passed to image builds
        #[arg(long, env = "NPM_TOKEN", hide_env_values = true)]
        npm_token: Option<String>,

        /// GKE cluster name (required for gke)
        #[arg(long, env = "GCLOUD_CLUSTER")]
        cluster: Option<String>,

        /// GKE project id (required for gke)
        #[arg(long, env = "GCLOUD_PROJECT_ID")]
        project_id: Option<String>,

        /// GKE compute zone (required for gke)
        #[arg(long, env = "GCLOUD_ZONE")]
        zone: Option<String>,

        /// Keep transient manifest files after apply
        #[arg(long, env = "KEEP_DEPLOY_FILES")]
        keep_deploy_files: bool,

        /// Automated execution context
        #[arg(long, env = "CI")]
        ci: bool,

        /// Root directory to scan for manifests
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();

    if cli.debug {
        // SAFETY: We're the only thread interested in this variable at
        // startup of main
        unsafe { std::env::set_var("RUST_BACKTRACE", "1") };
    }

    let result = match cli.command {
        Commands::Deploy {
            destination,
            npm_token,
            cluster,
            project_id,
            zone,
            keep_deploy_files,
            ci,
            root,
        } => {
            commands::deploy::run(
                &destination,
                npm_token,
                cluster,
                project_id,
                zone,
                keep_deploy_files,
                ci,
                &root,
            )
            .await
        }
    };

    if let Err(err) = result {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}
