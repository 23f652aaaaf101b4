//! Airlift Kube - Cluster operations for the Airlift deployment orchestrator
//!
//! This crate provides:
//! - **Command Executor**: streamed external process execution behind the
//!   `CommandRunner` seam
//! - **Folder Hasher**: content-addressed tags from git state
//! - **Image Resolver**: placeholder rewriting over collected entities
//! - **Environment Configurator**: one-time destination setup
//! - **ConfigMap Synchronizer**: replace-all config objects per directory
//! - **Image Packager**: destination-conditional docker build/push
//! - **Ordered Applier**: priority-table ordered `kubectl apply`
//! - **Deployer**: the end-to-end pipeline
//!
//! Every external action is awaited to completion before the next begins;
//! application order is a deliberate guarantee, not an accident of timing.

pub mod apply;
pub mod configmap;
pub mod configure;
pub mod deploy;
pub mod error;
pub mod exec;
pub mod hash;
pub mod package;
pub mod resolve;

pub use apply::{OrderedApplier, DEPLOY_DIR};
pub use configmap::{sync_config_maps, CONFIGURATION_ROOT};
pub use configure::configure_environment;
pub use deploy::Deployer;
pub use error::{KubeError, Result};
pub use exec::{CommandOutput, CommandRunner, ScriptedRunner, ShellRunner};
pub use hash::hash_folder_state;
pub use package::ImagePackager;
pub use resolve::{ImageResolver, REGISTRY_HOST};
