//! Azure provisioners for StackFlow
//!
//! This crate implements the Provisioner trait for every resource kind,
//! enabling StackFlow to create IoT Hubs, Event Hubs, Application Insights,
//! storage accounts, App Service sites and diagnostic settings on Azure.
//!
//! # Requirements
//!
//! - The `az` CLI must be installed (with the `azure-iot` extension for
//!   device identities)
//! - Authentication is managed through `az login`
//!
//! # Example
//!
//! ```ignore
//! use stackflow_cloud::Orchestrator;
//! use stackflow_cloud_azure::{AzCli, registry};
//! use std::sync::Arc;
//!
//! let az = Arc::new(AzCli::new().with_subscription("my-subscription"));
//!
//! // Check authentication
//! let auth = az.check_auth().await?;
//! if !auth.authenticated {
//!     panic!("Not authenticated: {:?}", auth.error);
//! }
//!
//! let summary = Orchestrator::new(registry(az)).run(&stack.resources).await?;
//! ```

pub mod az;
pub mod connection;
pub mod error;
pub mod provisioner;
pub mod resources;

pub use az::{AzAccount, AzCli, DEFAULT_TIMEOUT};
pub use error::{AzureError, Result};
pub use provisioner::{AzureProvisioner, output_keys};
pub use resources::AzureResource;

use stackflow_cloud::ProvisionerRegistry;
use stackflow_core::ResourceKind;
use std::sync::Arc;

/// Registry with an Azure provisioner for every resource kind
pub fn registry(az: Arc<AzCli>) -> ProvisionerRegistry {
    let mut registry = ProvisionerRegistry::new();
    for kind in ResourceKind::ALL {
        registry.register(Arc::new(AzureProvisioner::new(kind, Arc::clone(&az))));
    }
    registry
}
