//! StackFlow Cloud Provisioning
//!
//! This crate provides the provisioner abstraction and the execution engine
//! that provisions a set of interdependent cloud resources in dependency
//! order, propagating produced values into dependent configuration.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  StackFlow CLI                   │
//! │                   (stack up)                     │
//! └─────────────────┬───────────────────────────────┘
//!                   │ &[ResourceDescriptor]
//! ┌─────────────────▼───────────────────────────────┐
//! │               stackflow-cloud                    │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │   Orchestrator → Run::execute → Summary   │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────────────┐    │
//! │  │  ValueStore  │  │ ProvisionerRegistry  │    │
//! │  └──────────────┘  └──────────┬───────────┘    │
//! └───────────────────────────────┼─────────────────┘
//!                                 │ trait Provisioner
//!                         ┌───────▼───────┐
//!                         │     azure     │
//!                         │ provisioners  │
//!                         └───────────────┘
//! ```

pub mod engine;
pub mod error;
pub mod provisioner;
pub mod record;
pub mod registry;
pub mod report;
pub mod store;

// Re-exports
pub use engine::{Orchestrator, Run, RunObserver};
pub use error::{CloudError, Result};
pub use provisioner::{AuthStatus, ProvisionRequest, ProvisionResult, Provisioner};
pub use record::{ExecutionRecord, ExecutionStatus, Failure, FailureKind, RunState, SkipReason};
pub use registry::ProvisionerRegistry;
pub use report::{EnvExport, Summary, report};
pub use store::{ResolvedConfig, ValueStore, resolve_config};
