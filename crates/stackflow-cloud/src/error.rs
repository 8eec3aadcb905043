//! Provisioning error types

use stackflow_core::{AttributeRef, ResourceKind, StackError};
use thiserror::Error;

/// Provisioning errors
#[derive(Error, Debug)]
pub enum CloudError {
    /// Structural descriptor errors (cycle, unknown dependency, duplicates).
    /// These abort a run before anything is provisioned.
    #[error(transparent)]
    Stack(#[from] StackError),

    #[error("Attribute already set: {0}")]
    DuplicateAttribute(AttributeRef),

    #[error("Unresolved reference: {0}")]
    UnresolvedReference(AttributeRef),

    #[error("Provisioner not found for kind: {0}")]
    ProvisionerNotFound(ResourceKind),

    #[error("{kind} provisioner failed: {message}")]
    Provisioner { kind: ResourceKind, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    pub fn provisioner(kind: ResourceKind, message: impl Into<String>) -> Self {
        CloudError::Provisioner {
            kind,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
