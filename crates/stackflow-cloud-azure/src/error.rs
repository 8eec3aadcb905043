//! Azure provider error types

use stackflow_cloud::CloudError;
use stackflow_core::ResourceKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AzureError {
    #[error("az not found. Please install the Azure CLI: https://aka.ms/azure-cli")]
    AzNotFound,

    #[error("Azure authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("az {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("Unexpected az output: {0}")]
    UnexpectedOutput(String),

    #[error("az {0} timed out")]
    Timeout(String),

    #[error("az {0} cancelled")]
    Cancelled(String),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Cloud error: {0}")]
    CloudError(#[from] CloudError),
}

impl AzureError {
    /// Convert into the engine's error type for a failing resource kind
    pub fn into_cloud(self, kind: ResourceKind) -> CloudError {
        match self {
            AzureError::Timeout(command) => CloudError::Timeout(format!("az {}", command)),
            AzureError::Cancelled(command) => CloudError::Cancelled(format!("az {}", command)),
            AzureError::AuthenticationFailed(message) => CloudError::AuthenticationFailed(message),
            AzureError::CloudError(e) => e,
            other => CloudError::provisioner(kind, other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, AzureError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_cloud() {
        let timeout = AzureError::Timeout("iot hub create".into()).into_cloud(ResourceKind::Hub);
        assert!(matches!(timeout, CloudError::Timeout(ref m) if m == "az iot hub create"));

        let failed = AzureError::CommandFailed {
            command: "group create".into(),
            stderr: "InvalidLocation".into(),
        }
        .into_cloud(ResourceKind::ResourceGroup);
        match failed {
            CloudError::Provisioner { kind, message } => {
                assert_eq!(kind, ResourceKind::ResourceGroup);
                assert!(message.contains("InvalidLocation"));
            }
            other => panic!("unexpected error: {other}"),
        }

        let invalid = AzureError::CloudError(CloudError::InvalidConfig("sku".into()))
            .into_cloud(ResourceKind::Storage);
        assert!(matches!(invalid, CloudError::InvalidConfig(_)));
    }
}
