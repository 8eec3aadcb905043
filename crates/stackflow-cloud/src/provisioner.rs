//! Provisioner trait definition

use crate::error::Result;
use crate::store::ResolvedConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use stackflow_core::ResourceKind;
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;

/// Provisioner abstraction trait
///
/// One implementation exists per resource kind. `create_or_update` must be
/// idempotent: calling it for a resource that already exists with the same
/// configuration succeeds and returns the existing resource.
#[async_trait]
pub trait Provisioner: Send + Sync {
    /// The resource kind this provisioner handles
    fn kind(&self) -> ResourceKind;

    /// Check the resolved configuration before any remote call is made
    fn validate(&self, _request: &ProvisionRequest) -> Result<()> {
        Ok(())
    }

    /// Create the resource, or update it in place when it already exists
    async fn create_or_update(&self, request: &ProvisionRequest) -> Result<Value>;

    /// Extract the attributes dependents may reference
    async fn extract_outputs(
        &self,
        request: &ProvisionRequest,
        created: Value,
    ) -> Result<ProvisionResult>;
}

/// Everything a provisioner receives for one resource
#[derive(Debug, Clone)]
pub struct ProvisionRequest {
    /// Descriptor name, unique within a run
    pub resource: String,

    /// Name of the remote resource
    pub name: String,

    pub kind: ResourceKind,

    /// Configuration with every reference replaced by its value
    pub config: ResolvedConfig,

    /// Fires when the run is cancelled
    pub cancellation: CancellationToken,
}

impl ProvisionRequest {
    pub fn new(
        resource: impl Into<String>,
        name: impl Into<String>,
        kind: ResourceKind,
        config: ResolvedConfig,
    ) -> Self {
        Self {
            resource: resource.into(),
            name: name.into(),
            kind,
            config,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }
}

/// Attributes produced by a successful provisioning call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProvisionResult {
    pub attributes: BTreeMap<String, Value>,
}

impl ProvisionResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(attribute.into(), value.into());
        self
    }

    /// Add an attribute only when a value is present
    pub fn with_opt(self, attribute: impl Into<String>, value: Option<impl Into<Value>>) -> Self {
        match value {
            Some(v) => self.with(attribute, v),
            None => self,
        }
    }

    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.attributes.get(attribute)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

/// Authentication status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStatus {
    /// Whether authentication is valid
    pub authenticated: bool,

    /// Account/user information if available
    pub account_info: Option<String>,

    /// Error message if not authenticated
    pub error: Option<String>,
}

impl AuthStatus {
    pub fn ok(account_info: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            account_info: Some(account_info.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            authenticated: false,
            account_info: None,
            error: Some(error.into()),
        }
    }
}
