//! Provisioner registry
//!
//! Maps each resource kind to the provisioner that handles it.

use crate::error::{CloudError, Result};
use crate::provisioner::{ProvisionRequest, ProvisionResult, Provisioner};
use stackflow_core::ResourceKind;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone, Default)]
pub struct ProvisionerRegistry {
    provisioners: HashMap<ResourceKind, Arc<dyn Provisioner>>,
}

impl ProvisionerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provisioner under its own kind, replacing any previous one
    pub fn register(&mut self, provisioner: Arc<dyn Provisioner>) -> &mut Self {
        let kind = provisioner.kind();
        if self.provisioners.insert(kind, provisioner).is_some() {
            debug!("Replaced provisioner for {}", kind);
        }
        self
    }

    pub fn with(mut self, provisioner: Arc<dyn Provisioner>) -> Self {
        self.register(provisioner);
        self
    }

    pub fn get(&self, kind: ResourceKind) -> Result<Arc<dyn Provisioner>> {
        self.provisioners
            .get(&kind)
            .cloned()
            .ok_or(CloudError::ProvisionerNotFound(kind))
    }

    pub fn contains(&self, kind: ResourceKind) -> bool {
        self.provisioners.contains_key(&kind)
    }

    /// Registered kinds, sorted
    pub fn kinds(&self) -> Vec<ResourceKind> {
        let mut kinds: Vec<_> = self.provisioners.keys().copied().collect();
        kinds.sort();
        kinds
    }

    /// Validate, create-or-update, then extract outputs
    pub async fn provision(&self, request: &ProvisionRequest) -> Result<ProvisionResult> {
        let provisioner = self.get(request.kind)?;

        debug!(resource = %request.resource, kind = %request.kind, "Validating");
        provisioner.validate(request)?;

        debug!(resource = %request.resource, name = %request.name, "Creating or updating");
        let created = provisioner.create_or_update(request).await?;

        let outputs = provisioner.extract_outputs(request, created).await?;
        debug!(
            resource = %request.resource,
            attributes = outputs.len(),
            "Extracted outputs"
        );
        Ok(outputs)
    }
}

impl std::fmt::Debug for ProvisionerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvisionerRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}
