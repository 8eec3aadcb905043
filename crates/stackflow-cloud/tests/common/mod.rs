//! Fake provisioners shared by the engine tests

use async_trait::async_trait;
use serde_json::{Value, json};
use stackflow_cloud::{
    CloudError, ProvisionRequest, ProvisionResult, Provisioner, ProvisionerRegistry,
    ResolvedConfig, Result,
};
use stackflow_core::ResourceKind;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Records every call and answers from a per-resource script
pub struct FakeProvisioner {
    kind: ResourceKind,
    outputs: HashMap<String, ProvisionResult>,
    failing: HashSet<String>,
    cancel_after: HashSet<String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
    configs: Mutex<HashMap<String, ResolvedConfig>>,
    created: Mutex<HashSet<String>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl FakeProvisioner {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            outputs: HashMap::new(),
            failing: HashSet::new(),
            cancel_after: HashSet::new(),
            delay: None,
            calls: Mutex::new(Vec::new()),
            configs: Mutex::new(HashMap::new()),
            created: Mutex::new(HashSet::new()),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
        }
    }

    /// Attributes returned for one resource
    pub fn output(mut self, resource: &str, result: ProvisionResult) -> Self {
        self.outputs.insert(resource.to_string(), result);
        self
    }

    pub fn fail_on(mut self, resource: &str) -> Self {
        self.failing.insert(resource.to_string());
        self
    }

    /// Cancel the run from inside this resource's call, then succeed
    pub fn cancel_after(mut self, resource: &str) -> Self {
        self.cancel_after.insert(resource.to_string());
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn config_of(&self, resource: &str) -> Option<ResolvedConfig> {
        self.configs.lock().unwrap().get(resource).cloned()
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Provisioner for FakeProvisioner {
    fn kind(&self) -> ResourceKind {
        self.kind
    }

    async fn create_or_update(&self, request: &ProvisionRequest) -> Result<Value> {
        self.calls.lock().unwrap().push(request.resource.clone());
        self.configs
            .lock()
            .unwrap()
            .insert(request.resource.clone(), request.config.clone());

        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(&request.resource) {
            return Err(CloudError::provisioner(self.kind, "quota exceeded"));
        }
        if self.cancel_after.contains(&request.resource) {
            request.cancellation.cancel();
        }

        // Idempotent: a second create for the same name reports the existing resource
        let existed = !self.created.lock().unwrap().insert(request.name.clone());
        Ok(json!({ "name": request.name, "existed": existed }))
    }

    async fn extract_outputs(
        &self,
        request: &ProvisionRequest,
        _created: Value,
    ) -> Result<ProvisionResult> {
        Ok(self
            .outputs
            .get(&request.resource)
            .cloned()
            .unwrap_or_default())
    }
}

/// Registry over a set of fakes, keeping handles for assertions
pub fn registry(fakes: &[Arc<FakeProvisioner>]) -> ProvisionerRegistry {
    let mut registry = ProvisionerRegistry::new();
    for fake in fakes {
        registry.register(fake.clone());
    }
    registry
}
