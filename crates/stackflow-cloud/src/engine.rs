//! Execution engine
//!
//! Provisions resources in dependency order:
//! - Resources whose dependency failed or was skipped are skipped
//! - References are resolved against the value store right before a call
//! - Independent resources run concurrently up to `max_parallel`
//! - Results are applied to the store by the single engine loop

use crate::error::{CloudError, Result};
use crate::provisioner::{ProvisionRequest, ProvisionResult};
use crate::record::{ExecutionRecord, ExecutionStatus, RunState, SkipReason};
use crate::registry::ProvisionerRegistry;
use crate::report::{Summary, report};
use crate::store::{ValueStore, resolve_config};
use futures_util::stream::{FuturesUnordered, StreamExt};
use serde_json::Value;
use stackflow_core::{DependencyGraph, ResourceDescriptor};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Receives record transitions while a run executes
pub trait RunObserver: Send + Sync {
    /// A provisioner call is about to start
    fn on_started(&self, _record: &ExecutionRecord) {}

    /// A record reached Succeeded, Failed or Skipped
    fn on_finished(&self, _record: &ExecutionRecord) {}
}

/// Builds runs from resource descriptors
#[derive(Clone)]
pub struct Orchestrator {
    registry: Arc<ProvisionerRegistry>,
    max_parallel: usize,
    cancellation: CancellationToken,
    observer: Option<Arc<dyn RunObserver>>,
}

impl Orchestrator {
    pub fn new(registry: ProvisionerRegistry) -> Self {
        Self::with_registry(Arc::new(registry))
    }

    pub fn with_registry(registry: Arc<ProvisionerRegistry>) -> Self {
        Self {
            registry,
            max_parallel: 1,
            cancellation: CancellationToken::new(),
            observer: None,
        }
    }

    /// Maximum number of concurrent provisioner calls (1 = sequential)
    pub fn with_max_parallel(mut self, max: usize) -> Self {
        self.max_parallel = max.max(1);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn max_parallel(&self) -> usize {
        self.max_parallel
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Validate the descriptors and build a run
    ///
    /// Duplicate names, unknown dependencies and cycles are rejected here,
    /// before any provisioner is called.
    pub fn prepare(&self, descriptors: &[ResourceDescriptor]) -> Result<Run> {
        let graph = DependencyGraph::build(descriptors)?;
        let records = descriptors
            .iter()
            .map(|d| ExecutionRecord::pending(&d.name, d.kind))
            .collect();

        info!(
            resources = descriptors.len(),
            order = ?graph.execution_order(),
            "Run prepared"
        );

        Ok(Run {
            orchestrator: self.clone(),
            descriptors: descriptors.to_vec(),
            graph,
            records,
            finished: Vec::new(),
            store: ValueStore::new(),
            state: RunState::NotStarted,
            summary: None,
        })
    }

    /// Prepare and execute in one step
    pub async fn run(&self, descriptors: &[ResourceDescriptor]) -> Result<Summary> {
        let mut run = self.prepare(descriptors)?;
        Ok(run.execute().await)
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("registry", &self.registry)
            .field("max_parallel", &self.max_parallel)
            .finish()
    }
}

/// One execution of a validated set of descriptors
pub struct Run {
    orchestrator: Orchestrator,
    descriptors: Vec<ResourceDescriptor>,
    graph: DependencyGraph,
    /// Indexed like `descriptors`
    records: Vec<ExecutionRecord>,
    /// Indices in the order records became terminal
    finished: Vec<usize>,
    store: ValueStore,
    state: RunState,
    summary: Option<Summary>,
}

type Outcome = (usize, Result<ProvisionResult>);

impl Run {
    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn store(&self) -> &ValueStore {
        &self.store
    }

    /// Records in descriptor order
    pub fn records(&self) -> &[ExecutionRecord] {
        &self.records
    }

    pub fn record(&self, resource: &str) -> Option<&ExecutionRecord> {
        self.graph.index_of(resource).map(|i| &self.records[i])
    }

    /// Execute every resource and summarize the outcome
    ///
    /// A completed run is not executed again; the first summary is returned.
    pub async fn execute(&mut self) -> Summary {
        if let Some(summary) = &self.summary {
            warn!("Run already completed, returning previous summary");
            return summary.clone();
        }

        self.state = RunState::Running;
        let max_parallel = self.orchestrator.max_parallel;
        let mut in_flight = FuturesUnordered::new();

        loop {
            if self.orchestrator.cancellation.is_cancelled() {
                self.skip_pending(SkipReason::Cancelled);
            } else {
                for index in self.next_ready(max_parallel - in_flight.len()) {
                    let Some(request) = self.begin(index) else {
                        continue;
                    };
                    let registry = Arc::clone(&self.orchestrator.registry);
                    in_flight.push(async move {
                        let result = registry.provision(&request).await;
                        (index, result)
                    });
                }
            }

            match in_flight.next().await {
                Some(outcome) => self.apply(outcome),
                None if self.has_pending() => continue,
                None => break,
            }
        }

        self.state = RunState::Completed;
        let records: Vec<ExecutionRecord> =
            self.finished.iter().map(|&i| self.records[i].clone()).collect();
        let summary = report(&records);
        info!("Run completed: {}", summary);
        self.summary = Some(summary.clone());
        summary
    }

    fn has_pending(&self) -> bool {
        self.records
            .iter()
            .any(|r| r.status == ExecutionStatus::Pending)
    }

    /// Pick up to `limit` pending resources whose dependencies all succeeded,
    /// skipping those with a failed or skipped dependency along the way
    fn next_ready(&mut self, limit: usize) -> Vec<usize> {
        let mut ready = Vec::new();
        let order = self.graph.order().to_vec();

        for index in order {
            if self.records[index].status != ExecutionStatus::Pending {
                continue;
            }

            let deps = self.graph.dependencies_of(index);
            let blocked = deps.iter().copied().find(|&d| {
                matches!(
                    self.records[d].status,
                    ExecutionStatus::Failed | ExecutionStatus::Skipped
                )
            });

            if let Some(dep) = blocked {
                let dependency = self.graph.name(dep).to_string();
                self.finish_skip(index, SkipReason::DependencyFailed { dependency });
                continue;
            }

            let satisfied = deps
                .iter()
                .all(|&d| self.records[d].status == ExecutionStatus::Succeeded);
            if satisfied && ready.len() < limit {
                ready.push(index);
            }
        }

        ready
    }

    /// Resolve configuration and mark Running. Resolution failures leave
    /// the resource Failed without calling a provisioner.
    fn begin(&mut self, index: usize) -> Option<ProvisionRequest> {
        let descriptor = &self.descriptors[index];
        let config = match resolve_config(descriptor, &self.store) {
            Ok(config) => config,
            Err(e) => {
                warn!(resource = %descriptor.name, "Failed to resolve configuration: {}", e);
                self.finish_fail(index, &e);
                return None;
            }
        };

        let request = ProvisionRequest::new(
            &descriptor.name,
            descriptor.remote_name(),
            descriptor.kind,
            config,
        )
        .with_cancellation(self.orchestrator.cancellation.clone());

        info!(resource = %descriptor.name, kind = %descriptor.kind, "Provisioning");
        self.records[index].start();
        if let Some(observer) = &self.orchestrator.observer {
            observer.on_started(&self.records[index]);
        }
        Some(request)
    }

    fn apply(&mut self, (index, result): Outcome) {
        let resource = self.descriptors[index].name.clone();
        let outputs = match result {
            Ok(outputs) => outputs,
            Err(e) => {
                warn!(resource = %resource, "Provisioning failed: {}", e);
                self.finish_fail(index, &e);
                return;
            }
        };

        let mut stored = BTreeMap::new();
        for (attribute, value) in outputs.attributes {
            if is_empty_value(&value) {
                warn!(
                    resource = %resource,
                    attribute = %attribute,
                    "Provisioner returned an empty value; not storing it"
                );
                continue;
            }
            if let Err(e) = self.store.put(&resource, &attribute, value.clone()) {
                self.finish_fail(index, &e);
                return;
            }
            stored.insert(attribute, value);
        }

        info!(resource = %resource, attributes = stored.len(), "Succeeded");
        self.records[index].succeed(stored);
        self.finish(index);
    }

    fn skip_pending(&mut self, reason: SkipReason) {
        let order = self.graph.order().to_vec();
        for index in order {
            if self.records[index].status == ExecutionStatus::Pending {
                self.finish_skip(index, reason.clone());
            }
        }
    }

    fn finish_skip(&mut self, index: usize, reason: SkipReason) {
        info!(resource = %self.records[index].resource, "Skipped: {}", reason);
        self.records[index].skip(reason);
        self.finish(index);
    }

    fn finish_fail(&mut self, index: usize, error: &CloudError) {
        self.records[index].fail(error);
        self.finish(index);
    }

    fn finish(&mut self, index: usize) {
        self.finished.push(index);
        if let Some(observer) = &self.orchestrator.observer {
            observer.on_finished(&self.records[index]);
        }
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_empty_value() {
        assert!(is_empty_value(&Value::Null));
        assert!(is_empty_value(&json!("")));
        assert!(!is_empty_value(&json!("CS1")));
        assert!(!is_empty_value(&json!(0)));
        assert!(!is_empty_value(&json!(false)));
    }

    #[test]
    fn test_max_parallel_floor() {
        let orchestrator = Orchestrator::new(ProvisionerRegistry::new()).with_max_parallel(0);
        assert_eq!(orchestrator.max_parallel(), 1);
    }

    #[test]
    fn test_prepare_rejects_cycle() {
        use stackflow_core::{ResourceKind, StackError};

        let descriptors = vec![
            ResourceDescriptor::new("a", ResourceKind::Storage).depends_on("b"),
            ResourceDescriptor::new("b", ResourceKind::Storage).depends_on("a"),
        ];
        let err = Orchestrator::new(ProvisionerRegistry::new())
            .prepare(&descriptors)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            CloudError::Stack(StackError::CyclicDependency(_))
        ));
    }
}
