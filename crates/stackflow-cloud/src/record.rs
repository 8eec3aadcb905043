//! Per-resource execution records

use crate::error::CloudError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use stackflow_core::ResourceKind;
use std::collections::BTreeMap;

/// Execution status of a single resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// Not started yet
    Pending,
    /// Provisioner call in flight
    Running,
    Succeeded,
    Failed,
    /// Never started (failed dependency or cancellation)
    Skipped,
}

impl ExecutionStatus {
    /// Whether the status can no longer change
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExecutionStatus::Succeeded | ExecutionStatus::Failed | ExecutionStatus::Skipped
        )
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionStatus::Pending => write!(f, "pending"),
            ExecutionStatus::Running => write!(f, "running"),
            ExecutionStatus::Succeeded => write!(f, "succeeded"),
            ExecutionStatus::Failed => write!(f, "failed"),
            ExecutionStatus::Skipped => write!(f, "skipped"),
        }
    }
}

/// Category of a per-resource failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    UnresolvedReference,
    DuplicateAttribute,
    ProvisionerNotFound,
    Provisioner,
    InvalidConfig,
    Timeout,
    Cancelled,
}

impl From<&CloudError> for FailureKind {
    fn from(error: &CloudError) -> Self {
        match error {
            CloudError::UnresolvedReference(_) => FailureKind::UnresolvedReference,
            CloudError::DuplicateAttribute(_) => FailureKind::DuplicateAttribute,
            CloudError::ProvisionerNotFound(_) => FailureKind::ProvisionerNotFound,
            CloudError::InvalidConfig(_) => FailureKind::InvalidConfig,
            CloudError::Timeout(_) => FailureKind::Timeout,
            CloudError::Cancelled(_) => FailureKind::Cancelled,
            CloudError::Provisioner { .. }
            | CloudError::AuthenticationFailed(_)
            | CloudError::Stack(_)
            | CloudError::Io(_)
            | CloudError::Json(_) => FailureKind::Provisioner,
        }
    }
}

/// Why a resource failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl From<&CloudError> for Failure {
    fn from(error: &CloudError) -> Self {
        Self {
            kind: error.into(),
            message: error.to_string(),
        }
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Why a resource was never started
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// A dependency failed or was itself skipped
    DependencyFailed { dependency: String },
    /// The run was cancelled before this resource started
    Cancelled,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::DependencyFailed { dependency } => {
                write!(f, "dependency '{}' did not succeed", dependency)
            }
            SkipReason::Cancelled => write!(f, "run cancelled"),
        }
    }
}

/// Outcome of one resource within a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub resource: String,
    pub kind: ResourceKind,
    pub status: ExecutionStatus,

    /// Attributes written to the value store
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<Failure>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<SkipReason>,

    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl ExecutionRecord {
    pub fn pending(resource: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            resource: resource.into(),
            kind,
            status: ExecutionStatus::Pending,
            attributes: BTreeMap::new(),
            failure: None,
            skip_reason: None,
            started_at: None,
            finished_at: None,
        }
    }

    pub(crate) fn start(&mut self) {
        self.status = ExecutionStatus::Running;
        self.started_at = Some(Utc::now());
    }

    pub(crate) fn succeed(&mut self, attributes: BTreeMap<String, Value>) {
        self.status = ExecutionStatus::Succeeded;
        self.attributes = attributes;
        self.finished_at = Some(Utc::now());
    }

    /// Pending → Failed (resolution error) or Running → Failed
    pub(crate) fn fail(&mut self, error: &CloudError) {
        let now = Utc::now();
        self.status = ExecutionStatus::Failed;
        self.failure = Some(Failure::from(error));
        self.started_at.get_or_insert(now);
        self.finished_at = Some(now);
    }

    pub(crate) fn skip(&mut self, reason: SkipReason) {
        self.status = ExecutionStatus::Skipped;
        self.skip_reason = Some(reason);
    }

    /// Wall time of the provisioner call, if it ran
    pub fn duration_ms(&self) -> Option<u64> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some((end - start).num_milliseconds().max(0) as u64),
            _ => None,
        }
    }
}

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    NotStarted,
    Running,
    Completed,
}
