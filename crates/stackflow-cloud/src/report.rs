//! Run summary

use crate::record::{ExecutionRecord, ExecutionStatus, SkipReason};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use stackflow_core::OutputBinding;

/// Outcome of a whole run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// True iff no resource failed
    pub success: bool,

    /// At least one resource was skipped because the run was cancelled
    pub cancelled: bool,

    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub pending: usize,

    /// From the first start to the last finish
    pub duration_ms: u64,

    /// Per-resource records in execution order
    pub records: Vec<ExecutionRecord>,
}

/// Summarize a set of execution records
pub fn report(records: &[ExecutionRecord]) -> Summary {
    let count = |status: ExecutionStatus| records.iter().filter(|r| r.status == status).count();

    let failed = count(ExecutionStatus::Failed);
    let cancelled = records
        .iter()
        .any(|r| r.skip_reason == Some(SkipReason::Cancelled));

    let first_start = records.iter().filter_map(|r| r.started_at).min();
    let last_finish = records.iter().filter_map(|r| r.finished_at).max();
    let duration_ms = match (first_start, last_finish) {
        (Some(start), Some(end)) => (end - start).num_milliseconds().max(0) as u64,
        _ => 0,
    };

    Summary {
        success: failed == 0,
        cancelled,
        succeeded: count(ExecutionStatus::Succeeded),
        failed,
        skipped: count(ExecutionStatus::Skipped),
        // Running is only observable mid-run and counts as not finished
        pending: count(ExecutionStatus::Pending) + count(ExecutionStatus::Running),
        duration_ms,
        records: records.to_vec(),
    }
}

/// An environment variable to hand to the user after a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvExport {
    pub name: String,
    /// None when the source resource did not produce the attribute
    pub value: Option<String>,
}

impl Summary {
    pub fn record(&self, resource: &str) -> Option<&ExecutionRecord> {
        self.records.iter().find(|r| r.resource == resource)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ExecutionRecord> {
        self.records
            .iter()
            .filter(|r| r.status == ExecutionStatus::Failed)
    }

    /// Resolve output bindings against the attributes of succeeded records
    pub fn exports(&self, outputs: &[OutputBinding]) -> Vec<EnvExport> {
        outputs
            .iter()
            .map(|binding| {
                let value = self
                    .record(&binding.source.resource)
                    .and_then(|r| r.attributes.get(&binding.source.attribute))
                    .map(|v| match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    });
                EnvExport {
                    name: binding.name.clone(),
                    value,
                }
            })
            .collect()
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} succeeded, {} failed, {} skipped",
            self.succeeded, self.failed, self.skipped
        )?;
        if self.pending > 0 {
            write!(f, ", {} pending", self.pending)?;
        }
        if self.cancelled {
            write!(f, " (cancelled)")?;
        }
        Ok(())
    }
}
