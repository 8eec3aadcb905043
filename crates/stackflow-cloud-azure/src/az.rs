//! az CLI wrapper
//!
//! Wraps the Azure CLI commands used by the provisioners.

use crate::error::{AzureError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use stackflow_cloud::AuthStatus;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Default per-command timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20 * 60);

/// az CLI wrapper
#[derive(Debug, Clone)]
pub struct AzCli {
    program: String,
    subscription: Option<String>,
    timeout: Duration,
}

impl AzCli {
    pub fn new() -> Self {
        Self {
            program: "az".to_string(),
            subscription: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_subscription(mut self, subscription: impl Into<String>) -> Self {
        self.subscription = Some(subscription.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use another executable (tests, wrappers)
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn subscription(&self) -> Option<&str> {
        self.subscription.as_deref()
    }

    /// Check if az is installed and logged in
    pub async fn check_auth(&self) -> Result<AuthStatus> {
        let account = match self
            .run_json(&args(&["account", "show"]), &CancellationToken::new())
            .await
        {
            Ok(account) => account,
            Err(AzureError::CommandFailed { stderr, .. }) => {
                return Ok(AuthStatus::failed(format!(
                    "Not logged in. Please run 'az login': {}",
                    stderr.trim()
                )));
            }
            Err(e) => return Err(e),
        };

        let account: AzAccount = serde_json::from_value(account)?;
        Ok(AuthStatus::ok(account.to_string()))
    }

    /// Run an az command and return stdout
    pub async fn run(&self, args: &[String], cancellation: &CancellationToken) -> Result<String> {
        let mut cmd = Command::new(&self.program);
        cmd.args(args);
        cmd.arg("--output").arg("json");
        if let Some(subscription) = &self.subscription {
            cmd.arg("--subscription").arg(subscription);
        }
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        let shown = command_line(args);
        tracing::debug!(program = %self.program, command = %shown, "Running az");

        let output = tokio::select! {
            biased;
            _ = cancellation.cancelled() => {
                return Err(AzureError::Cancelled(shown));
            }
            result = tokio::time::timeout(self.timeout, cmd.output()) => match result {
                Err(_) => return Err(AzureError::Timeout(shown)),
                Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Err(AzureError::AzNotFound);
                }
                Ok(output) => output?,
            },
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AzureError::CommandFailed {
                command: shown,
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Run an az command and parse its JSON output (empty output is `null`)
    pub async fn run_json(&self, args: &[String], cancellation: &CancellationToken) -> Result<Value> {
        let output = self.run(args, cancellation).await?;
        if output.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&output)?)
    }
}

impl Default for AzCli {
    fn default() -> Self {
        Self::new()
    }
}

/// Build an owned argument list
pub fn args(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Human readable command line, with secret values masked
fn command_line(args: &[String]) -> String {
    let mut out = Vec::with_capacity(args.len());
    let mut flag = "";
    for arg in args {
        if arg.starts_with("--") {
            flag = arg.as_str();
            out.push(arg.clone());
            continue;
        }
        match flag {
            "--settings" => {
                let key = arg.split_once('=').map(|(k, _)| k).unwrap_or(arg);
                out.push(format!("{}=***", key));
            }
            "--login" => out.push("***".to_string()),
            _ => out.push(arg.clone()),
        }
    }
    out.join(" ")
}

/// `az account show` output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzAccount {
    pub id: String,
    pub name: String,
    #[serde(rename = "tenantId", default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub user: Option<AzUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzUser {
    pub name: String,
    #[serde(rename = "type")]
    pub user_type: String,
}

impl std::fmt::Display for AzAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.user {
            Some(user) => write!(f, "{} ({}) as {}", self.name, self.id, user.name),
            None => write!(f, "{} ({})", self.name, self.id),
        }
    }
}
