//! Per-kind resource configuration and az argument builders
//!
//! Each resource kind reads its settings from the resolved configuration
//! and knows the az command lines that create it. Everything here is pure,
//! so the command lines can be checked without calling Azure.

use crate::az::args;
use crate::connection::{is_valid_storage_name, sanitize_storage_name};
use serde_json::json;
use stackflow_cloud::{CloudError, ProvisionRequest, ResolvedConfig, Result};
use stackflow_core::ResourceKind;

pub const DEFAULT_HUB_SKU: &str = "S1";
pub const DEFAULT_HUB_POLICY: &str = "iothubowner";
pub const DEFAULT_EVENT_STREAM_SKU: &str = "Basic";
pub const DEFAULT_EVENT_STREAM_RULE: &str = "RootManageSharedAccessKey";
pub const DEFAULT_STORAGE_SKU: &str = "Standard_LRS";
pub const DEFAULT_STORAGE_KIND: &str = "StorageV2";
pub const DEFAULT_PLAN_SKU: &str = "B1";
pub const DEFAULT_WORKSPACE_SKU: &str = "PerGB2018";
pub const DEFAULT_DIAGNOSTIC_CATEGORY: &str = "E2EDiagnostics";
pub const DEFAULT_BRANCH: &str = "master";
pub const DEFAULT_FUNCTIONS_VERSION: &str = "4";

/// Typed configuration of one Azure resource
#[derive(Debug, Clone, PartialEq)]
pub enum AzureResource {
    Group(GroupConfig),
    Hub(HubConfig),
    EventStream(EventStreamConfig),
    Monitoring(MonitoringConfig),
    Storage(StorageConfig),
    ServicePlan(PlanConfig),
    FunctionApp(SiteConfig),
    WebApp(SiteConfig),
    Workspace(WorkspaceConfig),
    Diagnostic(DiagnosticConfig),
}

impl AzureResource {
    pub fn parse(request: &ProvisionRequest) -> Result<Self> {
        let name = request.name.as_str();
        let config = &request.config;
        Ok(match request.kind {
            ResourceKind::ResourceGroup => AzureResource::Group(GroupConfig {
                name: name.to_string(),
                location: required(config, "location")?,
            }),
            ResourceKind::Hub => AzureResource::Hub(HubConfig::parse(name, config)?),
            ResourceKind::EventStream => {
                AzureResource::EventStream(EventStreamConfig::parse(name, config)?)
            }
            ResourceKind::Monitoring => {
                AzureResource::Monitoring(MonitoringConfig::parse(name, config)?)
            }
            ResourceKind::Storage => AzureResource::Storage(StorageConfig::parse(name, config)?),
            ResourceKind::ServicePlan => AzureResource::ServicePlan(PlanConfig {
                name: name.to_string(),
                resource_group: required(config, "resource-group")?,
                location: optional(config, "location"),
                sku: optional(config, "sku").unwrap_or_else(|| DEFAULT_PLAN_SKU.to_string()),
            }),
            ResourceKind::FunctionApp => {
                AzureResource::FunctionApp(SiteConfig::parse(SiteKind::Function, name, config)?)
            }
            ResourceKind::WebApp => {
                AzureResource::WebApp(SiteConfig::parse(SiteKind::Web, name, config)?)
            }
            ResourceKind::AnalyticsWorkspace => AzureResource::Workspace(WorkspaceConfig {
                name: name.to_string(),
                resource_group: required(config, "resource-group")?,
                location: optional(config, "location"),
                sku: optional(config, "sku").unwrap_or_else(|| DEFAULT_WORKSPACE_SKU.to_string()),
            }),
            ResourceKind::DiagnosticSetting => {
                AzureResource::Diagnostic(DiagnosticConfig::parse(name, config)?)
            }
        })
    }
}

fn required(config: &ResolvedConfig, key: &str) -> Result<String> {
    config.require_str(key).map(str::to_string)
}

fn optional(config: &ResolvedConfig, key: &str) -> Option<String> {
    config
        .get_str(key)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn push_location(args: &mut Vec<String>, location: &Option<String>) {
    if let Some(location) = location {
        args.push("--location".to_string());
        args.push(location.clone());
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupConfig {
    pub name: String,
    pub location: String,
}

impl GroupConfig {
    pub fn create_args(&self) -> Vec<String> {
        args(&["group", "create", "--name", &self.name, "--location", &self.location])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HubConfig {
    pub name: String,
    /// Optional only for an existing hub, where it is looked up
    pub resource_group: Option<String>,
    pub location: Option<String>,
    pub sku: String,
    pub existing: bool,
    pub policy: String,
    pub device: Option<String>,
    pub sampling_rate: Option<u8>,
}

impl HubConfig {
    fn parse(name: &str, config: &ResolvedConfig) -> Result<Self> {
        let existing = config.get_bool("existing").unwrap_or(false);
        let resource_group = if existing {
            optional(config, "resource-group")
        } else {
            Some(required(config, "resource-group")?)
        };

        let sampling_rate = match config.get("sampling-rate") {
            None => None,
            Some(_) => match config.get_as::<u8>("sampling-rate") {
                Some(rate) if rate <= 100 => Some(rate),
                _ => {
                    return Err(CloudError::InvalidConfig(
                        "sampling-rate must be an integer between 0 and 100".to_string(),
                    ));
                }
            },
        };

        let device = optional(config, "device");
        if sampling_rate.is_some() && device.is_none() {
            return Err(CloudError::InvalidConfig(
                "sampling-rate requires a device".to_string(),
            ));
        }

        Ok(Self {
            name: name.to_string(),
            resource_group,
            location: optional(config, "location"),
            sku: optional(config, "sku").unwrap_or_else(|| DEFAULT_HUB_SKU.to_string()),
            existing,
            policy: optional(config, "policy").unwrap_or_else(|| DEFAULT_HUB_POLICY.to_string()),
            device,
            sampling_rate,
        })
    }

    pub fn show_args(&self) -> Vec<String> {
        let mut args = args(&["iot", "hub", "show", "--name", &self.name]);
        if let Some(group) = &self.resource_group {
            args.extend(["--resource-group".to_string(), group.clone()]);
        }
        args
    }

    pub fn create_args(&self, resource_group: &str) -> Vec<String> {
        let mut args = args(&[
            "iot",
            "hub",
            "create",
            "--name",
            &self.name,
            "--resource-group",
            resource_group,
            "--sku",
            &self.sku,
            "--unit",
            "1",
        ]);
        push_location(&mut args, &self.location);
        args
    }

    pub fn policy_args(&self, resource_group: &str) -> Vec<String> {
        args(&[
            "iot",
            "hub",
            "policy",
            "show",
            "--hub-name",
            &self.name,
            "--name",
            &self.policy,
            "--resource-group",
            resource_group,
        ])
    }

    pub fn device_args(action: &str, device: &str, login: &str) -> Vec<String> {
        args(&[
            "iot",
            "hub",
            "device-identity",
            action,
            "--device-id",
            device,
            "--login",
            login,
        ])
    }

    pub fn sampling_args(device: &str, rate: u8, login: &str) -> Vec<String> {
        let desired = json!({ "__e2e_diag_sample_rate": rate }).to_string();
        args(&[
            "iot",
            "hub",
            "device-twin",
            "update",
            "--device-id",
            device,
            "--desired",
            &desired,
            "--login",
            login,
        ])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventStreamConfig {
    pub name: String,
    pub resource_group: String,
    pub location: Option<String>,
    pub sku: String,
    pub rule: String,
    /// Event hub created inside the namespace
    pub event_hub: Option<String>,
    pub retention_days: u32,
}

impl EventStreamConfig {
    fn parse(name: &str, config: &ResolvedConfig) -> Result<Self> {
        let retention_days = match config.get("retention-days") {
            None => 1,
            Some(_) => config
                .get_as::<u32>("retention-days")
                .filter(|d| *d > 0)
                .ok_or_else(|| {
                    CloudError::InvalidConfig("retention-days must be a positive integer".into())
                })?,
        };

        Ok(Self {
            name: name.to_string(),
            resource_group: required(config, "resource-group")?,
            location: optional(config, "location"),
            sku: optional(config, "sku").unwrap_or_else(|| DEFAULT_EVENT_STREAM_SKU.to_string()),
            rule: optional(config, "rule").unwrap_or_else(|| DEFAULT_EVENT_STREAM_RULE.to_string()),
            event_hub: optional(config, "event-hub"),
            retention_days,
        })
    }

    pub fn create_args(&self) -> Vec<String> {
        let mut args = args(&[
            "eventhubs",
            "namespace",
            "create",
            "--name",
            &self.name,
            "--resource-group",
            &self.resource_group,
            "--sku",
            &self.sku,
        ]);
        push_location(&mut args, &self.location);
        args
    }

    pub fn event_hub_args(&self, event_hub: &str) -> Vec<String> {
        let retention = self.retention_days.to_string();
        args(&[
            "eventhubs",
            "eventhub",
            "create",
            "--name",
            event_hub,
            "--namespace-name",
            &self.name,
            "--resource-group",
            &self.resource_group,
            "--message-retention",
            &retention,
        ])
    }

    pub fn rule_args(&self) -> Vec<String> {
        args(&[
            "eventhubs",
            "namespace",
            "authorization-rule",
            "show",
            "--name",
            &self.rule,
            "--namespace-name",
            &self.name,
            "--resource-group",
            &self.resource_group,
        ])
    }

    pub fn keys_args(&self) -> Vec<String> {
        args(&[
            "eventhubs",
            "namespace",
            "authorization-rule",
            "keys",
            "list",
            "--name",
            &self.rule,
            "--namespace-name",
            &self.name,
            "--resource-group",
            &self.resource_group,
        ])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonitoringConfig {
    pub name: String,
    pub resource_group: String,
    pub location: String,
    pub kind: String,
    pub application_type: String,
    pub api_key: Option<String>,
}

impl MonitoringConfig {
    fn parse(name: &str, config: &ResolvedConfig) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            resource_group: required(config, "resource-group")?,
            location: required(config, "location")?,
            kind: optional(config, "kind").unwrap_or_else(|| "web".to_string()),
            application_type: optional(config, "application-type")
                .unwrap_or_else(|| "other".to_string()),
            api_key: optional(config, "api-key"),
        })
    }

    pub fn create_args(&self) -> Vec<String> {
        args(&[
            "monitor",
            "app-insights",
            "component",
            "create",
            "--app",
            &self.name,
            "--resource-group",
            &self.resource_group,
            "--location",
            &self.location,
            "--kind",
            &self.kind,
            "--application-type",
            &self.application_type,
        ])
    }

    pub fn api_key_args(&self, action: &str, key: &str) -> Vec<String> {
        let mut args = args(&[
            "monitor",
            "app-insights",
            "api-key",
            action,
            "--app",
            &self.name,
            "--resource-group",
            &self.resource_group,
            "--api-key",
            key,
        ]);
        if action == "create" {
            args.extend(["--read-properties".to_string(), "ReadTelemetry".to_string()]);
        }
        args
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StorageConfig {
    /// Sanitized account name
    pub name: String,
    pub resource_group: String,
    pub location: Option<String>,
    pub sku: String,
    pub kind: String,
}

impl StorageConfig {
    fn parse(name: &str, config: &ResolvedConfig) -> Result<Self> {
        let account = sanitize_storage_name(name);
        if !is_valid_storage_name(&account) {
            return Err(CloudError::InvalidConfig(format!(
                "storage account name '{}' has fewer than 3 usable characters",
                name
            )));
        }

        Ok(Self {
            name: account,
            resource_group: required(config, "resource-group")?,
            location: optional(config, "location"),
            sku: optional(config, "sku").unwrap_or_else(|| DEFAULT_STORAGE_SKU.to_string()),
            kind: optional(config, "kind").unwrap_or_else(|| DEFAULT_STORAGE_KIND.to_string()),
        })
    }

    pub fn create_args(&self) -> Vec<String> {
        let mut args = args(&[
            "storage",
            "account",
            "create",
            "--name",
            &self.name,
            "--resource-group",
            &self.resource_group,
            "--sku",
            &self.sku,
            "--kind",
            &self.kind,
        ]);
        push_location(&mut args, &self.location);
        args
    }

    pub fn keys_args(&self) -> Vec<String> {
        args(&[
            "storage",
            "account",
            "keys",
            "list",
            "--account-name",
            &self.name,
            "--resource-group",
            &self.resource_group,
        ])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanConfig {
    pub name: String,
    pub resource_group: String,
    pub location: Option<String>,
    pub sku: String,
}

impl PlanConfig {
    pub fn create_args(&self) -> Vec<String> {
        let mut args = args(&[
            "appservice",
            "plan",
            "create",
            "--name",
            &self.name,
            "--resource-group",
            &self.resource_group,
            "--sku",
            &self.sku,
        ]);
        push_location(&mut args, &self.location);
        args
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteKind {
    Function,
    Web,
}

impl SiteKind {
    fn command(&self) -> &'static str {
        match self {
            SiteKind::Function => "functionapp",
            SiteKind::Web => "webapp",
        }
    }
}

/// Function app or web app
#[derive(Debug, Clone, PartialEq)]
pub struct SiteConfig {
    pub site: SiteKind,
    pub name: String,
    pub resource_group: String,
    pub plan: String,
    /// Function apps only
    pub storage_account: Option<String>,
    pub functions_version: String,
    pub runtime: Option<String>,
    pub settings: Vec<(String, String)>,
    pub repo: Option<String>,
    pub branch: String,
    pub restart: bool,
}

impl SiteConfig {
    fn parse(site: SiteKind, name: &str, config: &ResolvedConfig) -> Result<Self> {
        let storage_account = match site {
            SiteKind::Function => Some(required(config, "storage-account")?),
            SiteKind::Web => None,
        };

        Ok(Self {
            site,
            name: name.to_string(),
            resource_group: required(config, "resource-group")?,
            plan: required(config, "plan")?,
            storage_account,
            functions_version: optional(config, "functions-version")
                .or_else(|| config.get_as::<u32>("functions-version").map(|v| v.to_string()))
                .unwrap_or_else(|| DEFAULT_FUNCTIONS_VERSION.to_string()),
            runtime: optional(config, "runtime"),
            settings: config.string_map("app-settings")?,
            repo: optional(config, "repo"),
            branch: optional(config, "branch").unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
            // The function host does not pick up event hub triggers until restarted
            restart: config
                .get_bool("restart")
                .unwrap_or(site == SiteKind::Function),
        })
    }

    pub fn create_args(&self) -> Vec<String> {
        let mut args = args(&[
            self.site.command(),
            "create",
            "--name",
            &self.name,
            "--resource-group",
            &self.resource_group,
            "--plan",
            &self.plan,
        ]);
        if let Some(storage) = &self.storage_account {
            args.extend([
                "--storage-account".to_string(),
                storage.clone(),
                "--functions-version".to_string(),
                self.functions_version.clone(),
            ]);
        }
        if let Some(runtime) = &self.runtime {
            args.extend(["--runtime".to_string(), runtime.clone()]);
        }
        args
    }

    /// None when there are no settings to apply
    pub fn settings_args(&self) -> Option<Vec<String>> {
        if self.settings.is_empty() {
            return None;
        }
        let mut args = args(&[
            self.site.command(),
            "config",
            "appsettings",
            "set",
            "--name",
            &self.name,
            "--resource-group",
            &self.resource_group,
            "--settings",
        ]);
        args.extend(self.settings.iter().map(|(k, v)| format!("{}={}", k, v)));
        Some(args)
    }

    pub fn source_args(&self) -> Option<Vec<String>> {
        let repo = self.repo.as_ref()?;
        Some(args(&[
            self.site.command(),
            "deployment",
            "source",
            "config",
            "--name",
            &self.name,
            "--resource-group",
            &self.resource_group,
            "--repo-url",
            repo,
            "--branch",
            &self.branch,
            "--manual-integration",
        ]))
    }

    pub fn restart_args(&self) -> Vec<String> {
        args(&[
            self.site.command(),
            "restart",
            "--name",
            &self.name,
            "--resource-group",
            &self.resource_group,
        ])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceConfig {
    pub name: String,
    pub resource_group: String,
    pub location: Option<String>,
    pub sku: String,
}

impl WorkspaceConfig {
    pub fn create_args(&self) -> Vec<String> {
        let mut args = args(&[
            "monitor",
            "log-analytics",
            "workspace",
            "create",
            "--workspace-name",
            &self.name,
            "--resource-group",
            &self.resource_group,
            "--sku",
            &self.sku,
        ]);
        push_location(&mut args, &self.location);
        args
    }
}

/// Where diagnostic logs are sent
#[derive(Debug, Clone, PartialEq)]
pub enum LogDestination {
    EventHub {
        rule: String,
        event_hub: Option<String>,
    },
    Storage(String),
    Workspace(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticConfig {
    pub name: String,
    /// Resource id the setting is attached to
    pub target: String,
    pub category: String,
    pub destination: LogDestination,
}

impl DiagnosticConfig {
    fn parse(name: &str, config: &ResolvedConfig) -> Result<Self> {
        let rule = optional(config, "event-hub-rule");
        let storage = optional(config, "storage-account");
        let workspace = optional(config, "workspace");

        let destination = match (rule, storage, workspace) {
            (Some(rule), None, None) => LogDestination::EventHub {
                rule,
                event_hub: optional(config, "event-hub"),
            },
            (None, Some(storage), None) => LogDestination::Storage(storage),
            (None, None, Some(workspace)) => LogDestination::Workspace(workspace),
            _ => {
                return Err(CloudError::InvalidConfig(
                    "exactly one of event-hub-rule, storage-account or workspace is required"
                        .to_string(),
                ));
            }
        };

        Ok(Self {
            name: name.to_string(),
            target: required(config, "target")?,
            category: optional(config, "category")
                .unwrap_or_else(|| DEFAULT_DIAGNOSTIC_CATEGORY.to_string()),
            destination,
        })
    }

    pub fn create_args(&self) -> Vec<String> {
        let logs = json!([{ "category": self.category, "enabled": true }]).to_string();
        let mut args = args(&[
            "monitor",
            "diagnostic-settings",
            "create",
            "--name",
            &self.name,
            "--resource",
            &self.target,
            "--logs",
            &logs,
        ]);
        match &self.destination {
            LogDestination::EventHub { rule, event_hub } => {
                args.extend(["--event-hub-rule".to_string(), rule.clone()]);
                if let Some(hub) = event_hub {
                    args.extend(["--event-hub".to_string(), hub.clone()]);
                }
            }
            LogDestination::Storage(id) => {
                args.extend(["--storage-account".to_string(), id.clone()]);
            }
            LogDestination::Workspace(id) => {
                args.extend(["--workspace".to_string(), id.clone()]);
            }
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use std::collections::BTreeMap;

    fn request(kind: ResourceKind, name: &str, config: Value) -> ProvisionRequest {
        let values: BTreeMap<String, Value> = serde_json::from_value(config).unwrap();
        ProvisionRequest::new(name, name, kind, ResolvedConfig::new(values))
    }

    #[test]
    fn test_group_requires_location() {
        let err = AzureResource::parse(&request(ResourceKind::ResourceGroup, "rg", json!({})))
            .unwrap_err();
        assert!(matches!(err, CloudError::InvalidConfig(_)));

        let parsed = AzureResource::parse(&request(
            ResourceKind::ResourceGroup,
            "rg",
            json!({ "location": "East US" }),
        ))
        .unwrap();
        let AzureResource::Group(group) = parsed else {
            panic!("expected group");
        };
        assert_eq!(
            group.create_args(),
            vec!["group", "create", "--name", "rg", "--location", "East US"]
        );
    }

    #[test]
    fn test_hub_defaults() {
        let parsed = AzureResource::parse(&request(
            ResourceKind::Hub,
            "iothub-e2e-diag-1a2b",
            json!({ "resource-group": "rg", "device": "e2e-diag", "sampling-rate": 100 }),
        ))
        .unwrap();
        let AzureResource::Hub(hub) = parsed else {
            panic!("expected hub");
        };
        assert_eq!(hub.sku, "S1");
        assert_eq!(hub.policy, "iothubowner");
        assert!(!hub.existing);
        assert_eq!(hub.sampling_rate, Some(100));
        assert_eq!(
            hub.create_args("rg"),
            vec![
                "iot",
                "hub",
                "create",
                "--name",
                "iothub-e2e-diag-1a2b",
                "--resource-group",
                "rg",
                "--sku",
                "S1",
                "--unit",
                "1"
            ]
        );
    }

    #[test]
    fn test_existing_hub_without_group() {
        let parsed = AzureResource::parse(&request(
            ResourceKind::Hub,
            "shared-hub",
            json!({ "existing": true }),
        ))
        .unwrap();
        let AzureResource::Hub(hub) = parsed else {
            panic!("expected hub");
        };
        assert!(hub.existing);
        assert_eq!(hub.show_args(), vec!["iot", "hub", "show", "--name", "shared-hub"]);
    }

    #[test]
    fn test_hub_sampling_rate_range() {
        for config in [
            json!({ "resource-group": "rg", "device": "d", "sampling-rate": 101 }),
            json!({ "resource-group": "rg", "device": "d", "sampling-rate": "fast" }),
            json!({ "resource-group": "rg", "sampling-rate": 50 }),
        ] {
            let err = AzureResource::parse(&request(ResourceKind::Hub, "hub", config)).unwrap_err();
            assert!(matches!(err, CloudError::InvalidConfig(_)));
        }
    }

    #[test]
    fn test_sampling_args() {
        let args = HubConfig::sampling_args("e2e-diag", 50, "HostName=h");
        assert_eq!(args[7], r#"{"__e2e_diag_sample_rate":50}"#);
    }

    #[test]
    fn test_event_stream_args() {
        let parsed = AzureResource::parse(&request(
            ResourceKind::EventStream,
            "eventhub-e2e-diag-1a2b",
            json!({
                "resource-group": "rg",
                "location": "westus",
                "event-hub": "insights-logs-e2ediagnostics"
            }),
        ))
        .unwrap();
        let AzureResource::EventStream(events) = parsed else {
            panic!("expected event stream");
        };
        assert_eq!(events.retention_days, 1);
        assert_eq!(events.rule, "RootManageSharedAccessKey");
        assert_eq!(
            events.create_args(),
            vec![
                "eventhubs",
                "namespace",
                "create",
                "--name",
                "eventhub-e2e-diag-1a2b",
                "--resource-group",
                "rg",
                "--sku",
                "Basic",
                "--location",
                "westus"
            ]
        );
        assert_eq!(
            events.event_hub_args("insights-logs-e2ediagnostics").last().map(String::as_str),
            Some("1")
        );
    }

    #[test]
    fn test_storage_name_is_sanitized() {
        let parsed = AzureResource::parse(&request(
            ResourceKind::Storage,
            "storage-e2e-diag-1a2b",
            json!({ "resource-group": "rg" }),
        ))
        .unwrap();
        let AzureResource::Storage(storage) = parsed else {
            panic!("expected storage");
        };
        assert_eq!(storage.name, "storagee2ediag1a2b");
        assert_eq!(storage.sku, "Standard_LRS");

        // uppercase letters are kept as lowercase
        let parsed = AzureResource::parse(&request(
            ResourceKind::Storage,
            "StorageE2EDiag",
            json!({ "resource-group": "rg" }),
        ))
        .unwrap();
        let AzureResource::Storage(storage) = parsed else {
            panic!("expected storage");
        };
        assert_eq!(storage.name, "storagee2ediag");

        let err = AzureResource::parse(&request(
            ResourceKind::Storage,
            "S-1",
            json!({ "resource-group": "rg" }),
        ))
        .unwrap_err();
        assert!(matches!(err, CloudError::InvalidConfig(_)));
    }

    #[test]
    fn test_function_app_args() {
        let parsed = AzureResource::parse(&request(
            ResourceKind::FunctionApp,
            "function",
            json!({
                "resource-group": "rg",
                "plan": "plan",
                "storage-account": "storage01",
                "repo": "https://github.com/Azure-Samples/e2e-diagnostic-eventhub-ai-function",
                "branch": "auto",
                "app-settings": {
                    "E2E_DIAGNOSTICS_EVENTHUB_ENDPOINT": "Endpoint=sb://x",
                    "WEBSITE_CONTENTSHARE": "storage01"
                }
            }),
        ))
        .unwrap();
        let AzureResource::FunctionApp(site) = parsed else {
            panic!("expected function app");
        };
        assert!(site.restart);
        assert_eq!(
            site.create_args(),
            vec![
                "functionapp",
                "create",
                "--name",
                "function",
                "--resource-group",
                "rg",
                "--plan",
                "plan",
                "--storage-account",
                "storage01",
                "--functions-version",
                "4"
            ]
        );

        let settings = site.settings_args().unwrap();
        assert_eq!(
            &settings[9..],
            &[
                "E2E_DIAGNOSTICS_EVENTHUB_ENDPOINT=Endpoint=sb://x".to_string(),
                "WEBSITE_CONTENTSHARE=storage01".to_string()
            ]
        );

        let source = site.source_args().unwrap();
        assert!(source.contains(&"--manual-integration".to_string()));
        assert!(source.contains(&"auto".to_string()));
    }

    #[test]
    fn test_web_app_without_repo() {
        let parsed = AzureResource::parse(&request(
            ResourceKind::WebApp,
            "portal",
            json!({ "resource-group": "rg", "plan": "plan" }),
        ))
        .unwrap();
        let AzureResource::WebApp(site) = parsed else {
            panic!("expected web app");
        };
        assert!(!site.restart);
        assert!(site.settings_args().is_none());
        assert!(site.source_args().is_none());
        assert_eq!(site.create_args()[0], "webapp");
    }

    #[test]
    fn test_diagnostic_destination() {
        let parsed = AzureResource::parse(&request(
            ResourceKind::DiagnosticSetting,
            "e2e-diag",
            json!({
                "target": "/subscriptions/s/hub",
                "workspace": "/subscriptions/s/oms"
            }),
        ))
        .unwrap();
        let AzureResource::Diagnostic(diag) = parsed else {
            panic!("expected diagnostic setting");
        };
        let args = diag.create_args();
        assert_eq!(args[8], r#"[{"category":"E2EDiagnostics","enabled":true}]"#);
        assert_eq!(&args[9..], &["--workspace".to_string(), "/subscriptions/s/oms".to_string()]);

        let err = AzureResource::parse(&request(
            ResourceKind::DiagnosticSetting,
            "e2e-diag",
            json!({
                "target": "/subscriptions/s/hub",
                "workspace": "/w",
                "storage-account": "/s"
            }),
        ))
        .unwrap_err();
        assert!(matches!(err, CloudError::InvalidConfig(_)));
    }
}
