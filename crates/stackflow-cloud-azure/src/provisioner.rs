//! Azure provisioner implementation

use crate::az::AzCli;
use crate::connection::{
    device_connection_string, hub_connection_string, storage_connection_string,
};
use crate::error::{AzureError, Result};
use crate::resources::{
    AzureResource, DiagnosticConfig, EventStreamConfig, HubConfig, MonitoringConfig, SiteConfig,
    StorageConfig,
};
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use stackflow_cloud::{CloudError, ProvisionRequest, ProvisionResult, Provisioner};
use stackflow_core::ResourceKind;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Attributes each kind exposes to dependents
pub fn output_keys(kind: ResourceKind) -> &'static [&'static str] {
    match kind {
        ResourceKind::ResourceGroup => &["id", "name", "location"],
        ResourceKind::Hub => &[
            "id",
            "name",
            "resourceGroup",
            "hostName",
            "connectionString",
            "deviceConnectionString",
        ],
        ResourceKind::EventStream => &[
            "id",
            "name",
            "authorizationRuleId",
            "connectionString",
            "eventHubName",
        ],
        ResourceKind::Monitoring => &["id", "name", "appId", "instrumentationKey", "apiKey"],
        ResourceKind::Storage => &["id", "name", "connectionString"],
        ResourceKind::ServicePlan => &["id", "name"],
        ResourceKind::FunctionApp | ResourceKind::WebApp => &["id", "name", "hostName", "url"],
        ResourceKind::AnalyticsWorkspace => &["id", "name", "customerId"],
        ResourceKind::DiagnosticSetting => &["id", "name"],
    }
}

/// Azure provisioner for one resource kind
pub struct AzureProvisioner {
    kind: ResourceKind,
    az: Arc<AzCli>,
}

impl AzureProvisioner {
    pub fn new(kind: ResourceKind, az: Arc<AzCli>) -> Self {
        Self { kind, az }
    }

    async fn create(&self, resource: &AzureResource, cancel: &CancellationToken) -> Result<Value> {
        match resource {
            AzureResource::Group(group) => {
                let created = self.az.run_json(&group.create_args(), cancel).await?;
                Ok(json!({
                    "id": str_at(&created, "/id"),
                    "name": str_at(&created, "/name"),
                    "location": str_at(&created, "/location"),
                }))
            }
            AzureResource::Hub(hub) => self.create_hub(hub, cancel).await,
            AzureResource::EventStream(events) => self.create_event_stream(events, cancel).await,
            AzureResource::Monitoring(monitoring) => {
                self.create_monitoring(monitoring, cancel).await
            }
            AzureResource::Storage(storage) => self.create_storage(storage, cancel).await,
            AzureResource::ServicePlan(plan) => {
                let created = self.az.run_json(&plan.create_args(), cancel).await?;
                Ok(json!({
                    "id": str_at(&created, "/id"),
                    "name": str_at(&created, "/name"),
                }))
            }
            AzureResource::FunctionApp(site) | AzureResource::WebApp(site) => {
                self.create_site(site, cancel).await
            }
            AzureResource::Workspace(workspace) => {
                let created = self.az.run_json(&workspace.create_args(), cancel).await?;
                Ok(json!({
                    "id": str_at(&created, "/id"),
                    "name": str_at(&created, "/name"),
                    "customerId": str_at(&created, "/customerId"),
                }))
            }
            AzureResource::Diagnostic(diagnostic) => {
                self.create_diagnostic(diagnostic, cancel).await
            }
        }
    }

    async fn create_hub(&self, hub: &HubConfig, cancel: &CancellationToken) -> Result<Value> {
        // Reuse the hub when it already exists
        let found = match self.az.run_json(&hub.show_args(), cancel).await {
            Ok(found) => Some(found),
            Err(AzureError::CommandFailed { .. }) if !hub.existing => None,
            Err(e) => return Err(e),
        };

        let resource = match found {
            Some(found) => {
                info!("Using existing IoT Hub {}", hub.name);
                found
            }
            None => {
                let group = hub.resource_group.as_deref().ok_or_else(|| {
                    CloudError::InvalidConfig("resource-group is required".to_string())
                })?;
                info!("Creating IoT Hub {}", hub.name);
                self.az.run_json(&hub.create_args(group), cancel).await?
            }
        };

        let host_name = require_at(&resource, "/properties/hostName")?;
        let group = match &hub.resource_group {
            Some(group) => group.clone(),
            None => require_at(&resource, "/resourcegroup")?,
        };

        let policy = self.az.run_json(&hub.policy_args(&group), cancel).await?;
        let key = require_at(&policy, "/primaryKey")?;
        let connection_string = hub_connection_string(&host_name, &hub.policy, &key);

        let device_connection_string = match &hub.device {
            Some(device) => {
                let device_key = self.ensure_device(device, &connection_string, cancel).await?;
                if let Some(rate) = hub.sampling_rate {
                    debug!("Setting sampling rate of {} to {}", device, rate);
                    self.az
                        .run_json(
                            &HubConfig::sampling_args(device, rate, &connection_string),
                            cancel,
                        )
                        .await?;
                }
                Some(device_connection_string(&host_name, device, &device_key))
            }
            None => None,
        };

        Ok(json!({
            "id": str_at(&resource, "/id"),
            "name": str_at(&resource, "/name"),
            "resourceGroup": group,
            "hostName": host_name,
            "connectionString": connection_string,
            "deviceConnectionString": device_connection_string,
        }))
    }

    /// Show the device identity, creating it when missing. Returns its primary key.
    async fn ensure_device(
        &self,
        device: &str,
        login: &str,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let identity = match self
            .az
            .run_json(&HubConfig::device_args("show", device, login), cancel)
            .await
        {
            Ok(identity) => identity,
            Err(AzureError::CommandFailed { .. }) => {
                info!("Creating IoT Hub device {}", device);
                self.az
                    .run_json(&HubConfig::device_args("create", device, login), cancel)
                    .await?
            }
            Err(e) => return Err(e),
        };
        require_at(&identity, "/authentication/symmetricKey/primaryKey")
    }

    async fn create_event_stream(
        &self,
        events: &EventStreamConfig,
        cancel: &CancellationToken,
    ) -> Result<Value> {
        let namespace = self.az.run_json(&events.create_args(), cancel).await?;

        if let Some(event_hub) = &events.event_hub {
            info!("Creating event hub {} in {}", event_hub, events.name);
            self.az
                .run_json(&events.event_hub_args(event_hub), cancel)
                .await?;
        }

        let rule = self.az.run_json(&events.rule_args(), cancel).await?;
        let keys = self.az.run_json(&events.keys_args(), cancel).await?;

        Ok(json!({
            "id": str_at(&namespace, "/id"),
            "name": str_at(&namespace, "/name"),
            "authorizationRuleId": str_at(&rule, "/id"),
            "connectionString": str_at(&keys, "/primaryConnectionString"),
            "eventHubName": events.event_hub,
        }))
    }

    async fn create_monitoring(
        &self,
        monitoring: &MonitoringConfig,
        cancel: &CancellationToken,
    ) -> Result<Value> {
        let component = self.az.run_json(&monitoring.create_args(), cancel).await?;

        // The key value is only returned on creation, so an existing key is replaced
        let api_key = match &monitoring.api_key {
            Some(name) => {
                if let Err(e) = self
                    .az
                    .run_json(&monitoring.api_key_args("delete", name), cancel)
                    .await
                {
                    if !matches!(e, AzureError::CommandFailed { .. }) {
                        return Err(e);
                    }
                    debug!("No previous api key {}: {}", name, e);
                }
                let created = self
                    .az
                    .run_json(&monitoring.api_key_args("create", name), cancel)
                    .await?;
                str_at(&created, "/apiKey")
            }
            None => None,
        };

        Ok(json!({
            "id": str_at(&component, "/id"),
            "name": str_at(&component, "/name"),
            "appId": str_at(&component, "/appId"),
            "instrumentationKey": str_at(&component, "/instrumentationKey"),
            "apiKey": api_key,
        }))
    }

    async fn create_storage(
        &self,
        storage: &StorageConfig,
        cancel: &CancellationToken,
    ) -> Result<Value> {
        let account = self.az.run_json(&storage.create_args(), cancel).await?;
        let keys = self.az.run_json(&storage.keys_args(), cancel).await?;
        let key = require_at(&keys, "/0/value")?;

        Ok(json!({
            "id": str_at(&account, "/id"),
            "name": storage.name,
            "connectionString": storage_connection_string(&storage.name, &key),
        }))
    }

    async fn create_site(&self, site: &SiteConfig, cancel: &CancellationToken) -> Result<Value> {
        let created = self.az.run_json(&site.create_args(), cancel).await?;

        if let Some(settings) = site.settings_args() {
            self.az.run_json(&settings, cancel).await?;
        }
        if let Some(source) = site.source_args() {
            info!(
                "Syncing {} from {}",
                site.name,
                site.repo.as_deref().unwrap_or_default()
            );
            self.az.run_json(&source, cancel).await?;
        }
        if site.restart {
            self.az.run(&site.restart_args(), cancel).await?;
        }

        let host_name = str_at(&created, "/defaultHostName");
        Ok(json!({
            "id": str_at(&created, "/id"),
            "name": str_at(&created, "/name"),
            "hostName": host_name,
            "url": host_name.as_ref().map(|h| format!("https://{}", h)),
        }))
    }

    async fn create_diagnostic(
        &self,
        diagnostic: &DiagnosticConfig,
        cancel: &CancellationToken,
    ) -> Result<Value> {
        let created = self.az.run_json(&diagnostic.create_args(), cancel).await?;
        Ok(json!({
            "id": str_at(&created, "/id"),
            "name": str_at(&created, "/name").unwrap_or_else(|| diagnostic.name.clone()),
        }))
    }
}

#[async_trait]
impl Provisioner for AzureProvisioner {
    fn kind(&self) -> ResourceKind {
        self.kind
    }

    fn validate(&self, request: &ProvisionRequest) -> stackflow_cloud::Result<()> {
        AzureResource::parse(request).map(|_| ())
    }

    async fn create_or_update(&self, request: &ProvisionRequest) -> stackflow_cloud::Result<Value> {
        let resource = AzureResource::parse(request)?;
        self.create(&resource, &request.cancellation)
            .await
            .map_err(|e| e.into_cloud(self.kind))
    }

    async fn extract_outputs(
        &self,
        _request: &ProvisionRequest,
        created: Value,
    ) -> stackflow_cloud::Result<ProvisionResult> {
        Ok(extract(self.kind, created))
    }
}

/// Keep the kind's output attributes that are present in the created value
pub fn extract(kind: ResourceKind, created: Value) -> ProvisionResult {
    let mut fields = match created {
        Value::Object(fields) => fields,
        _ => Map::new(),
    };
    output_keys(kind)
        .iter()
        .fold(ProvisionResult::new(), |result, key| {
            let value = fields.remove(*key).filter(|v| !v.is_null());
            result.with_opt(*key, value)
        })
}

fn str_at(value: &Value, pointer: &str) -> Option<String> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn require_at(value: &Value, pointer: &str) -> Result<String> {
    str_at(value, pointer)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AzureError::UnexpectedOutput(format!("missing {}", pointer)))
}
