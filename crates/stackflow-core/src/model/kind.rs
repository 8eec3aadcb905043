//! リソース種別

use crate::error::StackError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// プロビジョニング対象のリソース種別
///
/// 種別ごとに1つのプロビジョナーが登録される。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    /// リソースグループ（他の全リソースの入れ物）
    ResourceGroup,
    /// IoT Hub
    Hub,
    /// Event Hubs 名前空間
    EventStream,
    /// Application Insights
    Monitoring,
    /// ストレージアカウント
    Storage,
    /// App Service プラン
    ServicePlan,
    /// Function App
    FunctionApp,
    /// Log Analytics ワークスペース
    AnalyticsWorkspace,
    /// Web ポータル（Web App）
    WebApp,
    /// 診断設定（ログの送信先をひも付ける）
    DiagnosticSetting,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 10] = [
        ResourceKind::ResourceGroup,
        ResourceKind::Hub,
        ResourceKind::EventStream,
        ResourceKind::Monitoring,
        ResourceKind::Storage,
        ResourceKind::ServicePlan,
        ResourceKind::FunctionApp,
        ResourceKind::AnalyticsWorkspace,
        ResourceKind::WebApp,
        ResourceKind::DiagnosticSetting,
    ];

    /// KDL やログで使う正規名（camelCase）
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::ResourceGroup => "resourceGroup",
            ResourceKind::Hub => "hub",
            ResourceKind::EventStream => "eventStream",
            ResourceKind::Monitoring => "monitoring",
            ResourceKind::Storage => "storage",
            ResourceKind::ServicePlan => "servicePlan",
            ResourceKind::FunctionApp => "functionApp",
            ResourceKind::AnalyticsWorkspace => "analyticsWorkspace",
            ResourceKind::WebApp => "webApp",
            ResourceKind::DiagnosticSetting => "diagnosticSetting",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = StackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // kebab-case / snake_case も受け付ける
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();

        let kind = match normalized.as_str() {
            "resourcegroup" | "group" => ResourceKind::ResourceGroup,
            "hub" | "iothub" => ResourceKind::Hub,
            "eventstream" | "eventhub" | "eventhubs" => ResourceKind::EventStream,
            "monitoring" | "appinsights" | "applicationinsights" => ResourceKind::Monitoring,
            "storage" | "storageaccount" => ResourceKind::Storage,
            "serviceplan" | "appserviceplan" => ResourceKind::ServicePlan,
            "functionapp" | "function" => ResourceKind::FunctionApp,
            "analyticsworkspace" | "loganalytics" => ResourceKind::AnalyticsWorkspace,
            "webapp" | "portal" => ResourceKind::WebApp,
            "diagnosticsetting" | "diagnostics" => ResourceKind::DiagnosticSetting,
            _ => return Err(StackError::UnknownKind(s.to_string())),
        };
        Ok(kind)
    }
}
