//! スタック（1回の実行で扱うリソース定義一式）

use super::{AttributeRef, ResourceDescriptor};
use serde::{Deserialize, Serialize};

/// 実行後に環境変数として案内する出力値
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputBinding {
    /// 環境変数名（例: STORAGE_CONNECTION_STRING）
    pub name: String,
    pub source: AttributeRef,
}

impl OutputBinding {
    pub fn new(name: impl Into<String>, source: AttributeRef) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stack {
    pub name: String,
    /// ファイル記述順
    pub resources: Vec<ResourceDescriptor>,
    pub outputs: Vec<OutputBinding>,
}

impl Stack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn get(&self, name: &str) -> Option<&ResourceDescriptor> {
        self.resources.iter().find(|r| r.name == name)
    }
}
