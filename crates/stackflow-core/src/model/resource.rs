//! リソース定義モデル

use super::ResourceKind;
use crate::error::{Result, StackError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// 他リソースの出力属性への参照（`resource.attribute`）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttributeRef {
    pub resource: String,
    pub attribute: String,
}

impl AttributeRef {
    pub fn new(resource: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            attribute: attribute.into(),
        }
    }
}

impl fmt::Display for AttributeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.resource, self.attribute)
    }
}

impl FromStr for AttributeRef {
    type Err = StackError;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('.') {
            Some((resource, attribute)) if !resource.is_empty() && !attribute.is_empty() => {
                Ok(Self::new(resource.trim(), attribute.trim()))
            }
            _ => Err(StackError::InvalidDescriptor(format!(
                "参照は `resource.attribute` 形式で指定してください: {}",
                s
            ))),
        }
    }
}

/// 設定値
///
/// リテラル値か、実行時に解決される参照。ネストしたマップ・リストも持てる。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigValue {
    Literal(serde_json::Value),
    Reference(AttributeRef),
    Map(BTreeMap<String, ConfigValue>),
    List(Vec<ConfigValue>),
}

impl ConfigValue {
    pub fn literal(value: impl Into<serde_json::Value>) -> Self {
        ConfigValue::Literal(value.into())
    }

    pub fn reference(resource: impl Into<String>, attribute: impl Into<String>) -> Self {
        ConfigValue::Reference(AttributeRef::new(resource, attribute))
    }

    /// この値に含まれる全ての参照（出現順）
    pub fn references(&self) -> Vec<&AttributeRef> {
        let mut refs = Vec::new();
        self.collect_references(&mut refs);
        refs
    }

    fn collect_references<'a>(&'a self, refs: &mut Vec<&'a AttributeRef>) {
        match self {
            ConfigValue::Literal(_) => {}
            ConfigValue::Reference(r) => refs.push(r),
            ConfigValue::Map(map) => {
                for value in map.values() {
                    value.collect_references(refs);
                }
            }
            ConfigValue::List(items) => {
                for item in items {
                    item.collect_references(refs);
                }
            }
        }
    }
}

/// 1つのリソースの宣言的な定義
///
/// 実行中は不変。`name` は1回の実行内で一意な識別子で、
/// クラウド上の名前は `remote_name`（省略時は `name`）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub name: String,
    pub kind: ResourceKind,
    pub remote_name: Option<String>,
    pub depends_on: Vec<String>,
    pub config: BTreeMap<String, ConfigValue>,
}

impl ResourceDescriptor {
    pub fn new(name: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            name: name.into(),
            kind,
            remote_name: None,
            depends_on: Vec::new(),
            config: BTreeMap::new(),
        }
    }

    pub fn with_remote_name(mut self, remote_name: impl Into<String>) -> Self {
        self.remote_name = Some(remote_name.into());
        self
    }

    pub fn depends_on(mut self, dependency: impl Into<String>) -> Self {
        self.depends_on.push(dependency.into());
        self
    }

    pub fn with_config(mut self, key: impl Into<String>, value: ConfigValue) -> Self {
        self.config.insert(key.into(), value);
        self
    }

    /// クラウド上で使う名前
    pub fn remote_name(&self) -> &str {
        self.remote_name.as_deref().unwrap_or(&self.name)
    }

    /// 設定内の全参照（キー順）
    pub fn references(&self) -> Vec<&AttributeRef> {
        self.config.values().flat_map(|v| v.references()).collect()
    }

    /// 実効的な依存先
    ///
    /// `depends_on` と、設定中の参照が指すリソースの和集合。
    /// 順序は `depends_on` → 参照の出現順で、重複は除く。
    pub fn dependencies(&self) -> Vec<&str> {
        let mut deps: Vec<&str> = Vec::new();
        let referenced = self.references().into_iter().map(|r| r.resource.as_str());
        for dep in self.depends_on.iter().map(String::as_str).chain(referenced) {
            if !deps.contains(&dep) {
                deps.push(dep);
            }
        }
        deps
    }
}
