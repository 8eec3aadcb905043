//! resource / output ノードのパース

use crate::error::{Result, StackError};
use crate::model::{AttributeRef, ConfigValue, OutputBinding, ResourceDescriptor, ResourceKind};
use kdl::{KdlEntry, KdlNode, KdlValue};
use std::collections::BTreeMap;

/// 最初の位置引数を文字列として取得
fn first_string_arg(node: &KdlNode) -> Option<&str> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
}

/// 名前付きプロパティを文字列として取得
fn string_property<'a>(node: &'a KdlNode, key: &str) -> Option<&'a str> {
    node.entries()
        .iter()
        .find(|e| e.name().map(|n| n.value()) == Some(key))
        .and_then(|e| e.value().as_string())
}

fn positional_args(node: &KdlNode) -> Vec<&KdlEntry> {
    node.entries().iter().filter(|e| e.name().is_none()).collect()
}

/// KDLの値をJSONの値に変換
pub(crate) fn kdl_value_to_json(value: &KdlValue) -> serde_json::Value {
    match value {
        KdlValue::String(s) => serde_json::Value::String(s.clone()),
        KdlValue::Integer(i) => {
            let n = i64::try_from(*i).unwrap_or(if *i < 0 { i64::MIN } else { i64::MAX });
            serde_json::Value::from(n)
        }
        KdlValue::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        KdlValue::Bool(b) => serde_json::Value::Bool(*b),
        KdlValue::Null => serde_json::Value::Null,
    }
}

/// resource ノードをパース
///
/// ```kdl
/// resource "storage" kind="storage" {
///     name "storage{{ suffix }}"
///     depends-on "group"
///     config {
///         resource-group ref="group.name"
///         sku "Standard_LRS"
///     }
/// }
/// ```
pub fn parse_resource(node: &KdlNode) -> Result<ResourceDescriptor> {
    let name = first_string_arg(node)
        .ok_or_else(|| StackError::InvalidDescriptor("resource requires a name".to_string()))?
        .to_string();

    let mut kind: Option<ResourceKind> = string_property(node, "kind")
        .map(str::parse)
        .transpose()?;
    let mut remote_name = None;
    let mut depends_on = Vec::new();
    let mut config = BTreeMap::new();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "kind" => {
                    kind = first_string_arg(child).map(str::parse).transpose()?;
                }
                "name" => {
                    remote_name = first_string_arg(child).map(|s| s.to_string());
                }
                "depends_on" | "depends-on" => {
                    // 複数の依存先を引数として受け取る
                    for entry in positional_args(child) {
                        let target = entry.value().as_string().ok_or_else(|| {
                            StackError::InvalidDescriptor(format!(
                                "resource '{}' の depends-on は文字列で指定してください: {}",
                                name,
                                entry.value()
                            ))
                        })?;
                        depends_on.push(target.to_string());
                    }
                }
                "config" => {
                    config = parse_config_block(child)?;
                }
                other => {
                    return Err(StackError::InvalidDescriptor(format!(
                        "resource '{}' に不明な項目があります: {}",
                        name, other
                    )));
                }
            }
        }
    }

    let kind = kind.ok_or_else(|| {
        StackError::InvalidDescriptor(format!("resource '{}' に kind が指定されていません", name))
    })?;

    Ok(ResourceDescriptor {
        name,
        kind,
        remote_name,
        depends_on,
        config,
    })
}

/// config ブロックの子ノードをマップに変換
fn parse_config_block(node: &KdlNode) -> Result<BTreeMap<String, ConfigValue>> {
    let mut map = BTreeMap::new();
    if let Some(children) = node.children() {
        for child in children.nodes() {
            let key = child.name().value();
            if map.contains_key(key) {
                return Err(StackError::InvalidDescriptor(format!(
                    "'{}' に '{}' が重複しています",
                    node.name().value(),
                    key
                )));
            }
            let value = parse_config_value(child)?;
            map.insert(key.to_string(), value);
        }
    }
    Ok(map)
}

/// 1つの設定ノードを値に変換
///
/// - `key ref="res.attr"` → 参照
/// - `key { ... }` → マップ
/// - `key "a"` → リテラル
/// - `key "a" "b"` → リスト
fn parse_config_value(node: &KdlNode) -> Result<ConfigValue> {
    let key = node.name().value();

    if let Some(reference) = string_property(node, "ref") {
        if !positional_args(node).is_empty() || node.children().is_some() {
            return Err(StackError::InvalidDescriptor(format!(
                "'{}': ref と値は同時に指定できません",
                key
            )));
        }
        let reference: AttributeRef = reference.parse()?;
        return Ok(ConfigValue::Reference(reference));
    }

    if node.children().is_some() {
        return Ok(ConfigValue::Map(parse_config_block(node)?));
    }

    let args = positional_args(node);
    match args.as_slice() {
        [] => Err(StackError::InvalidDescriptor(format!(
            "'{}' に値が指定されていません",
            key
        ))),
        [single] => Ok(ConfigValue::Literal(kdl_value_to_json(single.value()))),
        many => Ok(ConfigValue::List(
            many.iter()
                .map(|e| ConfigValue::Literal(kdl_value_to_json(e.value())))
                .collect(),
        )),
    }
}

/// output ノードをパース
///
/// ```kdl
/// output "STORAGE_CONNECTION_STRING" ref="storage.connectionString"
/// ```
pub fn parse_output(node: &KdlNode) -> Result<OutputBinding> {
    let name = first_string_arg(node)
        .ok_or_else(|| StackError::InvalidDescriptor("output requires a name".to_string()))?;
    let source = string_property(node, "ref").ok_or_else(|| {
        StackError::InvalidDescriptor(format!("output '{}' に ref が指定されていません", name))
    })?;

    Ok(OutputBinding::new(name, source.parse()?))
}
