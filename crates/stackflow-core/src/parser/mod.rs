//! KDLパーサー
//!
//! テンプレート展開済みのスタック定義（stack.kdl）をパースします。

mod resource;

pub(crate) use resource::kdl_value_to_json;
pub use resource::{parse_output, parse_resource};

use crate::error::Result;
use crate::model::Stack;
use kdl::KdlDocument;
use tracing::warn;

/// KDL文字列をパースしてStackを生成
pub fn parse_stack_str(content: &str, default_name: impl Into<String>) -> Result<Stack> {
    let doc: KdlDocument = content.parse()?;
    let mut stack = Stack::new(default_name);

    for node in doc.nodes() {
        match node.name().value() {
            "stack" => {
                if let Some(name) = node.entries().first().and_then(|e| e.value().as_string()) {
                    stack.name = name.to_string();
                }
            }
            "resource" => {
                stack.resources.push(parse_resource(node)?);
            }
            "output" => {
                stack.outputs.push(parse_output(node)?);
            }
            "variables" => {
                // テンプレート展開時に処理済み
            }
            other => {
                warn!(node = %other, "Skipping unknown top-level node");
            }
        }
    }

    Ok(stack)
}

#[cfg(test)]
mod tests;
