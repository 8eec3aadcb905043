//! 統合ローダー
//!
//! 変数収集、テンプレート展開、パースを統合

use crate::error::{Result, StackError};
use crate::model::Stack;
use crate::parser::parse_stack_str;
use crate::template::{TemplateProcessor, Variables, extract_variables};
use std::path::Path;
use tracing::{debug, info, instrument};

/// スタック定義ファイルをロード
///
/// 以下の処理を実行:
/// 1. variables ブロックの収集
/// 2. テンプレート展開
/// 3. KDLパース
///
/// 変数の優先順位（後勝ち）: 生成された `suffix` → variables ブロック →
/// `STACK_*` 環境変数 → `overrides`（CLI の `--var`）
#[instrument(skip(overrides), fields(path = %path.display()))]
pub fn load_stack_file(path: &Path, overrides: &Variables) -> Result<Stack> {
    let content = std::fs::read_to_string(path).map_err(|e| StackError::IoError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let default_name = path
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .unwrap_or("unnamed")
        .to_string();

    load_stack_str(&content, default_name, overrides).map_err(|e| match e {
        StackError::TemplateRenderError(message) => StackError::TemplateError {
            file: path.to_path_buf(),
            message,
        },
        other => other,
    })
}

/// 文字列からスタック定義をロード
pub fn load_stack_str(content: &str, default_name: String, overrides: &Variables) -> Result<Stack> {
    debug!("Step 1: Preparing template processor");
    let mut processor = TemplateProcessor::new();
    processor.add_generated_suffix();
    processor.add_variables(extract_variables(content)?);
    processor.add_env_variables();
    processor.add_variables(overrides.clone());

    debug!("Step 2: Expanding template");
    let expanded = processor.render_str(content)?;

    debug!("Step 3: Parsing KDL");
    let stack = parse_stack_str(&expanded, default_name)?;
    info!(
        stack = %stack.name,
        resources = stack.resources.len(),
        outputs = stack.outputs.len(),
        "Stack loaded successfully"
    );

    Ok(stack)
}
