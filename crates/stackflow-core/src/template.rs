//! テンプレート展開機能
//!
//! Teraを使用してスタック定義のテンプレート展開を行います。
//! 対話プロンプトの代わりに、リソース名や場所などを変数で受け取ります。

use crate::error::{Result, StackError};
use crate::parser::kdl_value_to_json;
use std::collections::HashMap;
use tera::{Context, Tera};
use tracing::{debug, info};

/// 環境変数から取り込むプレフィックス
const ENV_PREFIX: &str = "STACK_";

/// 変数コンテキスト
pub type Variables = HashMap<String, serde_json::Value>;

/// テンプレートプロセッサ
pub struct TemplateProcessor {
    tera: Tera,
    context: Context,
}

impl TemplateProcessor {
    /// 新しいテンプレートプロセッサを作成
    pub fn new() -> Self {
        Self {
            tera: Tera::default(),
            context: Context::new(),
        }
    }

    /// 変数を追加
    pub fn add_variable(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.context.insert(key.into(), &value);
    }

    /// 複数の変数を追加
    pub fn add_variables(&mut self, variables: Variables) {
        for (key, value) in variables {
            self.context.insert(key, &value);
        }
    }

    /// 実行ごとに一意なサフィックスを追加
    ///
    /// リソース名の衝突を避けるため、`-` + UUID先頭4文字を `suffix` として登録する。
    pub fn add_generated_suffix(&mut self) -> String {
        let suffix = generate_suffix();
        debug!(suffix = %suffix, "Generated resource name suffix");
        self.context
            .insert("suffix", &serde_json::Value::String(suffix.clone()));
        suffix
    }

    /// 環境変数を追加（STACK_* のみ）
    #[tracing::instrument(skip(self))]
    pub fn add_env_variables(&mut self) {
        self.add_env_variables_from(std::env::vars());
    }

    fn add_env_variables_from(&mut self, vars: impl Iterator<Item = (String, String)>) {
        let mut count = 0;
        for (key, value) in vars {
            if key.starts_with(ENV_PREFIX) {
                debug!(key = %key, "Adding environment variable");
                self.context.insert(key, &serde_json::Value::String(value));
                count += 1;
            }
        }

        info!(env_var_count = count, "Added filtered environment variables");
    }

    /// 文字列をテンプレートとして展開
    pub fn render_str(&mut self, template: &str) -> Result<String> {
        self.tera
            .render_str(template, &self.context)
            .map_err(|e| StackError::TemplateRenderError(extract_tera_error_detail(&e)))
    }
}

impl Default for TemplateProcessor {
    fn default() -> Self {
        Self::new()
    }
}

/// `-` + UUID v4 の先頭4文字
pub fn generate_suffix() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("-{}", &id[..4])
}

/// `key=value` 形式の文字列を変数に変換
pub fn parse_variable_assignment(assignment: &str) -> Result<(String, serde_json::Value)> {
    match assignment.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((
            key.trim().to_string(),
            serde_json::Value::String(value.to_string()),
        )),
        _ => Err(StackError::InvalidDescriptor(format!(
            "変数は key=value 形式で指定してください: {}",
            assignment
        ))),
    }
}

/// スタック定義から variables ブロックを抽出
///
/// テンプレート展開前の内容には `{{ ... }}` が含まれKDLとして読めないため、
/// ブロック部分だけを切り出してパースする。
pub fn extract_variables(kdl_content: &str) -> Result<Variables> {
    use regex::Regex;

    let re = Regex::new(r"(?m)^\s*variables\s*\{")
        .map_err(|e| StackError::InvalidDescriptor(format!("正規表現のコンパイルエラー: {}", e)))?;

    let mut all_vars = HashMap::new();
    for mat in re.find_iter(kdl_content) {
        let Some(end) = find_matching_brace(kdl_content, mat.end() - 1) else {
            continue;
        };
        let block = &kdl_content[mat.end()..end];
        let dummy_kdl = format!("extracted {{\n{}\n}}", block);
        let doc: kdl::KdlDocument = dummy_kdl.parse().map_err(|e| {
            StackError::InvalidDescriptor(format!("KDL パースエラー (variables ブロック): {}", e))
        })?;

        if let Some(node) = doc.nodes().first()
            && let Some(children) = node.children()
        {
            for var_node in children.nodes() {
                let key = var_node.name().value().to_string();
                if let Some(entry) = var_node.entries().first() {
                    all_vars.insert(key, kdl_value_to_json(entry.value()));
                }
            }
        }
    }

    Ok(all_vars)
}

/// 対応する閉じ波括弧の位置を見つける
fn find_matching_brace(content: &str, open_pos: usize) -> Option<usize> {
    let bytes = content.as_bytes();
    if open_pos >= bytes.len() || bytes[open_pos] != b'{' {
        return None;
    }

    let mut depth = 1;
    let mut pos = open_pos + 1;
    let mut in_string = false;
    let mut escape_next = false;

    while pos < bytes.len() && depth > 0 {
        let c = bytes[pos];

        if escape_next {
            escape_next = false;
        } else if c == b'\\' {
            escape_next = true;
        } else if c == b'"' {
            in_string = !in_string;
        } else if !in_string {
            if c == b'{' {
                depth += 1;
            } else if c == b'}' {
                depth -= 1;
            }
        }

        pos += 1;
    }

    if depth == 0 { Some(pos - 1) } else { None }
}

/// Teraエラーから詳細情報を抽出
fn extract_tera_error_detail(e: &tera::Error) -> String {
    use std::error::Error;

    let mut details = vec![e.to_string()];
    let mut source = e.source();
    while let Some(err) = source {
        details.push(err.to_string());
        source = err.source();
    }
    let full_error = details.join(" | ");

    // "Variable `xxx` not found in context"
    if let Some(start) = full_error.find("Variable `")
        && let Some(end) = full_error[start..].find("` not found")
    {
        let var_name = &full_error[start + 10..start + end];
        return format!(
            "未定義の変数: `{}`\nヒント: variables ブロックで定義するか、--var {}=... で指定してください",
            var_name, var_name
        );
    }

    full_error
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_variables() {
        let mut processor = TemplateProcessor::new();
        processor.add_variable("location", serde_json::json!("Japan East"));
        processor.add_variable("suffix", serde_json::json!("-ab12"));

        let rendered = processor
            .render_str(r#"name "storage{{ suffix }}" location "{{ location }}""#)
            .unwrap();
        assert_eq!(rendered, r#"name "storage-ab12" location "Japan East""#);
    }

    #[test]
    fn test_render_undefined_variable() {
        let mut processor = TemplateProcessor::new();
        let err = processor.render_str("{{ missing }}").unwrap_err();
        match err {
            StackError::TemplateRenderError(msg) => assert!(msg.contains("missing")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_env_variables_are_filtered() {
        let mut processor = TemplateProcessor::new();
        processor.add_env_variables_from(
            vec![
                ("STACK_LOCATION".to_string(), "West Europe".to_string()),
                ("AWS_SECRET".to_string(), "nope".to_string()),
            ]
            .into_iter(),
        );

        let rendered = processor.render_str("{{ STACK_LOCATION }}").unwrap();
        assert_eq!(rendered, "West Europe");
        assert!(processor.render_str("{{ AWS_SECRET }}").is_err());
    }

    #[test]
    fn test_generated_suffix_format() {
        let suffix = generate_suffix();
        assert_eq!(suffix.len(), 5);
        assert!(suffix.starts_with('-'));
        assert!(suffix[1..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_parse_variable_assignment() {
        let (key, value) = parse_variable_assignment("location=East US").unwrap();
        assert_eq!(key, "location");
        assert_eq!(value, serde_json::json!("East US"));

        // 値に = を含んでもよい
        let (_, value) = parse_variable_assignment("token=a=b").unwrap();
        assert_eq!(value, serde_json::json!("a=b"));

        assert!(parse_variable_assignment("novalue").is_err());
        assert!(parse_variable_assignment("=x").is_err());
    }

    #[test]
    fn test_extract_variables() {
        let content = r#"
stack "demo"

variables {
    location "East US"
    unit 2
}

resource "storage" kind="storage" {
    name "storage{{ suffix }}"
    config {
        location "{{ location }}"
    }
}
"#;
        let vars = extract_variables(content).unwrap();
        assert_eq!(vars.get("location"), Some(&serde_json::json!("East US")));
        assert_eq!(vars.get("unit"), Some(&serde_json::json!(2)));
        assert_eq!(vars.len(), 2);
    }

    #[test]
    fn test_extract_variables_none() {
        let vars = extract_variables(r#"resource "g" kind="group""#).unwrap();
        assert!(vars.is_empty());
    }

    #[test]
    fn test_find_matching_brace_skips_strings() {
        let content = r#"variables { note "}" }"#;
        let open = content.find('{').unwrap();
        assert_eq!(find_matching_brace(content, open), Some(content.len() - 1));
    }
}
