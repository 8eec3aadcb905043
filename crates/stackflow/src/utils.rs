use stackflow_core::{Stack, Variables, parse_variable_assignment};
use std::path::PathBuf;

/// `--var key=value` の一覧をテンプレート変数に変換
pub fn parse_vars(assignments: &[String]) -> anyhow::Result<Variables> {
    let mut vars = Variables::new();
    for assignment in assignments {
        let (key, value) = parse_variable_assignment(assignment)?;
        vars.insert(key, value);
    }
    Ok(vars)
}

/// 指定ファイル、なければ自動検出したスタック定義のパス
pub fn resolve_stack_path(file: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    match file {
        Some(path) if path.exists() => Ok(path),
        Some(path) => Err(anyhow::anyhow!(
            "スタック定義ファイルが見つかりません: {}",
            path.display()
        )),
        None => Ok(stackflow_config::find_stack_file()?),
    }
}

/// スタック定義を探してロード
pub fn load_stack(file: Option<PathBuf>, vars: &[String]) -> anyhow::Result<(PathBuf, Stack)> {
    let path = resolve_stack_path(file)?;
    let overrides = parse_vars(vars)?;
    let stack = stackflow_core::load_stack_file(&path, &overrides)?;
    Ok((path, stack))
}
