//! スタック定義ファイルの探索

pub mod error;

pub use error::*;

use std::path::{Path, PathBuf};
use tracing::debug;

/// ファイルパスを直接指定する環境変数
pub const CONFIG_PATH_ENV: &str = "STACK_CONFIG_PATH";

/// 既定のスタック定義ファイル名
pub const DEFAULT_FILE_NAME: &str = "stack.kdl";

/// プロジェクト内の設定ディレクトリ名
pub const PROJECT_DIR: &str = ".stackflow";

/// 優先順に並べた候補ファイル名
pub const CANDIDATES: [&str; 4] = [
    "stack.local.kdl",
    ".stack.local.kdl",
    "stack.kdl",
    ".stack.kdl",
];

/// スタック定義ファイルの探索条件
#[derive(Debug, Clone, Default)]
pub struct StackFileLocator {
    /// STACK_CONFIG_PATH の値
    pub env_path: Option<PathBuf>,
    /// 探索の起点（通常はカレントディレクトリ）
    pub base_dir: PathBuf,
    /// グローバル設定ディレクトリ（~/.config/stackflow）
    pub global_dir: Option<PathBuf>,
}

impl StackFileLocator {
    /// 現在のプロセス環境から探索条件を作る
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            env_path: std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from),
            base_dir: std::env::current_dir()?,
            global_dir: dirs::config_dir().map(|d| d.join("stackflow")),
        })
    }

    /// 以下の優先順位で探索:
    /// 1. STACK_CONFIG_PATH（指定されていて存在しなければエラー）
    /// 2. 起点ディレクトリの候補ファイル
    /// 3. 起点ディレクトリの .stackflow/ 内の候補ファイル
    /// 4. グローバル設定ディレクトリの stack.kdl
    pub fn locate(&self) -> Result<PathBuf> {
        if let Some(path) = &self.env_path {
            if path.exists() {
                debug!("Using {} from {}", path.display(), CONFIG_PATH_ENV);
                return Ok(path.clone());
            }
            return Err(ConfigError::EnvPathNotFound(path.clone()));
        }

        if let Some(path) = first_existing(&self.base_dir) {
            return Ok(path);
        }

        let project_dir = self.base_dir.join(PROJECT_DIR);
        if project_dir.is_dir()
            && let Some(path) = first_existing(&project_dir)
        {
            return Ok(path);
        }

        if let Some(global_dir) = &self.global_dir {
            let global = global_dir.join(DEFAULT_FILE_NAME);
            if global.exists() {
                return Ok(global);
            }
        }

        Err(ConfigError::StackFileNotFound)
    }
}

fn first_existing(dir: &Path) -> Option<PathBuf> {
    CANDIDATES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// プロジェクトのスタック定義ファイルを探す
pub fn find_stack_file() -> Result<PathBuf> {
    StackFileLocator::from_env()?.locate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    fn locator(base: &Path) -> StackFileLocator {
        StackFileLocator {
            env_path: None,
            base_dir: base.to_path_buf(),
            global_dir: None,
        }
    }

    #[test]
    fn test_find_in_base_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("stack.kdl"), "// test").unwrap();

        let found = locator(temp_dir.path()).locate().unwrap();
        assert_eq!(found, temp_dir.path().join("stack.kdl"));
    }

    #[test]
    fn test_local_file_priority() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("stack.kdl"), "// shared").unwrap();
        fs::write(temp_dir.path().join(".stack.local.kdl"), "// local").unwrap();

        // 隠しファイルでも local が優先される
        let found = locator(temp_dir.path()).locate().unwrap();
        assert!(found.ends_with(".stack.local.kdl"));
    }

    #[test]
    fn test_find_in_project_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let project_dir = temp_dir.path().join(".stackflow");
        fs::create_dir(&project_dir).unwrap();
        fs::write(project_dir.join("stack.kdl"), "// in project dir").unwrap();

        let found = locator(temp_dir.path()).locate().unwrap();
        assert!(found.ends_with(".stackflow/stack.kdl"));
    }

    #[test]
    fn test_base_dir_wins_over_project_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let project_dir = temp_dir.path().join(".stackflow");
        fs::create_dir(&project_dir).unwrap();
        fs::write(project_dir.join("stack.local.kdl"), "// project").unwrap();
        fs::write(temp_dir.path().join(".stack.kdl"), "// base").unwrap();

        let found = locator(temp_dir.path()).locate().unwrap();
        assert_eq!(found, temp_dir.path().join(".stack.kdl"));
    }

    #[test]
    fn test_global_fallback() {
        let temp_dir = tempfile::tempdir().unwrap();
        let global_dir = tempfile::tempdir().unwrap();
        fs::write(global_dir.path().join("stack.kdl"), "// global").unwrap();

        let found = StackFileLocator {
            global_dir: Some(global_dir.path().to_path_buf()),
            ..locator(temp_dir.path())
        }
        .locate()
        .unwrap();
        assert_eq!(found, global_dir.path().join("stack.kdl"));
    }

    #[test]
    fn test_not_found() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = locator(temp_dir.path()).locate();
        assert!(matches!(result, Err(ConfigError::StackFileNotFound)));
    }

    #[test]
    fn test_missing_env_path_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("stack.kdl"), "// present").unwrap();

        let result = StackFileLocator {
            env_path: Some(temp_dir.path().join("missing.kdl")),
            ..locator(temp_dir.path())
        }
        .locate();
        assert!(matches!(result, Err(ConfigError::EnvPathNotFound(_))));
    }

    #[test]
    #[serial]
    fn test_find_stack_file_env_var() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("custom.kdl");
        fs::write(&config_path, "// custom").unwrap();

        temp_env::with_var(CONFIG_PATH_ENV, Some(&config_path), || {
            assert_eq!(find_stack_file().unwrap(), config_path);
        });
    }

    #[test]
    #[serial]
    fn test_find_stack_file_in_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();
        fs::write(temp_dir.path().join("stack.local.kdl"), "// local").unwrap();

        std::env::set_current_dir(&temp_dir).unwrap();
        let result = temp_env::with_var_unset(CONFIG_PATH_ENV, find_stack_file);
        std::env::set_current_dir(original_dir).unwrap();

        assert!(result.unwrap().ends_with("stack.local.kdl"));
    }
}
