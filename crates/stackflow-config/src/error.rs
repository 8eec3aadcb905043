use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "スタック定義ファイルが見つかりません。以下の場所を確認してください:\n\
        - カレントディレクトリ: stack.local.kdl, .stack.local.kdl, stack.kdl, .stack.kdl\n\
        - ./.stackflow/ ディレクトリ\n\
        - ~/.config/stackflow/stack.kdl\n\
        または STACK_CONFIG_PATH 環境変数で直接指定できます（`stack init` で雛形を作成できます）"
    )]
    StackFileNotFound,

    #[error("STACK_CONFIG_PATH で指定されたファイルが存在しません: {0}")]
    EnvPathNotFound(PathBuf),

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
