use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StackError {
    #[error("KDLパースエラー: {0}")]
    KdlParse(#[from] kdl::KdlError),

    #[error("IO エラー: {path}\n理由: {message}")]
    IoError { path: PathBuf, message: String },

    #[error("無効なリソース定義: {0}")]
    InvalidDescriptor(String),

    #[error("不明なリソース種別: {0}")]
    UnknownKind(String),

    #[error("テンプレートエラー: {file}\n理由: {message}")]
    TemplateError { file: PathBuf, message: String },

    #[error("テンプレート展開エラー: {0}")]
    TemplateRenderError(String),

    #[error("リソース名が重複しています: {0}")]
    DuplicateResource(String),

    #[error("リソース '{resource}' が未定義のリソース '{dependency}' に依存しています")]
    UnknownDependency {
        resource: String,
        dependency: String,
    },

    #[error("循環依存が検出されました: {}", .0.join(" -> "))]
    CyclicDependency(Vec<String>),
}

pub type Result<T> = std::result::Result<T, StackError>;
