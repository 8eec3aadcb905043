//! StackFlow core
//!
//! リソース定義（スタック）のモデル、KDLパーサー、テンプレート展開、
//! 依存グラフの検証と実行順序の決定を提供します。

pub mod error;
pub mod graph;
pub mod loader;
pub mod model;
pub mod parser;
pub mod template;

pub use error::{Result, StackError};
pub use graph::DependencyGraph;
pub use loader::{load_stack_file, load_stack_str};
pub use model::*;
pub use parser::parse_stack_str;
pub use template::{TemplateProcessor, Variables, generate_suffix, parse_variable_assignment};
