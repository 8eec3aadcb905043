//! モデル定義
//!
//! StackFlowで使用されるデータモデルを定義します。

mod kind;
mod resource;
mod stack;

// Re-exports
pub use kind::*;
pub use resource::*;
pub use stack::*;
