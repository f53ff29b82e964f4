//! stompix 统一错误处理
//!
//! 提供核心错误类型和上下文附加机制。

pub mod context;
pub mod framework;

// 重新导出主要类型
pub use context::ErrorContext;
pub use framework::{StompixError, StompixErrorKind};

/// stompix 统一 Result 类型
pub type Result<T> = std::result::Result<T, StompixError>;
