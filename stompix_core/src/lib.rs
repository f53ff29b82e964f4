//! stompix 核心类型
//!
//! 提供错误类型和会话标识。

pub mod connection;
pub mod error;

// 导出主要类型到 crate root
pub use crate::connection::SessionId;
pub use crate::error::{ErrorContext, Result, StompixError, StompixErrorKind};

// 预导出
pub mod prelude {
    pub use crate::connection::SessionId;
    pub use crate::error::{ErrorContext, Result, StompixError, StompixErrorKind};
}
