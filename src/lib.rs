//! # stompix - STOMP 服务端命令分发与帧构建核心
//!
//! stompix 接收已解码的 STOMP 入站帧，按命令路由到应用回调，在连接建立时协商
//! 心跳，并构建 CONNECTED、MESSAGE、RECEIPT、ERROR 等响应帧。
//!
//! 订阅存储、消息转发和 socket 生命周期都不在这里，由宿主服务器负责。
//!
//! ## 快速开始
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use stompix::prelude::*;
//!
//! struct Broker;
//!
//! #[stompix::async_trait]
//! impl ServerHooks for Broker {
//!     async fn on_subscribe(&self, _conn: &dyn Connection, request: SubscribeRequest) -> stompix::StompixResult<bool> {
//!         Ok(request.dest.as_deref().is_some_and(|dest| dest.starts_with("/topic/")))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> stompix::Result<()> {
//!     let dispatcher = Dispatcher::new(ServerConfig::default(), Arc::new(Broker));
//!     let (conn, mut outbound) = ChannelConnection::new("sess-1", 16);
//!
//!     let frame = Frame::new("SUBSCRIBE").with_header("destination", "/queue/a");
//!     dispatcher.dispatch(&conn, frame).await?;
//!
//!     let reply = outbound.recv().await;
//!     println!("{:?}", reply);
//!     Ok(())
//! }
//! ```
//!
//! ## 模块组织
//!
//! ### 配置模块
//! - ServerConfig - 服务器名称、心跳能力、帧大小上限
//! - HeartbeatConfig - 服务端心跳能力
//!
//! ### 核心模块
//! - StompixError - 框架错误
//! - SessionId - 会话标识
//!
//! ### 网络模块
//! - Frame - STOMP 帧
//! - StompCodec - STOMP 文本编解码器
//! - Connection - 出站帧发送端
//!
//! ### 分发模块
//! - Dispatcher - 命令分发器
//! - ServerHooks - 应用回调
//! - ServerFrame - 服务端帧构建

// ============================================================================
// Crate Re-exports (for advanced users)
// ============================================================================

pub use stompix_config;
pub use stompix_core;
pub use stompix_network;
pub use stompix_router;

pub use async_trait::async_trait;

pub use stompix_config::{HeartbeatConfig, ServerConfig};
pub use stompix_core::{Result as StompixResult, SessionId, StompixError, StompixErrorKind};
pub use stompix_network::{
    ChannelConnection, Command, Connection, Frame, FramedConnection, Headers, StompCodec,
    StompItem,
};
pub use stompix_router::{
    AcceptAll, Dispatcher, ErrorDescription, HeartbeatDirection, NegotiatedHeartbeat, ServerFrame,
    ServerHooks,
};

// ============================================================================
// Prelude Module
// ============================================================================

/// 预导出常用类型
///
/// 通过 `use stompix::prelude::*;` 导入所有常用类型
pub mod prelude {
    pub use stompix_config::{ConfigError, HeartbeatConfig, ServerConfig};
    pub use stompix_network::prelude::*;
    pub use stompix_router::prelude::*;
}

// ============================================================================
// Error Types
// ============================================================================

/// stompix 统一 Result 类型
pub type Result<T> = std::result::Result<T, Error>;

/// stompix 统一错误枚举
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// 核心错误
    #[error(transparent)]
    Core(#[from] stompix_core::StompixError),

    /// 配置错误
    #[error(transparent)]
    Config(#[from] stompix_config::ConfigError),

    /// 帧编解码错误
    #[error(transparent)]
    Frame(#[from] stompix_network::FrameError),

    /// IO 错误
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// 自定义错误
    #[error("{0}")]
    Custom(String),
}

// ============================================================================
// Version Information
// ============================================================================

/// stompix 版本号
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// stompix 包名
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_from_parts() {
        let err: Error = StompixError::unknown_command("NACK").into();
        assert!(matches!(err, Error::Core(_)));

        let err: Error = stompix_network::FrameError::FrameTooLarge(10).into();
        assert!(matches!(err, Error::Frame(_)));

        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        assert!(matches!(Error::from(io), Error::Io(_)));
    }

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "stompix");
    }
}
