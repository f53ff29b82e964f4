//! stompix 核心错误类型
//!
//! 定义分发层、编解码层和连接层共用的错误类型。

use super::context::ErrorContext;
use std::io;
use thiserror::Error;

/// stompix 核心错误类型
#[derive(Error, Debug)]
pub enum StompixError {
    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] io::Error),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 协议错误
    #[error("协议错误: {0}")]
    Protocol(String),

    /// 编解码错误
    #[error("编解码错误: {0}")]
    Codec(String),

    /// 连接错误（发送端已关闭等）
    #[error("连接错误: {0}")]
    Connection(String),

    /// 应用回调失败（返回错误或发生 panic）
    #[error("{command} 回调失败: {reason}")]
    Callback {
        /// 触发回调的命令
        command: String,
        /// 失败原因
        reason: String,
    },

    /// 不支持的命令
    #[error("不支持的命令: {0}")]
    UnknownCommand(String),

    /// 带上下文的错误
    #[error("{0} ({1})")]
    WithContext(#[source] Box<StompixError>, ErrorContext),
}

impl StompixError {
    /// 获取错误类型
    pub fn kind(&self) -> StompixErrorKind {
        match self {
            StompixError::Io(_) => StompixErrorKind::Io,
            StompixError::Config(_) => StompixErrorKind::Config,
            StompixError::Protocol(_) => StompixErrorKind::Protocol,
            StompixError::Codec(_) => StompixErrorKind::Codec,
            StompixError::Connection(_) => StompixErrorKind::Connection,
            StompixError::Callback { .. } => StompixErrorKind::Callback,
            StompixError::UnknownCommand(_) => StompixErrorKind::UnknownCommand,
            StompixError::WithContext(inner, _) => inner.kind(),
        }
    }

    /// 添加上下文信息
    pub fn with_context<C>(self, context: C) -> Self
    where
        C: Into<ErrorContext>,
    {
        StompixError::WithContext(Box::new(self), context.into())
    }

    /// 诊断用的原因字符串，用于 ERROR 帧正文
    pub fn reason_string(&self) -> String {
        match self {
            StompixError::Callback { reason, .. } => reason.clone(),
            StompixError::WithContext(inner, ctx) => {
                format!("{}\n{}", inner.reason_string(), ctx)
            }
            other => other.to_string(),
        }
    }

    /// 创建配置错误
    pub fn config(msg: impl Into<String>) -> Self {
        StompixError::Config(msg.into())
    }

    /// 创建协议错误
    pub fn protocol(msg: impl Into<String>) -> Self {
        StompixError::Protocol(msg.into())
    }

    /// 创建编解码错误
    pub fn codec(msg: impl Into<String>) -> Self {
        StompixError::Codec(msg.into())
    }

    /// 创建连接错误
    pub fn connection(msg: impl Into<String>) -> Self {
        StompixError::Connection(msg.into())
    }

    /// 创建回调错误
    pub fn callback(command: impl Into<String>, reason: impl Into<String>) -> Self {
        StompixError::Callback {
            command: command.into(),
            reason: reason.into(),
        }
    }

    /// 创建不支持命令错误
    pub fn unknown_command(command: impl Into<String>) -> Self {
        StompixError::UnknownCommand(command.into())
    }
}

/// 错误类型分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StompixErrorKind {
    /// IO 错误
    Io,
    /// 配置错误
    Config,
    /// 协议错误
    Protocol,
    /// 编解码错误
    Codec,
    /// 连接错误
    Connection,
    /// 回调错误
    Callback,
    /// 不支持的命令
    UnknownCommand,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = StompixError::config("test error");
        assert!(matches!(err, StompixError::Config(_)));
        assert_eq!(err.kind(), StompixErrorKind::Config);
    }

    #[test]
    fn test_error_with_context_keeps_kind() {
        let err = StompixError::connection("receiver dropped").with_context(("session", "abc"));
        assert!(matches!(err, StompixError::WithContext(_, _)));
        assert_eq!(err.kind(), StompixErrorKind::Connection);
        assert_eq!(err.to_string(), "连接错误: receiver dropped (session: abc)");
    }

    #[test]
    fn test_callback_error_display() {
        let err = StompixError::callback("SUBSCRIBE", "boom");
        assert_eq!(err.to_string(), "SUBSCRIBE 回调失败: boom");
        assert_eq!(err.reason_string(), "boom");
        assert_eq!(err.kind(), StompixErrorKind::Callback);
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(StompixError::protocol("").kind(), StompixErrorKind::Protocol);
        assert_eq!(StompixError::codec("").kind(), StompixErrorKind::Codec);
        assert_eq!(
            StompixError::unknown_command("NACK").kind(),
            StompixErrorKind::UnknownCommand
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed");
        let err: StompixError = io_err.into();
        assert_eq!(err.kind(), StompixErrorKind::Io);
    }
}
