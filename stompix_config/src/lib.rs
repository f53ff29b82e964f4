//! 配置管理系统
//!
//! 提供 STOMP 服务端核心所需的配置：服务器名称、心跳能力和帧大小限制，
//! 支持 TOML 文件加载和环境变量覆盖。

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 解析错误
    #[error("解析配置文件失败: {0}")]
    Parse(String),

    /// 验证错误
    #[error("配置验证失败: {0}")]
    Validation(String),

    /// 环境变量错误
    #[error("环境变量解析失败: {0}")]
    EnvVar(String),
}

/// 配置 Result 类型
pub type Result<T> = std::result::Result<T, ConfigError>;

/// 帧大小上限（16MB）
pub const MAX_FRAME_SIZE_LIMIT: usize = 16 * 1024 * 1024;

/// 服务端心跳能力
///
/// `min_incoming_ms` 是服务端期望客户端发送心跳的最小间隔，
/// `min_outgoing_ms` 是服务端向客户端发送心跳的最小间隔。0 表示不支持该方向。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartbeatConfig {
    /// 接收方向最小间隔（毫秒）
    #[serde(default)]
    pub min_incoming_ms: u64,

    /// 发送方向最小间隔（毫秒）
    #[serde(default)]
    pub min_outgoing_ms: u64,
}

impl HeartbeatConfig {
    /// 创建心跳能力配置
    pub fn new(min_incoming_ms: u64, min_outgoing_ms: u64) -> Self {
        Self {
            min_incoming_ms,
            min_outgoing_ms,
        }
    }

    /// 两个方向是否都已关闭
    pub fn is_disabled(&self) -> bool {
        self.min_incoming_ms == 0 && self.min_outgoing_ms == 0
    }

    /// 解析 `"in,out"` 格式
    pub fn parse(raw: &str) -> Option<Self> {
        let (incoming, outgoing) = raw.split_once(',')?;
        Some(Self {
            min_incoming_ms: incoming.trim().parse().ok()?,
            min_outgoing_ms: outgoing.trim().parse().ok()?,
        })
    }
}

/// 服务器配置
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// CONNECTED 帧中 `server` 头的值
    #[serde(default = "default_server_name")]
    pub server_name: String,

    /// 心跳能力
    #[serde(default)]
    pub heartbeat: HeartbeatConfig,

    /// 单帧最大字节数（编解码器使用）
    #[serde(default = "default_max_frame_size")]
    pub max_frame_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_name: default_server_name(),
            heartbeat: HeartbeatConfig::default(),
            max_frame_size: default_max_frame_size(),
        }
    }
}

impl ServerConfig {
    /// 从 TOML 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// 从 TOML 字符串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// 从环境变量加载配置并覆盖
    ///
    /// 支持的环境变量：
    /// - STOMPIX_SERVER_NAME: 服务器名称
    /// - STOMPIX_HEARTBEAT: 心跳能力，格式 `"min_incoming,min_outgoing"`
    /// - STOMPIX_MAX_FRAME_SIZE: 单帧最大字节数
    pub fn load_with_env_override(self) -> Result<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// 使用自定义查找函数覆盖配置
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup("STOMPIX_SERVER_NAME") {
            self.server_name = name;
        }

        if let Some(raw) = lookup("STOMPIX_HEARTBEAT") {
            self.heartbeat = HeartbeatConfig::parse(&raw).ok_or_else(|| {
                ConfigError::EnvVar("STOMPIX_HEARTBEAT 格式必须是 \"in,out\"".to_string())
            })?;
        }

        if let Some(size) = lookup("STOMPIX_MAX_FRAME_SIZE") {
            self.max_frame_size = size.parse().map_err(|_| {
                ConfigError::EnvVar("STOMPIX_MAX_FRAME_SIZE 必须是有效的 usize 数字".to_string())
            })?;
        }

        Ok(self)
    }

    /// 从文件加载并应用环境变量覆盖
    pub fn from_file_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_file(path)?.load_with_env_override()
    }

    /// 验证配置是否有效
    pub fn validate(&self) -> Result<()> {
        if self.server_name.trim().is_empty() {
            return Err(ConfigError::Validation("服务器名称不能为空".to_string()));
        }

        if self.server_name.contains(['\n', '\r']) {
            return Err(ConfigError::Validation("服务器名称不能包含换行符".to_string()));
        }

        if self.max_frame_size == 0 {
            return Err(ConfigError::Validation("最大帧大小不能为 0".to_string()));
        }

        if self.max_frame_size > MAX_FRAME_SIZE_LIMIT {
            return Err(ConfigError::Validation(format!(
                "最大帧大小过大 (应 <= {})",
                MAX_FRAME_SIZE_LIMIT
            )));
        }

        Ok(())
    }

    /// 获取配置摘要信息
    pub fn summary(&self) -> String {
        format!(
            "stompix 服务器配置:\n  名称: {}\n  心跳: in={}ms, out={}ms\n  最大帧: {} 字节",
            self.server_name,
            self.heartbeat.min_incoming_ms,
            self.heartbeat.min_outgoing_ms,
            self.max_frame_size
        )
    }
}

// 默认值函数
fn default_server_name() -> String {
    format!("STOMPIX/{}", env!("CARGO_PKG_VERSION"))
}

fn default_max_frame_size() -> usize {
    MAX_FRAME_SIZE_LIMIT
}
