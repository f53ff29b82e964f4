//! 应用回调
//!
//! 宿主服务器实现 [`ServerHooks`]，决定是否接受每个命令，并负责心跳定时器。

use crate::heartbeat::{HeartbeatDirection, HeartbeatProposal};
use async_trait::async_trait;
use stompix_core::Result;
use stompix_network::{Connection, Frame, Headers};

/// SUBSCRIBE 的确认模式，始终为 `auto`
pub const DEFAULT_ACK_MODE: &str = "auto";

/// CONNECT 回调参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectRequest {
    /// 客户端提出的心跳参数
    pub heartbeat: HeartbeatProposal,
    /// CONNECT 帧的全部头部
    pub headers: Headers,
}

/// SUBSCRIBE 回调参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribeRequest {
    /// `destination` 头
    pub dest: Option<String>,
    /// 确认模式，客户端发来的 `ack` 头不会被采用
    pub ack: &'static str,
    /// `id` 头
    pub id: Option<String>,
}

/// SEND 回调参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendRequest {
    /// `destination` 头
    pub dest: Option<String>,
    /// 完整的 SEND 帧
    pub frame: Frame,
}

/// 宿主服务器回调
///
/// 每个 `on_*` 方法返回 `Ok(true)` 表示接受，`Ok(false)` 表示拒绝；
/// 返回 `Err` 或发生 panic 都视为回调失败。默认实现全部接受。
#[async_trait]
pub trait ServerHooks: Send + Sync {
    /// 客户端连接
    async fn on_client_connected(
        &self,
        _conn: &dyn Connection,
        _request: ConnectRequest,
    ) -> Result<bool> {
        Ok(true)
    }

    /// 客户端断开
    async fn on_disconnect(&self, _conn: &dyn Connection, _receipt: Option<String>) -> Result<bool> {
        Ok(true)
    }

    /// 订阅
    async fn on_subscribe(&self, _conn: &dyn Connection, _request: SubscribeRequest) -> Result<bool> {
        Ok(true)
    }

    /// 取消订阅
    async fn on_unsubscribe(&self, _conn: &dyn Connection, _id: Option<String>) -> Result<bool> {
        Ok(true)
    }

    /// 发送消息
    async fn on_send(&self, _conn: &dyn Connection, _request: SendRequest) -> Result<bool> {
        Ok(true)
    }

    /// 为连接启动心跳定时器
    ///
    /// `Send` 表示按间隔向客户端发送心跳，`Expect` 表示按间隔检测客户端心跳。
    fn activate_heartbeat(
        &self,
        _conn: &dyn Connection,
        _interval_ms: u64,
        _direction: HeartbeatDirection,
    ) {
    }
}

/// 接受所有命令且不启动心跳的回调
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl ServerHooks for AcceptAll {}
