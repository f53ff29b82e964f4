//! 命令分发
//!
//! 按命令把入站帧交给对应的应用回调，再根据回调结果发出响应帧。
//! 分发器本身无状态，配置和回调都是只读共享的，同一个分发器可以在多个
//! 任务间共享。同一连接上帧的顺序由调用方保证。

use crate::callback::{self, CallbackOutcome};
use crate::frames::ServerFrame;
use crate::heartbeat::{HeartbeatProposal, ServerCapability, negotiate};
use crate::hooks::{ConnectRequest, DEFAULT_ACK_MODE, SendRequest, ServerHooks, SubscribeRequest};
use std::sync::Arc;
use stompix_config::ServerConfig;
use stompix_core::{Result, StompixError};
use stompix_network::{Command, Connection, Frame};
use tracing::{debug, error, info, warn};

/// 命令分发器
pub struct Dispatcher<H> {
    config: ServerConfig,
    capability: ServerCapability,
    hooks: Arc<H>,
}

impl<H: ServerHooks> Dispatcher<H> {
    /// 创建分发器
    pub fn new(config: ServerConfig, hooks: Arc<H>) -> Self {
        let capability = ServerCapability::from(config.heartbeat);
        Self {
            config,
            capability,
            hooks,
        }
    }

    /// 服务器配置
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// 服务端心跳能力
    pub fn capability(&self) -> ServerCapability {
        self.capability
    }

    /// 应用回调
    pub fn hooks(&self) -> &Arc<H> {
        &self.hooks
    }

    /// 分发一个入站帧
    ///
    /// 返回本次发出的响应帧（如有）。回调失败或命令未知时返回错误，且不发出任何帧。
    pub async fn dispatch(&self, conn: &dyn Connection, frame: Frame) -> Result<Option<Frame>> {
        let command = frame.kind();
        debug!(session = %conn.session_id(), command = %command, "分发命令");

        let result = match &command {
            Command::Connect => self.connect(conn, frame).await,
            Command::Disconnect => self.disconnect(conn, frame).await,
            Command::Subscribe => self.subscribe(conn, frame).await,
            Command::Unsubscribe => self.unsubscribe(conn, frame).await,
            Command::Send => self.send(conn, frame).await,
            Command::Unknown(name) => {
                warn!(session = %conn.session_id(), command = %name, "未知命令");
                return Err(StompixError::unknown_command(name.as_str()));
            }
        };

        if let Err(err) = &result {
            error!(session = %conn.session_id(), command = %command, error = %err, "命令处理失败");
        }
        result
    }

    async fn connect(&self, conn: &dyn Connection, frame: Frame) -> Result<Option<Frame>> {
        let heartbeat = HeartbeatProposal::parse(frame.header("heart-beat"));
        let negotiated = negotiate(heartbeat, self.capability);

        // 定时器在回调返回前启动，连接被拒绝时也已生效
        if let Some((interval_ms, direction)) = negotiated.active() {
            info!(
                session = %conn.session_id(),
                interval_ms,
                direction = %direction,
                "心跳协商完成"
            );
            self.hooks.activate_heartbeat(conn, interval_ms, direction);
        }

        let request = ConnectRequest {
            heartbeat,
            headers: frame.headers,
        };
        let outcome =
            callback::invoke(&Command::Connect, || self.hooks.on_client_connected(conn, request)).await;

        if accepted(conn, &Command::Connect, outcome)? {
            ServerFrame::connected(conn, negotiated, &self.config.server_name)
                .await
                .map(Some)
        } else {
            ServerFrame::error(conn, "CONNECTION ERROR", "CONNECTION ERROR")
                .await
                .map(Some)
        }
    }

    async fn disconnect(&self, conn: &dyn Connection, frame: Frame) -> Result<Option<Frame>> {
        let receipt = frame.header_owned("receipt");
        let outcome = callback::invoke(&Command::Disconnect, || {
            self.hooks.on_disconnect(conn, receipt.clone())
        })
        .await;

        if accepted(conn, &Command::Disconnect, outcome)? {
            receipt_if_requested(conn, receipt.as_deref()).await
        } else {
            ServerFrame::error(conn, "DISCONNECT ERROR", receipt)
                .await
                .map(Some)
        }
    }

    async fn subscribe(&self, conn: &dyn Connection, frame: Frame) -> Result<Option<Frame>> {
        let dest = frame.header_owned("destination");
        let request = SubscribeRequest {
            dest: dest.clone(),
            ack: DEFAULT_ACK_MODE,
            id: frame.header_owned("id"),
        };
        let outcome =
            callback::invoke(&Command::Subscribe, || self.hooks.on_subscribe(conn, request)).await;

        if accepted(conn, &Command::Subscribe, outcome)? {
            Ok(None)
        } else {
            ServerFrame::error(conn, "SUBSCRIBE ERROR", dest).await.map(Some)
        }
    }

    async fn unsubscribe(&self, conn: &dyn Connection, frame: Frame) -> Result<Option<Frame>> {
        let id = frame.header_owned("id");
        let outcome = callback::invoke(&Command::Unsubscribe, || {
            self.hooks.on_unsubscribe(conn, id.clone())
        })
        .await;

        if accepted(conn, &Command::Unsubscribe, outcome)? {
            Ok(None)
        } else {
            ServerFrame::error(conn, "UNSUBSCRIBE ERROR", id).await.map(Some)
        }
    }

    async fn send(&self, conn: &dyn Connection, frame: Frame) -> Result<Option<Frame>> {
        let receipt = frame.header_owned("receipt");
        let request = SendRequest {
            dest: frame.header_owned("destination"),
            frame: frame.clone(),
        };
        let outcome = callback::invoke(&Command::Send, || self.hooks.on_send(conn, request)).await;

        if accepted(conn, &Command::Send, outcome)? {
            receipt_if_requested(conn, receipt.as_deref()).await
        } else {
            ServerFrame::error(conn, "Send error", frame).await.map(Some)
        }
    }
}

/// 回调是否接受，回调失败时返回错误
fn accepted(conn: &dyn Connection, command: &Command, outcome: CallbackOutcome) -> Result<bool> {
    let accepted = outcome.into_result()?;
    if !accepted {
        warn!(session = %conn.session_id(), command = %command, "命令被拒绝");
    }
    Ok(accepted)
}

/// 请求带 `receipt` 头时发出 RECEIPT，否则不发帧
async fn receipt_if_requested(conn: &dyn Connection, receipt: Option<&str>) -> Result<Option<Frame>> {
    match receipt {
        Some(receipt_id) => ServerFrame::receipt(conn, receipt_id).await.map(Some),
        None => Ok(None),
    }
}
