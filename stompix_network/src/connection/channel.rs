//! 基于通道的连接
//!
//! 出站帧写入 `mpsc` 通道，由持有接收端的任务负责真正的写出。

use super::Connection;
use crate::protocol::Frame;
use async_trait::async_trait;
use stompix_core::{ErrorContext, Result, SessionId, StompixError};
use tokio::sync::mpsc;

/// 基于通道的连接
#[derive(Debug, Clone)]
pub struct ChannelConnection {
    session_id: SessionId,
    tx: mpsc::Sender<Frame>,
}

impl ChannelConnection {
    /// 创建新的连接，同时返回出站帧的接收端
    pub fn new(session_id: impl Into<SessionId>, capacity: usize) -> (Self, mpsc::Receiver<Frame>) {
        let (tx, rx) = mpsc::channel(capacity);
        let conn = Self {
            session_id: session_id.into(),
            tx,
        };
        (conn, rx)
    }

    /// 接收端是否已关闭
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[async_trait]
impl Connection for ChannelConnection {
    fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    async fn send(&self, frame: Frame) -> Result<()> {
        self.tx.send(frame).await.map_err(|_| {
            StompixError::connection("出站通道已关闭")
                .with_context(ErrorContext::session(self.session_id.as_str()))
        })
    }
}
