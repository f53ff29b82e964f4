//! 连接抽象
//!
//! 分发层只通过 [`Connection`] 发送出站帧；连接的建立、关闭和会话 ID 的生成
//! 都由外部的连接管理层负责。

mod channel;
mod framed;

pub use channel::ChannelConnection;
pub use framed::FramedConnection;

use crate::protocol::{Frame, Headers};
use async_trait::async_trait;
use bytes::Bytes;
use stompix_core::{Result, SessionId};

/// 出站帧发送端
///
/// 实现者负责把帧序列化到底层传输。同一连接上的发送顺序由调用方保证。
#[async_trait]
pub trait Connection: Send + Sync {
    /// 会话 ID
    fn session_id(&self) -> &SessionId;

    /// 发送一个完整帧
    async fn send(&self, frame: Frame) -> Result<()>;

    /// 以命令、头部和可选正文发送
    async fn send_command(
        &self,
        command: &str,
        headers: Headers,
        body: Option<Bytes>,
    ) -> Result<()> {
        let frame = Frame {
            command: command.to_string(),
            headers,
            body,
        };
        self.send(frame).await
    }
}
