//! 基于 `FramedWrite` 的连接
//!
//! 直接把帧编码写入任意 `AsyncWrite`，例如 TCP 写半部。

use super::Connection;
use crate::protocol::{Frame, StompCodec, StompItem};
use async_trait::async_trait;
use futures_util::SinkExt;
use stompix_core::{Result, SessionId};
use tokio::io::AsyncWrite;
use tokio::sync::Mutex;
use tokio_util::codec::FramedWrite;

/// 基于 `FramedWrite` 的连接
///
/// 写端由异步互斥锁保护，多个任务可以共享同一连接发送帧。
pub struct FramedConnection<W> {
    session_id: SessionId,
    sink: Mutex<FramedWrite<W, StompCodec>>,
}

impl<W> FramedConnection<W>
where
    W: AsyncWrite + Unpin + Send,
{
    /// 创建新的连接
    pub fn new(session_id: impl Into<SessionId>, writer: W, codec: StompCodec) -> Self {
        Self {
            session_id: session_id.into(),
            sink: Mutex::new(FramedWrite::new(writer, codec)),
        }
    }

    /// 发送一个心跳（单独的换行）
    pub async fn send_heartbeat(&self) -> Result<()> {
        self.sink.lock().await.send(StompItem::Heartbeat).await?;
        Ok(())
    }

    /// 取回底层写端
    pub fn into_inner(self) -> W {
        self.sink.into_inner().into_inner()
    }
}

#[async_trait]
impl<W> Connection for FramedConnection<W>
where
    W: AsyncWrite + Unpin + Send,
{
    fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    async fn send(&self, frame: Frame) -> Result<()> {
        self.sink.lock().await.send(StompItem::Frame(frame)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;
    use stompix_core::StompixErrorKind;
    use tokio_util::codec::Decoder;

    #[tokio::test]
    async fn test_send_writes_encoded_frame() {
        let conn = FramedConnection::new("sess-1", Vec::new(), StompCodec::new());

        conn.send(Frame::new("RECEIPT").with_header("receipt-id", "r-7"))
            .await
            .unwrap();
        conn.send_heartbeat().await.unwrap();

        let written = conn.into_inner();
        assert_eq!(&written[..], b"RECEIPT\nreceipt-id:r-7\n\n\0\n");
    }

    #[tokio::test]
    async fn test_written_bytes_decode_back() {
        let conn = FramedConnection::new("sess-1", Vec::new(), StompCodec::new());
        let frame = Frame::new("MESSAGE")
            .with_header("destination", "/topic/a")
            .with_body("payload");
        conn.send(frame.clone()).await.unwrap();

        let mut buf = BytesMut::from(&conn.into_inner()[..]);
        let decoded = StompCodec::new().decode(&mut buf).unwrap();
        assert_eq!(decoded, Some(StompItem::Frame(frame)));
    }

    #[tokio::test]
    async fn test_send_oversized_frame_fails() {
        let conn = FramedConnection::new("sess-1", Vec::new(), StompCodec::with_max_frame_size(8));
        let err = conn
            .send(Frame::new("MESSAGE").with_body("0123456789"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), StompixErrorKind::Codec);
    }
}
