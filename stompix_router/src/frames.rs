//! 服务端帧构建
//!
//! 构建 CONNECTED、MESSAGE、RECEIPT、ERROR 四种出站帧并通过连接发送。
//! 每个发送方法都返回实际发出的帧。

use crate::heartbeat::NegotiatedHeartbeat;
use stompix_core::{Result, StompixError};
use stompix_network::{Connection, Frame};
use std::fmt;

/// CONNECTED 帧中的协议版本
pub const PROTOCOL_VERSION: &str = "1.1";

const REASON_BEGIN: &str = "--- BEGIN REASON ---";
const REASON_END: &str = "--- END REASON ---";

/// ERROR 帧的描述
///
/// 决定 ERROR 帧的正文，以及是否携带 `receipt-id`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorDescription {
    /// 纯文本，原样作为正文
    Text(String),
    /// 引发错误的帧，正文为帧的文本形式，`receipt` 头会被复制
    Frame(Frame),
    /// 诊断原因，正文包在 REASON 标记之间
    Reason {
        /// 原因字符串
        reason: String,
        /// 关联的回执
        receipt: Option<String>,
    },
}

impl ErrorDescription {
    /// 以诊断原因构建描述
    pub fn reason(reason: impl fmt::Display) -> Self {
        ErrorDescription::Reason {
            reason: reason.to_string(),
            receipt: None,
        }
    }

    /// 描述携带的原因字符串
    pub fn reason_string(&self) -> Option<&str> {
        match self {
            ErrorDescription::Reason { reason, .. } => Some(reason),
            _ => None,
        }
    }

    /// 描述携带的回执
    pub fn receipt(&self) -> Option<&str> {
        match self {
            ErrorDescription::Text(_) => None,
            ErrorDescription::Frame(frame) => frame.header("receipt"),
            ErrorDescription::Reason { receipt, .. } => receipt.as_deref(),
        }
    }

    /// ERROR 帧正文
    pub fn body(&self) -> String {
        match self {
            ErrorDescription::Text(text) => text.clone(),
            ErrorDescription::Frame(frame) => frame.to_string(),
            ErrorDescription::Reason { reason, .. } => {
                format!("{}\n{}\n{}", REASON_BEGIN, reason, REASON_END)
            }
        }
    }
}

impl From<&str> for ErrorDescription {
    fn from(text: &str) -> Self {
        ErrorDescription::Text(text.to_string())
    }
}

impl From<String> for ErrorDescription {
    fn from(text: String) -> Self {
        ErrorDescription::Text(text)
    }
}

/// 缺失的值以空文本表示
impl From<Option<String>> for ErrorDescription {
    fn from(text: Option<String>) -> Self {
        ErrorDescription::Text(text.unwrap_or_default())
    }
}

impl From<Frame> for ErrorDescription {
    fn from(frame: Frame) -> Self {
        ErrorDescription::Frame(frame)
    }
}

impl From<&StompixError> for ErrorDescription {
    fn from(err: &StompixError) -> Self {
        ErrorDescription::reason(err.reason_string())
    }
}

/// 服务端帧
pub struct ServerFrame;

impl ServerFrame {
    /// 构建 CONNECTED 帧
    pub fn connected_frame(session: &str, heartbeat: NegotiatedHeartbeat, server_name: &str) -> Frame {
        Frame::new("CONNECTED")
            .with_header("session", session)
            .with_header("server", server_name)
            .with_header("heart-beat", heartbeat.to_header())
            .with_header("version", PROTOCOL_VERSION)
    }

    /// 构建 MESSAGE 帧，保留全部头部键值和正文
    ///
    /// 头部是有序映射，发出时按键排序，不保留原帧中的到达顺序。
    pub fn message_frame(frame: Frame) -> Frame {
        Frame {
            command: "MESSAGE".to_string(),
            ..frame
        }
    }

    /// 构建 RECEIPT 帧
    pub fn receipt_frame(receipt_id: &str) -> Frame {
        Frame::new("RECEIPT").with_header("receipt-id", receipt_id)
    }

    /// 构建 ERROR 帧
    ///
    /// `content-length` 按正文的 UTF-8 字节数计算，与编解码器写出的单位一致。
    pub fn error_frame(message: &str, description: &ErrorDescription) -> Frame {
        let body = description.body();
        let mut frame = Frame::new("ERROR")
            .with_header("message", message)
            .with_header("content-type", "text/plain")
            .with_header("content-length", body.len().to_string());
        if let Some(receipt) = description.receipt() {
            frame = frame.with_header("receipt-id", receipt);
        }
        frame.with_body(body)
    }

    /// 发送 CONNECTED 帧
    pub async fn connected(
        conn: &dyn Connection,
        heartbeat: NegotiatedHeartbeat,
        server_name: &str,
    ) -> Result<Frame> {
        let frame = Self::connected_frame(conn.session_id().as_str(), heartbeat, server_name);
        Self::emit(conn, frame).await
    }

    /// 发送 MESSAGE 帧
    pub async fn message(conn: &dyn Connection, frame: Frame) -> Result<Frame> {
        Self::emit(conn, Self::message_frame(frame)).await
    }

    /// 发送 RECEIPT 帧
    pub async fn receipt(conn: &dyn Connection, receipt_id: &str) -> Result<Frame> {
        Self::emit(conn, Self::receipt_frame(receipt_id)).await
    }

    /// 发送 ERROR 帧
    pub async fn error(
        conn: &dyn Connection,
        message: &str,
        description: impl Into<ErrorDescription>,
    ) -> Result<Frame> {
        let frame = Self::error_frame(message, &description.into());
        Self::emit(conn, frame).await
    }

    async fn emit(conn: &dyn Connection, frame: Frame) -> Result<Frame> {
        conn.send(frame.clone()).await?;
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stompix_network::ChannelConnection;

    #[test]
    fn test_connected_frame_headers() {
        let heartbeat = NegotiatedHeartbeat {
            send_ms: 8000,
            expect_ms: 0,
        };
        let frame = ServerFrame::connected_frame("sess-1", heartbeat, "edge/1.0");
        assert_eq!(frame.command, "CONNECTED");
        assert_eq!(frame.header("session"), Some("sess-1"));
        assert_eq!(frame.header("server"), Some("edge/1.0"));
        assert_eq!(frame.header("heart-beat"), Some("8000,0"));
        assert_eq!(frame.header("version"), Some("1.1"));
        assert!(frame.body.is_none());
    }

    #[test]
    fn test_message_frame_is_verbatim() {
        let original = Frame::new("SEND")
            .with_header("destination", "/topic/a")
            .with_header("x-custom", "1")
            .with_body("payload");
        let message = ServerFrame::message_frame(original.clone());
        assert_eq!(message.command, "MESSAGE");
        assert_eq!(message.headers, original.headers);
        assert_eq!(message.body, original.body);
    }

    #[test]
    fn test_message_frame_headers_sorted_by_key() {
        let original = Frame::new("SEND")
            .with_header("zeta", "1")
            .with_header("destination", "/topic/a")
            .with_header("alpha", "2");
        let message = ServerFrame::message_frame(original);
        let keys: Vec<&str> = message.headers.keys().map(String::as_str).collect();
        assert_eq!(keys, ["alpha", "destination", "zeta"]);
        assert_eq!(
            message.to_string(),
            "MESSAGE\nalpha:2\ndestination:/topic/a\nzeta:1\n\n"
        );
    }

    #[test]
    fn test_receipt_frame() {
        let frame = ServerFrame::receipt_frame("r-9");
        assert_eq!(frame.command, "RECEIPT");
        assert_eq!(frame.header("receipt-id"), Some("r-9"));
        assert_eq!(frame.headers.len(), 1);
    }

    #[test]
    fn test_error_frame_text_description() {
        let frame = ServerFrame::error_frame("SUBSCRIBE ERROR", &"/queue/a".into());
        assert_eq!(frame.header("message"), Some("SUBSCRIBE ERROR"));
        assert_eq!(frame.header("content-type"), Some("text/plain"));
        assert_eq!(frame.header("content-length"), Some("8"));
        assert_eq!(frame.header("receipt-id"), None);
        assert_eq!(frame.body_text(), "/queue/a");
    }

    #[test]
    fn test_error_frame_reason_markers() {
        let description = ErrorDescription::reason("destination is read-only");
        let frame = ServerFrame::error_frame("Send error", &description);
        let body = frame.body_text();
        assert_eq!(
            body,
            "--- BEGIN REASON ---\ndestination is read-only\n--- END REASON ---"
        );
        assert_eq!(
            frame.header("content-length"),
            Some(body.len().to_string().as_str())
        );
    }

    #[test]
    fn test_error_frame_copies_receipt_from_frame() {
        let request = Frame::new("SEND")
            .with_header("destination", "/queue/a")
            .with_header("receipt", "r-5");
        let frame = ServerFrame::error_frame("Send error", &request.clone().into());
        assert_eq!(frame.header("receipt-id"), Some("r-5"));
        assert_eq!(frame.body_text(), request.to_string());
    }

    #[test]
    fn test_error_frame_reason_with_receipt() {
        let description = ErrorDescription::Reason {
            reason: "nope".to_string(),
            receipt: Some("r-1".to_string()),
        };
        let frame = ServerFrame::error_frame("DISCONNECT ERROR", &description);
        assert_eq!(frame.header("receipt-id"), Some("r-1"));
    }

    #[test]
    fn test_error_frame_content_length_counts_bytes() {
        let frame = ServerFrame::error_frame("SUBSCRIBE ERROR", &"/队列/甲".into());
        // 2 个 ASCII 字节 + 3 个汉字 * 3 字节
        assert_eq!(frame.header("content-length"), Some("11"));
        assert_eq!(frame.body_len(), 11);
    }

    #[test]
    fn test_error_frame_missing_description_is_empty() {
        let frame = ServerFrame::error_frame("UNSUBSCRIBE ERROR", &ErrorDescription::from(None::<String>));
        assert_eq!(frame.header("content-length"), Some("0"));
        assert!(frame.body.is_none());
    }

    #[test]
    fn test_description_from_error() {
        let err = StompixError::callback("SEND", "broker down");
        let description = ErrorDescription::from(&err);
        assert_eq!(description.reason_string(), Some("broker down"));
        assert_eq!(description.receipt(), None);
    }

    #[tokio::test]
    async fn test_send_helpers_emit_frames() {
        let (conn, mut rx) = ChannelConnection::new("sess-1", 8);

        let sent = ServerFrame::receipt(&conn, "r-1").await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), sent);

        let sent = ServerFrame::connected(&conn, NegotiatedHeartbeat::DISABLED, "srv")
            .await
            .unwrap();
        let received = rx.recv().await.unwrap();
        assert_eq!(received, sent);
        assert_eq!(received.header("session"), Some("sess-1"));
        assert_eq!(received.header("heart-beat"), Some("0,0"));

        let sent = ServerFrame::message(&conn, Frame::new("SEND").with_body("x"))
            .await
            .unwrap();
        assert_eq!(rx.recv().await.unwrap().command, "MESSAGE");
        assert_eq!(sent.body_text(), "x");

        let sent = ServerFrame::error(&conn, "CONNECTION ERROR", "CONNECTION ERROR")
            .await
            .unwrap();
        assert_eq!(rx.recv().await.unwrap(), sent);
    }
}
