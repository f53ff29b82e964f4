//! 协议帧
//!
//! 定义 STOMP 帧的内存表示：命令、头部映射和可选正文。

use crate::protocol::command::Command;
use bytes::Bytes;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use stompix_core::StompixError;

/// 帧头部
///
/// 键在一帧内唯一，按键排序输出。
pub type Headers = BTreeMap<String, String>;

/// STOMP 帧
///
/// ```text
/// COMMAND
/// key:value
/// key:value
///
/// body^@
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    /// 命令名
    pub command: String,
    /// 头部
    pub headers: Headers,
    /// 正文
    pub body: Option<Bytes>,
}

impl Frame {
    /// 创建无头部、无正文的帧
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            headers: Headers::new(),
            body: None,
        }
    }

    /// 添加一个头部（同名头部会被覆盖）
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// 替换全部头部
    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    /// 设置正文，空正文视为无正文
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        self.body = (!body.is_empty()).then_some(body);
        self
    }

    /// 读取头部
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(String::as_str)
    }

    /// 读取头部并拷贝为 `String`
    pub fn header_owned(&self, key: &str) -> Option<String> {
        self.headers.get(key).cloned()
    }

    /// 解析后的命令
    pub fn kind(&self) -> Command {
        Command::parse(&self.command)
    }

    /// 正文字节数
    pub fn body_len(&self) -> usize {
        self.body.as_ref().map_or(0, Bytes::len)
    }

    /// 正文的文本形式（非 UTF-8 字节会被替换）
    pub fn body_text(&self) -> Cow<'_, str> {
        match &self.body {
            Some(body) => String::from_utf8_lossy(body),
            None => Cow::Borrowed(""),
        }
    }

    /// 编码后的大致字节数（不含转义）
    pub fn encoded_len(&self) -> usize {
        let headers: usize = self
            .headers
            .iter()
            .map(|(k, v)| k.len() + v.len() + 2)
            .sum();
        self.command.len() + 1 + headers + 1 + self.body_len() + 1
    }

    /// 检查帧是否可以被编码
    pub fn validate(&self, max_frame_size: usize) -> Result<(), FrameError> {
        if self.command.is_empty() {
            return Err(FrameError::InvalidFormat("命令为空".to_string()));
        }
        if self.command.contains(['\n', '\r', ':']) {
            return Err(FrameError::InvalidFormat(format!(
                "命令包含非法字符: {:?}",
                self.command
            )));
        }
        let size = self.encoded_len();
        if size > max_frame_size {
            return Err(FrameError::FrameTooLarge(size));
        }
        Ok(())
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.command)?;
        for (key, value) in &self.headers {
            writeln!(f, "{}:{}", key, value)?;
        }
        writeln!(f)?;
        f.write_str(&self.body_text())
    }
}

/// 帧错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// 帧过大
    FrameTooLarge(usize),
    /// 无效的帧格式
    InvalidFormat(String),
    /// IO 错误
    Io(String),
}

impl From<std::io::Error> for FrameError {
    fn from(err: std::io::Error) -> Self {
        FrameError::Io(err.to_string())
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FrameTooLarge(size) => write!(f, "帧过大: {} 字节", size),
            Self::InvalidFormat(msg) => write!(f, "无效的帧格式: {}", msg),
            Self::Io(msg) => write!(f, "IO 错误: {}", msg),
        }
    }
}

impl std::error::Error for FrameError {}

impl From<FrameError> for StompixError {
    fn from(err: FrameError) -> Self {
        StompixError::codec(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_builder() {
        let frame = Frame::new("SEND")
            .with_header("destination", "/queue/a")
            .with_header("receipt", "r-1")
            .with_body("hello");
        assert_eq!(frame.command, "SEND");
        assert_eq!(frame.header("destination"), Some("/queue/a"));
        assert_eq!(frame.header_owned("receipt"), Some("r-1".to_string()));
        assert_eq!(frame.header("id"), None);
        assert_eq!(frame.body_text(), "hello");
        assert_eq!(frame.kind(), Command::Send);
    }

    #[test]
    fn test_empty_body_is_none() {
        let frame = Frame::new("SEND").with_body(Bytes::new());
        assert!(frame.body.is_none());
        assert_eq!(frame.body_len(), 0);
        assert_eq!(frame.body_text(), "");
    }

    #[test]
    fn test_header_keys_unique() {
        let frame = Frame::new("SEND")
            .with_header("destination", "/queue/a")
            .with_header("destination", "/queue/b");
        assert_eq!(frame.headers.len(), 1);
        assert_eq!(frame.header("destination"), Some("/queue/b"));
    }

    #[test]
    fn test_frame_display() {
        let frame = Frame::new("SEND")
            .with_header("destination", "/queue/a")
            .with_body("hi");
        assert_eq!(frame.to_string(), "SEND\ndestination:/queue/a\n\nhi");
    }

    #[test]
    fn test_frame_validate() {
        assert!(Frame::new("SEND").validate(1024).is_ok());
        assert!(Frame::new("").validate(1024).is_err());
        assert!(Frame::new("SE\nND").validate(1024).is_err());

        let big = Frame::new("SEND").with_body(vec![b'x'; 64]);
        assert_eq!(
            big.validate(32),
            Err(FrameError::FrameTooLarge(big.encoded_len()))
        );
    }

    #[test]
    fn test_frame_error_into_stompix_error() {
        let err: StompixError = FrameError::FrameTooLarge(10).into();
        assert_eq!(err.kind(), stompix_core::StompixErrorKind::Codec);
    }
}
