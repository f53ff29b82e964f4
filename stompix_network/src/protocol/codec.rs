//! STOMP 文本编解码器
//!
//! 提供流式帧的编解码功能，兼容 `tokio_util::codec::Framed`。

use crate::protocol::frame::{Frame, FrameError, Headers};
use bytes::{BufMut, Bytes, BytesMut};
use stompix_config::ServerConfig;
use tokio_util::codec::{Decoder, Encoder};
use tracing::trace;

/// 编解码单元：一个完整帧或一个心跳（单独的换行）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StompItem {
    /// 完整帧
    Frame(Frame),
    /// 心跳
    Heartbeat,
}

impl From<Frame> for StompItem {
    fn from(frame: Frame) -> Self {
        StompItem::Frame(frame)
    }
}

/// STOMP 编解码器
///
/// 无状态：解码时未消费完整帧之前不会修改缓冲区。
#[derive(Debug, Clone)]
pub struct StompCodec {
    max_frame_size: usize,
}

impl StompCodec {
    /// 默认最大帧大小（16MB）
    pub const DEFAULT_MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

    /// 创建新的编解码器
    pub fn new() -> Self {
        Self {
            max_frame_size: Self::DEFAULT_MAX_FRAME_SIZE,
        }
    }

    /// 指定最大帧大小
    pub fn with_max_frame_size(max_frame_size: usize) -> Self {
        Self { max_frame_size }
    }

    /// 按服务器配置创建
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::with_max_frame_size(config.max_frame_size)
    }

    /// 最大帧大小
    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    fn check_size(&self, size: usize) -> Result<(), FrameError> {
        if size > self.max_frame_size {
            return Err(FrameError::FrameTooLarge(size));
        }
        Ok(())
    }
}

impl Default for StompCodec {
    fn default() -> Self {
        Self::new()
    }
}

/// CONNECT / CONNECTED 帧的头部不做转义
fn escapes_headers(command: &str) -> bool {
    !matches!(command, "CONNECT" | "CONNECTED")
}

fn escape_into(dst: &mut BytesMut, value: &str) {
    for byte in value.bytes() {
        match byte {
            b'\\' => dst.put_slice(b"\\\\"),
            b'\n' => dst.put_slice(b"\\n"),
            b'\r' => dst.put_slice(b"\\r"),
            b':' => dst.put_slice(b"\\c"),
            other => dst.put_u8(other),
        }
    }
}

fn unescape(raw: &str) -> Result<String, FrameError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('c') => out.push(':'),
            other => {
                return Err(FrameError::InvalidFormat(format!(
                    "未定义的转义序列: \\{}",
                    other.map(String::from).unwrap_or_default()
                )));
            }
        }
    }
    Ok(out)
}

fn utf8(bytes: &[u8], what: &str) -> Result<String, FrameError> {
    String::from_utf8(bytes.to_vec())
        .map_err(|_| FrameError::InvalidFormat(format!("{} 不是有效的 UTF-8", what)))
}

/// 去掉行尾的 `\r`
fn trim_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// 头部区域解析结果：命令、头部、正文起始偏移
struct Head {
    command: String,
    headers: Headers,
    body_start: usize,
}

/// 解析命令行和头部，数据不完整时返回 `None`
fn parse_head(src: &[u8]) -> Result<Option<Head>, FrameError> {
    let mut pos = 0;
    let mut command: Option<String> = None;
    let mut headers = Headers::new();

    loop {
        let Some(offset) = src[pos..].iter().position(|b| *b == b'\n') else {
            return Ok(None);
        };
        let line = trim_cr(&src[pos..pos + offset]);
        pos += offset + 1;

        let Some(cmd) = command.as_deref() else {
            command = Some(utf8(line, "命令")?);
            continue;
        };

        if line.is_empty() {
            return Ok(Some(Head {
                command: cmd.to_string(),
                headers,
                body_start: pos,
            }));
        }

        let line = utf8(line, "头部")?;
        let Some((key, value)) = line.split_once(':') else {
            return Err(FrameError::InvalidFormat(format!("头部缺少冒号: {}", line)));
        };
        let (key, value) = if escapes_headers(cmd) {
            (unescape(key)?, unescape(value)?)
        } else {
            (key.to_string(), value.to_string())
        };
        // 重复的头部以第一次出现为准
        headers.entry(key).or_insert(value);
    }
}

impl Decoder for StompCodec {
    type Item = StompItem;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match src.first().copied() {
            None => return Ok(None),
            Some(b'\n') => {
                let _ = src.split_to(1);
                trace!("收到心跳");
                return Ok(Some(StompItem::Heartbeat));
            }
            Some(b'\r') => {
                if src.len() < 2 {
                    return Ok(None);
                }
                if src[1] == b'\n' {
                    let _ = src.split_to(2);
                    trace!("收到心跳");
                    return Ok(Some(StompItem::Heartbeat));
                }
            }
            Some(_) => {}
        }

        let Some(head) = parse_head(src)? else {
            self.check_size(src.len())?;
            return Ok(None);
        };

        if head.command.is_empty() {
            return Err(FrameError::InvalidFormat("命令为空".to_string()));
        }

        let content_length = match head.headers.get("content-length") {
            Some(raw) => Some(raw.trim().parse::<usize>().map_err(|_| {
                FrameError::InvalidFormat(format!("content-length 无效: {}", raw))
            })?),
            None => None,
        };

        let body_end = match content_length {
            Some(len) => {
                // content-length 来自对端，先做溢出和大小检查再切片
                let end = head
                    .body_start
                    .checked_add(len)
                    .filter(|end| *end < usize::MAX)
                    .ok_or(FrameError::FrameTooLarge(len))?;
                self.check_size(end + 1)?;
                if src.len() <= end {
                    return Ok(None);
                }
                if src[end] != 0 {
                    return Err(FrameError::InvalidFormat(
                        "正文结尾缺少 NUL 终止符".to_string(),
                    ));
                }
                end
            }
            None => match src[head.body_start..].iter().position(|b| *b == 0) {
                Some(offset) => head.body_start + offset,
                None => {
                    self.check_size(src.len())?;
                    return Ok(None);
                }
            },
        };
        self.check_size(body_end + 1)?;

        let mut raw = src.split_to(body_end + 1);
        let body: Bytes = raw
            .split_off(head.body_start)
            .freeze()
            .slice(..body_end - head.body_start);

        let frame = Frame::new(head.command)
            .with_headers(head.headers)
            .with_body(body);
        trace!(command = %frame.command, body_len = frame.body_len(), "解码帧");
        Ok(Some(StompItem::Frame(frame)))
    }
}

impl Encoder<Frame> for StompCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        item.validate(self.max_frame_size)?;

        dst.reserve(item.encoded_len());
        dst.put_slice(item.command.as_bytes());
        dst.put_u8(b'\n');

        let escape = escapes_headers(&item.command);
        for (key, value) in &item.headers {
            if escape {
                escape_into(dst, key);
                dst.put_u8(b':');
                escape_into(dst, value);
            } else {
                dst.put_slice(key.as_bytes());
                dst.put_u8(b':');
                dst.put_slice(value.as_bytes());
            }
            dst.put_u8(b'\n');
        }
        dst.put_u8(b'\n');

        if let Some(body) = &item.body {
            dst.put_slice(body);
        }
        dst.put_u8(0);

        Ok(())
    }
}

impl Encoder<StompItem> for StompCodec {
    type Error = FrameError;

    fn encode(&mut self, item: StompItem, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            StompItem::Frame(frame) => Encoder::<Frame>::encode(self, frame, dst),
            StompItem::Heartbeat => {
                dst.put_u8(b'\n');
                Ok(())
            }
        }
    }
}
