//! stompix 网络层
//!
//! 提供帧模型、STOMP 文本编解码器，以及分发层用来发送出站帧的连接抽象。

pub mod connection;
pub mod protocol;

// 导出主要类型到 crate root
pub use crate::connection::{ChannelConnection, Connection, FramedConnection};
pub use crate::protocol::{Command, Frame, FrameError, Headers, StompCodec, StompItem};
// 重新导出 stompix_core 的错误类型
pub use stompix_core::{Result, SessionId, StompixError};

// 预导出
pub mod prelude {
    pub use crate::connection::{ChannelConnection, Connection, FramedConnection};
    pub use crate::protocol::{Command, Frame, Headers, StompCodec, StompItem};
    pub use stompix_core::{Result, SessionId, StompixError};
}
