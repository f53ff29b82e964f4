//! 协议模块
//!
//! 帧模型、命令枚举和 STOMP 文本编解码。

pub mod codec;
pub mod command;
pub mod frame;

// 重新导出主要类型
pub use codec::{StompCodec, StompItem};
pub use command::Command;
pub use frame::{Frame, FrameError, Headers};
