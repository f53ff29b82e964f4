//! 命令
//!
//! 客户端命令的封闭枚举。未识别的命令保留原名，由分发层决定如何处理。

use std::fmt;

/// 客户端命令
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Command {
    /// CONNECT
    Connect,
    /// DISCONNECT
    Disconnect,
    /// SUBSCRIBE
    Subscribe,
    /// UNSUBSCRIBE
    Unsubscribe,
    /// SEND
    Send,
    /// 其他命令
    Unknown(String),
}

impl Command {
    /// 从命令行解析（区分大小写）
    pub fn parse(name: &str) -> Self {
        match name {
            "CONNECT" => Command::Connect,
            "DISCONNECT" => Command::Disconnect,
            "SUBSCRIBE" => Command::Subscribe,
            "UNSUBSCRIBE" => Command::Unsubscribe,
            "SEND" => Command::Send,
            other => Command::Unknown(other.to_string()),
        }
    }

    /// 线上的命令名
    pub fn as_str(&self) -> &str {
        match self {
            Command::Connect => "CONNECT",
            Command::Disconnect => "DISCONNECT",
            Command::Subscribe => "SUBSCRIBE",
            Command::Unsubscribe => "UNSUBSCRIBE",
            Command::Send => "SEND",
            Command::Unknown(name) => name,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
