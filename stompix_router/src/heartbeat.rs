//! 心跳协商
//!
//! 根据客户端 CONNECT 帧中的 `heart-beat` 头和服务端配置的能力，选出唯一一个
//! 生效的心跳方向及间隔。优先选择客户端到服务端方向。
//!
//! 两个方向不会同时生效，这是有意的简化，不是通用的双向协商。

use std::fmt;
use stompix_config::HeartbeatConfig;

/// 客户端提出的心跳参数 `(outgoing, incoming)`，单位毫秒，0 表示关闭
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeartbeatProposal {
    /// 客户端发送心跳的间隔
    pub outgoing_ms: u64,
    /// 客户端期望收到心跳的间隔
    pub incoming_ms: u64,
}

impl HeartbeatProposal {
    /// 两个方向都关闭
    pub const DISABLED: Self = Self {
        outgoing_ms: 0,
        incoming_ms: 0,
    };

    /// 创建心跳参数
    pub fn new(outgoing_ms: u64, incoming_ms: u64) -> Self {
        Self {
            outgoing_ms,
            incoming_ms,
        }
    }

    /// 解析 `heart-beat` 头
    ///
    /// 头缺失时为 `(0, 0)`；任一侧缺失或无法解析时该侧视为 0。
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::DISABLED;
        };
        let mut parts = raw.split(',').map(|part| part.trim().parse::<u64>().unwrap_or(0));
        Self {
            outgoing_ms: parts.next().unwrap_or(0),
            incoming_ms: parts.next().unwrap_or(0),
        }
    }
}

/// 服务端心跳能力 `(min_incoming, min_outgoing)`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServerCapability {
    /// 服务端接收心跳的最小间隔
    pub min_incoming_ms: u64,
    /// 服务端发送心跳的最小间隔
    pub min_outgoing_ms: u64,
}

impl ServerCapability {
    /// 创建服务端能力
    pub fn new(min_incoming_ms: u64, min_outgoing_ms: u64) -> Self {
        Self {
            min_incoming_ms,
            min_outgoing_ms,
        }
    }
}

impl From<HeartbeatConfig> for ServerCapability {
    fn from(config: HeartbeatConfig) -> Self {
        Self::new(config.min_incoming_ms, config.min_outgoing_ms)
    }
}

/// 生效的心跳方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeartbeatDirection {
    /// 服务端定期向客户端发送心跳
    Send,
    /// 服务端监测客户端发来的心跳
    Expect,
}

impl fmt::Display for HeartbeatDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeartbeatDirection::Send => f.write_str("send"),
            HeartbeatDirection::Expect => f.write_str("expect"),
        }
    }
}

/// 协商结果 `(send, expect)`，最多一个非 0
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NegotiatedHeartbeat {
    /// 服务端发送心跳的间隔
    pub send_ms: u64,
    /// 服务端期望收到心跳的间隔
    pub expect_ms: u64,
}

impl NegotiatedHeartbeat {
    /// 心跳关闭
    pub const DISABLED: Self = Self {
        send_ms: 0,
        expect_ms: 0,
    };

    /// 生效的间隔和方向，心跳关闭时为 `None`
    pub fn active(&self) -> Option<(u64, HeartbeatDirection)> {
        if self.expect_ms > 0 {
            Some((self.expect_ms, HeartbeatDirection::Expect))
        } else if self.send_ms > 0 {
            Some((self.send_ms, HeartbeatDirection::Send))
        } else {
            None
        }
    }

    /// 是否关闭
    pub fn is_disabled(&self) -> bool {
        self.active().is_none()
    }

    /// CONNECTED 帧中 `heart-beat` 头的值
    pub fn to_header(&self) -> String {
        format!("{},{}", self.send_ms, self.expect_ms)
    }
}

/// 协商心跳
///
/// 1. 客户端会发送且服务端接收能力非 0：服务端以两者较大值监测客户端心跳；
/// 2. 否则客户端期望接收且服务端发送能力非 0：服务端以两者较大值发送心跳；
/// 3. 否则关闭。
pub fn negotiate(client: HeartbeatProposal, server: ServerCapability) -> NegotiatedHeartbeat {
    if client.outgoing_ms > 0 && server.min_incoming_ms > 0 {
        NegotiatedHeartbeat {
            send_ms: 0,
            expect_ms: client.outgoing_ms.max(server.min_incoming_ms),
        }
    } else if client.incoming_ms > 0 && server.min_outgoing_ms > 0 {
        NegotiatedHeartbeat {
            send_ms: client.incoming_ms.max(server.min_outgoing_ms),
            expect_ms: 0,
        }
    } else {
        NegotiatedHeartbeat::DISABLED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header() {
        assert_eq!(HeartbeatProposal::parse(None), HeartbeatProposal::DISABLED);
        assert_eq!(
            HeartbeatProposal::parse(Some("10000,5000")),
            HeartbeatProposal::new(10000, 5000)
        );
        assert_eq!(
            HeartbeatProposal::parse(Some(" 100 , 200 ")),
            HeartbeatProposal::new(100, 200)
        );
    }

    #[test]
    fn test_parse_malformed_sides_are_zero() {
        assert_eq!(HeartbeatProposal::parse(Some("")), HeartbeatProposal::DISABLED);
        assert_eq!(HeartbeatProposal::parse(Some("500")), HeartbeatProposal::new(500, 0));
        assert_eq!(HeartbeatProposal::parse(Some("x,300")), HeartbeatProposal::new(0, 300));
        assert_eq!(HeartbeatProposal::parse(Some("-1,-1")), HeartbeatProposal::DISABLED);
    }

    #[test]
    fn test_client_to_server_preferred() {
        let result = negotiate(HeartbeatProposal::new(3000, 4000), ServerCapability::new(5000, 1000));
        assert_eq!(result, NegotiatedHeartbeat { send_ms: 0, expect_ms: 5000 });
        assert_eq!(result.active(), Some((5000, HeartbeatDirection::Expect)));
        assert_eq!(result.to_header(), "0,5000");
    }

    #[test]
    fn test_server_to_client_fallback() {
        let result = negotiate(HeartbeatProposal::new(10000, 5000), ServerCapability::new(0, 8000));
        assert_eq!(result.to_header(), "8000,0");
        assert_eq!(result.active(), Some((8000, HeartbeatDirection::Send)));
    }

    #[test]
    fn test_client_value_wins_when_larger() {
        let result = negotiate(HeartbeatProposal::new(0, 9000), ServerCapability::new(1000, 2000));
        assert_eq!(result.to_header(), "9000,0");
    }

    #[test]
    fn test_disabled_when_no_branch_qualifies() {
        let cases = [
            (HeartbeatProposal::DISABLED, ServerCapability::new(1000, 1000)),
            (HeartbeatProposal::new(1000, 1000), ServerCapability::default()),
            (HeartbeatProposal::new(1000, 0), ServerCapability::new(0, 1000)),
            (HeartbeatProposal::new(0, 1000), ServerCapability::new(1000, 0)),
        ];
        for (client, server) in cases {
            let result = negotiate(client, server);
            assert!(result.is_disabled(), "{:?} / {:?}", client, server);
            assert_eq!(result.to_header(), "0,0");
        }
    }

    #[test]
    fn test_never_both_directions() {
        for client_out in [0, 1, 500, 20000] {
            for client_in in [0, 1, 500, 20000] {
                for min_in in [0, 1, 1000] {
                    for min_out in [0, 1, 1000] {
                        let result = negotiate(
                            HeartbeatProposal::new(client_out, client_in),
                            ServerCapability::new(min_in, min_out),
                        );
                        assert!(result.send_ms == 0 || result.expect_ms == 0);
                    }
                }
            }
        }
    }

    #[test]
    fn test_capability_from_config() {
        let capability = ServerCapability::from(HeartbeatConfig::new(100, 200));
        assert_eq!(capability, ServerCapability::new(100, 200));
    }
}
