//! stompix 命令分发
//!
//! 把入站帧按命令路由到应用回调，协商心跳，并构建响应帧。

pub mod callback;
pub mod dispatcher;
pub mod frames;
pub mod heartbeat;
pub mod hooks;

pub use callback::CallbackOutcome;
pub use dispatcher::Dispatcher;
pub use frames::{ErrorDescription, PROTOCOL_VERSION, ServerFrame};
pub use heartbeat::{
    HeartbeatDirection, HeartbeatProposal, NegotiatedHeartbeat, ServerCapability, negotiate,
};
pub use hooks::{
    AcceptAll, ConnectRequest, DEFAULT_ACK_MODE, SendRequest, ServerHooks, SubscribeRequest,
};

// 重新导出错误类型
pub use stompix_core::{Result, StompixError};

// 预导出
pub mod prelude {
    pub use crate::dispatcher::Dispatcher;
    pub use crate::frames::{ErrorDescription, ServerFrame};
    pub use crate::heartbeat::{HeartbeatDirection, NegotiatedHeartbeat};
    pub use crate::hooks::{ConnectRequest, SendRequest, ServerHooks, SubscribeRequest};
    pub use stompix_core::{Result, StompixError};
}
