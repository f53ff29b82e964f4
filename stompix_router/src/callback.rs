//! 回调结果归一化
//!
//! 应用回调可能返回 `Ok(true)`、`Ok(false)`、`Err`，也可能在构造 future 时或
//! 在 future 执行中 panic。这里把所有情况统一成 [`CallbackOutcome`]，分发层只
//! 需要处理一种结果。

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use stompix_core::{Result, StompixError};
use stompix_network::Command;

/// 回调结果
#[derive(Debug)]
pub enum CallbackOutcome {
    /// 接受
    Accepted,
    /// 拒绝
    Rejected,
    /// 回调失败
    Fault(StompixError),
}

impl CallbackOutcome {
    /// 从回调返回值转换
    pub fn from_result(command: &Command, result: Result<bool>) -> Self {
        match result {
            Ok(true) => CallbackOutcome::Accepted,
            Ok(false) => CallbackOutcome::Rejected,
            Err(StompixError::Callback { command, reason }) => {
                CallbackOutcome::Fault(StompixError::Callback { command, reason })
            }
            Err(err) => CallbackOutcome::Fault(StompixError::callback(command.as_str(), err.to_string())),
        }
    }

    /// 转换为 `Result<bool>`，失败时返回错误
    pub fn into_result(self) -> Result<bool> {
        match self {
            CallbackOutcome::Accepted => Ok(true),
            CallbackOutcome::Rejected => Ok(false),
            CallbackOutcome::Fault(err) => Err(err),
        }
    }
}

/// 调用回调并归一化结果
pub async fn invoke<'a, F>(command: &Command, call: F) -> CallbackOutcome
where
    F: FnOnce() -> BoxFuture<'a, Result<bool>>,
{
    let future = match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(future) => future,
        Err(payload) => return panicked(command, payload),
    };

    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(result) => CallbackOutcome::from_result(command, result),
        Err(payload) => panicked(command, payload),
    }
}

fn panicked(command: &Command, payload: Box<dyn Any + Send>) -> CallbackOutcome {
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        format!("回调 panic: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("回调 panic: {}", s)
    } else {
        "回调 panic".to_string()
    };
    CallbackOutcome::Fault(StompixError::callback(command.as_str(), message))
}
