//! 请求生命周期
//!
//! `Idle -> Pending -> {Success, Failed}`，不自动重试。

use std::fmt::Display;

/// 会话中最近一次请求的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestState {
    /// 尚未发出请求
    #[default]
    Idle,
    /// 请求进行中
    Pending,
    /// 最近一次请求成功
    Success,
    /// 最近一次请求失败
    Failed,
}

impl RequestState {
    /// 只有在 `Pending` 时才算忙
    pub fn is_pending(&self) -> bool {
        matches!(self, RequestState::Pending)
    }

    /// 请求已结束（成功或失败）
    pub fn is_settled(&self) -> bool {
        matches!(self, RequestState::Success | RequestState::Failed)
    }
}

impl Display for RequestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RequestState::Idle => "空闲",
            RequestState::Pending => "计算中",
            RequestState::Success => "成功",
            RequestState::Failed => "失败",
        };
        f.write_str(label)
    }
}
