//! 计算会话 - 流程层
//!
//! 核心职责：累积用户输入，决定何时发单次运算、何时发整条链
//!
//! - 普通模式：每次按运算符都用 `calculate_simple` 归约当前值
//! - 链式模式：第一次归约开启一条链，之后每一步都把整条链重新发给服务
//! - 任何失败都会清空当前值、待定运算符和整条链
//!
//! 所有改变状态的方法都要求 `&mut self`，同一会话同时只会有一个请求在途。

use tracing::{debug, info, warn};

use crate::error::CalcResult;
use crate::models::{Chain, History, Operator};
use crate::services::CalculatorService;
use crate::workflow::request_state::RequestState;

/// 计算会话
pub struct CalculatorSession<S> {
    service: S,
    display: f64,
    current: Option<f64>,
    pending_operator: Option<Operator>,
    waiting_for_operand: bool,
    chain_mode: bool,
    chain: Option<Chain>,
    state: RequestState,
    last_error: Option<String>,
}

impl<S: CalculatorService> CalculatorSession<S> {
    /// 创建新的会话
    pub fn new(service: S) -> Self {
        Self {
            service,
            display: 0.0,
            current: None,
            pending_operator: None,
            waiting_for_operand: false,
            chain_mode: false,
            chain: None,
            state: RequestState::Idle,
            last_error: None,
        }
    }

    /// 以链式模式创建会话
    pub fn with_chain_mode(service: S, chain_mode: bool) -> Self {
        let mut session = Self::new(service);
        session.chain_mode = chain_mode;
        session
    }

    /// 输入一个操作数
    pub fn enter(&mut self, value: f64) {
        self.display = value;
        self.waiting_for_operand = false;
        self.last_error = None;
    }

    /// 按下运算符
    ///
    /// 若已有当前值和待定运算符，先归约一次；返回本次归约的结果。
    pub async fn press_operator(&mut self, next: Operator) -> CalcResult<Option<f64>> {
        let input = self.display;

        let reduced = match (self.current, self.pending_operator) {
            (None, _) => {
                self.current = Some(input);
                None
            }
            (Some(_), Some(_)) if self.waiting_for_operand => {
                debug!("连续按下运算符，替换为 {}", next);
                None
            }
            (Some(current), Some(operator)) => {
                let result = self.reduce(current, operator, input).await?;
                self.current = Some(result);
                self.display = result;
                Some(result)
            }
            (Some(_), None) => None,
        };

        self.waiting_for_operand = true;
        self.pending_operator = Some(next);
        Ok(reduced)
    }

    /// 按下等号
    ///
    /// 没有待定运算时什么也不做，返回 `None`。
    pub async fn press_equals(&mut self) -> CalcResult<Option<f64>> {
        let (current, operator) = match (self.current, self.pending_operator) {
            (Some(current), Some(operator)) => (current, operator),
            _ => return Ok(None),
        };

        let result = self.reduce(current, operator, self.display).await?;

        self.display = result;
        self.current = None;
        self.pending_operator = None;
        self.waiting_for_operand = true;
        self.chain = None;
        Ok(Some(result))
    }

    /// 全部清除（AC）
    pub fn clear(&mut self) {
        self.reset();
        self.display = 0.0;
        self.waiting_for_operand = false;
        self.last_error = None;
    }

    /// 切换链式模式，同时清除当前状态
    pub fn toggle_chain_mode(&mut self) -> bool {
        self.chain_mode = !self.chain_mode;
        self.clear();
        info!(
            "⛓️ 链式模式: {}",
            if self.chain_mode { "开启" } else { "关闭" }
        );
        self.chain_mode
    }

    /// 读取服务端历史
    pub async fn history(&self) -> CalcResult<History> {
        self.service.get_history().await
    }

    /// 清空服务端历史
    pub async fn clear_history(&self) -> CalcResult<()> {
        self.service.clear_history().await
    }

    /// 归约 `current operator input`，失败时清空累积状态
    async fn reduce(&mut self, current: f64, operator: Operator, input: f64) -> CalcResult<f64> {
        self.state = RequestState::Pending;

        let outcome = match (self.chain_mode, self.chain.clone()) {
            (true, Some(chain)) => {
                let updated = chain.then(operator, input);
                debug!("发送整条运算链，共 {} 步", updated.len());
                let outcome = self.service.calculate_chain(&updated).await;
                outcome.map(|result| (result, Some(updated)))
            }
            (chain_mode, _) => {
                let outcome = self.service.calculate_simple(current, input, operator).await;
                outcome.map(|result| {
                    let started = chain_mode.then(|| Chain::single(current, operator, input));
                    (result, started)
                })
            }
        };

        match outcome {
            Ok((result, chain)) => {
                self.state = RequestState::Success;
                self.chain = chain;
                self.last_error = None;
                Ok(result)
            }
            Err(e) => {
                warn!("❌ 计算失败，清空运算链: {}", e);
                self.state = RequestState::Failed;
                self.last_error = Some(e.to_string());
                self.reset();
                Err(e)
            }
        }
    }

    fn reset(&mut self) {
        self.current = None;
        self.pending_operator = None;
        self.chain = None;
    }

    pub fn display(&self) -> f64 {
        self.display
    }

    pub fn current(&self) -> Option<f64> {
        self.current
    }

    pub fn pending_operator(&self) -> Option<Operator> {
        self.pending_operator
    }

    pub fn chain(&self) -> Option<&Chain> {
        self.chain.as_ref()
    }

    pub fn chain_mode(&self) -> bool {
        self.chain_mode
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn service(&self) -> &S {
        &self.service
    }
}
