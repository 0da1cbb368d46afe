//! 进程内计算器
//!
//! 与远程计算服务契约相同，历史保存在内存中，按配置的粒度记录。

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::CalcResult;
use crate::models::{Chain, History, HistoryEntry, Operator};
use crate::services::calculator_service::CalculatorService;
use crate::services::evaluator;

/// 运算链的历史记录粒度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryPolicy {
    /// 每条成功的链按步记录，每一步一条
    #[default]
    PerStep,
    /// 每条成功的链只记录最后一步（左操作数为之前的累积值）
    PerChain,
}

impl fmt::Display for HistoryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryPolicy::PerStep => f.write_str("per_step"),
            HistoryPolicy::PerChain => f.write_str("per_chain"),
        }
    }
}

impl FromStr for HistoryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "per_step" | "per-step" | "step" => Ok(HistoryPolicy::PerStep),
            "per_chain" | "per-chain" | "chain" => Ok(HistoryPolicy::PerChain),
            other => Err(format!("未知的历史记录粒度: {}", other)),
        }
    }
}

/// 进程内计算器
///
/// 历史由 `Mutex` 保护，可以包在 `Arc` 里给多个会话共用。
#[derive(Debug, Default)]
pub struct LocalCalculator {
    policy: HistoryPolicy,
    history: Mutex<Vec<HistoryEntry>>,
}

impl LocalCalculator {
    pub fn new(policy: HistoryPolicy) -> Self {
        Self {
            policy,
            history: Mutex::new(Vec::new()),
        }
    }

    pub fn policy(&self) -> HistoryPolicy {
        self.policy
    }

    async fn record(&self, entries: Vec<HistoryEntry>) {
        if entries.is_empty() {
            return;
        }
        let mut history = self.history.lock().await;
        debug!("写入 {} 条历史记录", entries.len());
        history.extend(entries);
    }
}

#[async_trait]
impl CalculatorService for LocalCalculator {
    async fn calculate_simple(&self, num1: f64, num2: f64, operator: Operator) -> CalcResult<f64> {
        let result = evaluator::calculate(num1, num2, operator)?;
        self.record(vec![HistoryEntry::new(num1, operator, num2, result)])
            .await;
        info!("✓ {} {} {} = {}", num1, operator, num2, result);
        Ok(result)
    }

    async fn calculate_chain(&self, chain: &Chain) -> CalcResult<f64> {
        let mut steps = Vec::with_capacity(chain.len());
        let outcome = evaluator::evaluate_with(chain, |entry| steps.push(entry));

        // 失败的链不写历史
        let result = outcome?;
        match self.policy {
            HistoryPolicy::PerStep => self.record(steps).await,
            HistoryPolicy::PerChain => {
                self.record(steps.last().copied().into_iter().collect()).await
            }
        }
        info!("✓ 运算链 ({} 步) = {}", chain.len(), result);
        Ok(result)
    }

    async fn get_history(&self) -> CalcResult<History> {
        let history = self.history.lock().await;
        Ok(History::new(history.clone()))
    }

    async fn clear_history(&self) -> CalcResult<()> {
        let mut history = self.history.lock().await;
        info!("🗑️ 清空历史记录 ({} 条)", history.len());
        history.clear();
        Ok(())
    }
}
