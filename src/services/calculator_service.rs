//! 计算服务边界
//!
//! 会话只依赖这个 trait；远程 HTTP 客户端和进程内计算器都实现它。

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::CalcResult;
use crate::models::{Chain, History, Operator};

/// 计算服务契约
#[async_trait]
pub trait CalculatorService: Send + Sync {
    /// 单次运算，必须与 `evaluate([{num1, operator, num2}])` 一致
    async fn calculate_simple(&self, num1: f64, num2: f64, operator: Operator) -> CalcResult<f64>;

    /// 整条链的折叠
    async fn calculate_chain(&self, chain: &Chain) -> CalcResult<f64>;

    /// 当前完整历史，按插入顺序
    async fn get_history(&self) -> CalcResult<History>;

    /// 清空历史，空历史再清空不算错误
    async fn clear_history(&self) -> CalcResult<()>;

    /// 支持的运算符
    async fn get_operations(&self) -> CalcResult<Vec<Operator>> {
        Ok(Operator::all().to_vec())
    }
}

#[async_trait]
impl<T: CalculatorService + ?Sized> CalculatorService for Arc<T> {
    async fn calculate_simple(&self, num1: f64, num2: f64, operator: Operator) -> CalcResult<f64> {
        (**self).calculate_simple(num1, num2, operator).await
    }

    async fn calculate_chain(&self, chain: &Chain) -> CalcResult<f64> {
        (**self).calculate_chain(chain).await
    }

    async fn get_history(&self) -> CalcResult<History> {
        (**self).get_history().await
    }

    async fn clear_history(&self) -> CalcResult<()> {
        (**self).clear_history().await
    }

    async fn get_operations(&self) -> CalcResult<Vec<Operator>> {
        (**self).get_operations().await
    }
}
