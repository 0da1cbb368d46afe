//! 计算服务 HTTP 客户端
//!
//! 把所有请求的结果统一成“结果或 `CalcError`”：
//! - 传输层失败（无响应、请求构造失败、超时）→ `Unreachable`
//!   操作数为 NaN / 无穷大时 JSON 无法表示，请求在发出前即被拒绝，同样归为 `Unreachable`
//! - 服务端返回的错误（如除以零）→ `RemoteCalculationError`，携带服务端消息
//!
//! 不做自动重试，失败只上报一次，由调用方决定是否重试。

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{CalcError, CalcResult};
use crate::models::wire::{
    ChainCalcRequest, ErrorBody, HealthStatus, HistoryResponse, MessageResponse,
    OperationResponse, OperationsResponse, SimpleCalcRequest,
};
use crate::models::{Calculation, Chain, History, Operator};
use crate::services::CalculatorService;

/// 计算服务客户端
///
/// 内部的 `reqwest::Client` 自带连接池，克隆开销很小，按需传递即可。
#[derive(Clone, Debug)]
pub struct CalculatorClient {
    http: Client,
    base_url: String,
}

impl CalculatorClient {
    /// 按配置创建客户端
    pub fn new(config: &Config) -> CalcResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| CalcError::Unreachable(format!("无法创建 HTTP 客户端: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 单次运算，返回结果和服务端说明
    pub async fn calculate_simple_detailed(
        &self,
        num1: f64,
        num2: f64,
        operator: Operator,
    ) -> CalcResult<Calculation> {
        ensure_finite([num1, num2])?;
        let body = SimpleCalcRequest {
            num1,
            num2,
            operator,
        };
        debug!("请求单次运算: {} {} {}", num1, operator, num2);

        let response: OperationResponse = self
            .send(self.http.post(self.url("/calculate")).json(&body), "/calculate")
            .await?;

        Ok(Calculation {
            result: response.result,
            message: response.message,
        })
    }

    /// 链式运算，返回结果和服务端说明
    pub async fn calculate_chain_detailed(&self, chain: &Chain) -> CalcResult<Calculation> {
        ensure_finite(
            chain
                .steps()
                .iter()
                .flat_map(|step| step.num1.into_iter().chain([step.num2])),
        )?;
        let body = ChainCalcRequest { operations: chain };
        debug!("请求链式运算，共 {} 步", chain.len());

        let response: OperationResponse = self
            .send(
                self.http.post(self.url("/calculate-chain")).json(&body),
                "/calculate-chain",
            )
            .await?;

        Ok(Calculation {
            result: response.result,
            message: response.message,
        })
    }

    /// 检查服务状态
    pub async fn health_check(&self) -> CalcResult<HealthStatus> {
        self.send(self.http.get(self.url("/health")), "/health").await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 发送请求并解析成功响应
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, endpoint: &str) -> CalcResult<T> {
        let body = self.execute(request, endpoint).await?;
        serde_json::from_slice(&body).map_err(|e| {
            warn!("⚠️ {} 响应格式无效: {}", endpoint, e);
            CalcError::remote(format!("响应格式无效: {}", e))
        })
    }

    /// 发送请求，成功时返回响应体
    async fn execute(&self, request: RequestBuilder, endpoint: &str) -> CalcResult<Vec<u8>> {
        let response = request
            .send()
            .await
            .map_err(|e| transport_error(endpoint, e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(endpoint, e))?;

        if status.is_success() {
            debug!("{} 响应 {}: {}", endpoint, status, String::from_utf8_lossy(&body));
            return Ok(body.to_vec());
        }

        let message = error_message(&body);
        warn!("⚠️ {} 返回错误 {}: {}", endpoint, status, message);
        Err(CalcError::RemoteCalculationError(message))
    }
}

#[async_trait]
impl CalculatorService for CalculatorClient {
    async fn calculate_simple(&self, num1: f64, num2: f64, operator: Operator) -> CalcResult<f64> {
        Ok(self.calculate_simple_detailed(num1, num2, operator).await?.result)
    }

    async fn calculate_chain(&self, chain: &Chain) -> CalcResult<f64> {
        Ok(self.calculate_chain_detailed(chain).await?.result)
    }

    async fn get_history(&self) -> CalcResult<History> {
        let response: HistoryResponse = self
            .send(self.http.get(self.url("/history")), "/history")
            .await?;

        if let Some(count) = response.count {
            if count != response.history.len() {
                warn!(
                    "⚠️ 历史记录数量不一致: count={}, 实际 {} 条",
                    count,
                    response.history.len()
                );
            }
        }

        Ok(History::new(response.history))
    }

    async fn clear_history(&self) -> CalcResult<()> {
        let body = self
            .execute(self.http.delete(self.url("/history")), "/history")
            .await?;

        let confirmation: MessageResponse = serde_json::from_slice(&body).unwrap_or_default();
        info!(
            "🗑️ 历史记录已清空{}",
            confirmation
                .message
                .map(|m| format!(": {}", m))
                .unwrap_or_default()
        );
        Ok(())
    }

    async fn get_operations(&self) -> CalcResult<Vec<Operator>> {
        let response: OperationsResponse = self
            .send(self.http.get(self.url("/operations")), "/operations")
            .await?;

        response
            .operations
            .iter()
            .map(|symbol| Operator::from_symbol(symbol))
            .collect()
    }
}

/// 传输层错误一律归为 `Unreachable`
fn transport_error(endpoint: &str, err: reqwest::Error) -> CalcError {
    let reason = if err.is_timeout() {
        format!("请求超时 ({})", endpoint)
    } else if err.is_connect() {
        format!("无法连接 ({}): {}", endpoint, err)
    } else {
        format!("请求失败 ({}): {}", endpoint, err)
    };
    warn!("❌ {}", reason);
    CalcError::Unreachable(reason)
}

/// 非有限数会被序列化成 `null`，不能发出
fn ensure_finite(operands: impl IntoIterator<Item = f64>) -> CalcResult<()> {
    match operands.into_iter().find(|v| !v.is_finite()) {
        None => Ok(()),
        Some(value) => {
            warn!("❌ 操作数 {} 不是有限数，请求未发送", value);
            Err(CalcError::Unreachable(format!(
                "请求构造失败: 操作数 {} 不是有限数",
                value
            )))
        }
    }
}

/// 从错误响应体中提取消息
fn error_message(body: &[u8]) -> String {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(parsed) => parsed.message(),
        Err(_) => {
            let text = String::from_utf8_lossy(body).trim().to_string();
            if text.is_empty() {
                ErrorBody::default().message()
            } else {
                text
            }
        }
    }
}
