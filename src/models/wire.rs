//! 计算服务的请求/响应结构（HTTP + JSON）

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::chain::Chain;
use crate::models::history::HistoryEntry;
use crate::models::operator::Operator;

/// 服务端无消息字段时的默认错误信息
pub const DEFAULT_ERROR_MESSAGE: &str = "运算出错";

/// POST /calculate
#[derive(Debug, Clone, Serialize)]
pub struct SimpleCalcRequest {
    pub num1: f64,
    pub num2: f64,
    pub operator: Operator,
}

/// POST /calculate-chain
#[derive(Debug, Clone, Serialize)]
pub struct ChainCalcRequest<'a> {
    pub operations: &'a Chain,
}

/// 计算成功的响应
#[derive(Debug, Clone, Deserialize)]
pub struct OperationResponse {
    pub result: f64,
    #[serde(default)]
    pub message: Option<String>,
}

/// GET /history
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryResponse {
    pub history: Vec<HistoryEntry>,
    #[serde(default)]
    pub count: Option<usize>,
}

/// GET /operations
#[derive(Debug, Clone, Deserialize)]
pub struct OperationsResponse {
    pub operations: Vec<String>,
    #[serde(default)]
    pub count: Option<usize>,
}

/// GET /health
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// DELETE /history 等只返回确认消息的接口
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// 带服务端说明的计算结果
#[derive(Debug, Clone, PartialEq)]
pub struct Calculation {
    pub result: f64,
    pub message: Option<String>,
}

/// 服务端错误响应体
///
/// `detail` 可能是字符串，也可能是校验框架返回的 `[{msg, ...}]` 数组。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// 提取错误信息：优先 `detail`，其次 `error`，最后默认信息
    pub fn message(&self) -> String {
        self.detail
            .as_ref()
            .and_then(detail_message)
            .or_else(|| self.error.clone().filter(|e| !e.is_empty()))
            .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string())
    }
}

fn detail_message(detail: &Value) -> Option<String> {
    match detail {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    other => other.get("msg").and_then(Value::as_str).map(str::to_string),
                })
                .collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join("; "))
            }
        }
        _ => None,
    }
}
