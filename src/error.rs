//! 错误类型
//!
//! - `CalcError`：计算相关的全部失败（本地折叠与远程调用统一使用）
//! - `ConfigError`：配置加载失败

use thiserror::Error;

/// 计算错误
///
/// 所有计算失败都以带标签的结果返回给调用方，不会被静默吞掉。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    /// 除数为零
    #[error("不能除以零")]
    DivisionByZero,

    /// 不支持的运算符
    #[error("不支持的运算符: {0}")]
    InvalidOperator(String),

    /// 运算链为空或某一步格式错误
    #[error("无效的运算链: {0}")]
    InvalidChain(String),

    /// 传输层失败（无响应、请求构造失败、超时）
    #[error("无法连接计算服务: {0}")]
    Unreachable(String),

    /// 服务端明确拒绝，携带服务端消息
    #[error("计算服务返回错误: {0}")]
    RemoteCalculationError(String),
}

impl CalcError {
    /// 是否为传输层错误
    pub fn is_transport(&self) -> bool {
        matches!(self, CalcError::Unreachable(_))
    }

    /// 创建运算链错误
    pub fn invalid_chain(reason: impl Into<String>) -> Self {
        CalcError::InvalidChain(reason.into())
    }

    /// 创建远程计算错误
    pub fn remote(message: impl Into<String>) -> Self {
        CalcError::RemoteCalculationError(message.into())
    }
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

/// 计算结果类型
pub type CalcResult<T> = Result<T, CalcError>;
