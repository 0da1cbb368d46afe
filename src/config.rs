use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::services::HistoryPolicy;

/// 程序配置
///
/// 加载顺序：默认值 → `CALC_CONFIG_FILE` 指向的 TOML 文件 → 环境变量。
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 计算服务地址
    pub api_base_url: String,
    /// 单次请求超时（秒），超时按“无法连接”处理
    pub request_timeout_secs: u64,
    /// 进程内计算器的历史记录粒度
    pub history_policy: HistoryPolicy,
    /// 启动时是否进入链式模式
    pub chain_mode: bool,
    /// 是否使用进程内计算器而非远程服务
    pub offline: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:9000".to_string(),
            request_timeout_secs: 5,
            history_policy: HistoryPolicy::PerStep,
            chain_mode: false,
            offline: false,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 从环境变量加载（可选地先读取 `CALC_CONFIG_FILE`）
    pub fn from_env() -> Result<Self, ConfigError> {
        let base = match std::env::var("CALC_CONFIG_FILE") {
            Ok(path) if !path.is_empty() => Self::from_file(Path::new(&path))?,
            _ => Self::default(),
        };
        base.with_env_overrides(|name| std::env::var(name).ok())
    }

    /// 从 TOML 文件加载，缺失的字段使用默认值
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// 用环境变量覆盖当前值
    ///
    /// `lookup` 便于测试时注入变量表。
    pub fn with_env_overrides<F>(self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            api_base_url: lookup("CALC_API_BASE_URL").unwrap_or(self.api_base_url),
            request_timeout_secs: parse_var(&lookup, "CALC_REQUEST_TIMEOUT_SECS", "u64")?
                .unwrap_or(self.request_timeout_secs),
            history_policy: parse_var(&lookup, "CALC_HISTORY_POLICY", "per_step | per_chain")?
                .unwrap_or(self.history_policy),
            chain_mode: parse_var(&lookup, "CALC_CHAIN_MODE", "bool")?.unwrap_or(self.chain_mode),
            offline: parse_var(&lookup, "CALC_OFFLINE", "bool")?.unwrap_or(self.offline),
            verbose_logging: parse_var(&lookup, "VERBOSE_LOGGING", "bool")?
                .unwrap_or(self.verbose_logging),
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_var<F, T>(lookup: &F, var_name: &str, expected_type: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var_name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
    }
}
