/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// 初始化日志
///
/// `RUST_LOG` 优先；否则默认 `info`，详细模式下为 `debug`。
/// 重复调用不会报错（测试中常见）。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 计算器启动 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    if config.offline {
        info!("🧮 计算服务: 进程内 (历史粒度: {})", config.history_policy);
    } else {
        info!("🌐 计算服务: {}", config.api_base_url);
        info!("⏱️ 请求超时: {} 秒", config.request_timeout_secs);
    }
    info!(
        "⛓️ 链式模式: {}",
        if config.chain_mode { "开启" } else { "关闭" }
    );
    info!("{}", "=".repeat(60));
}

/// 打印会话统计
///
/// # 参数
/// - `success`: 成功的计算次数
/// - `failed`: 失败的计算次数
pub fn log_session_summary(success: usize, failed: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📊 会话结束统计");
    info!(
        "结束时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("✅ 成功: {}", success);
    info!("❌ 失败: {}", failed);
    info!("{}", "=".repeat(60));
}

/// 格式化数字用于显示：整数不带小数点
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(15.0), "15");
        assert_eq!(format_number(-7.0), "-7");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(f64::INFINITY), "inf");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init(false);
        init(true);
    }
}
