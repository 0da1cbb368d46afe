//! # Chain Calculator
//!
//! 链式计算器：把一串二元运算从左到右折叠成一个结果，计算委托给计算服务，
//! 并展示服务端保存的历史记录。
//!
//! ## 架构设计
//!
//! ### ① 数据模型（Models）
//! - `Operator` / `Chain` / `HistoryEntry` / `History`
//! - `wire` - 与计算服务之间的请求/响应结构
//!
//! ### ② 业务能力层（Services）
//! - `evaluator` - 纯函数的链式折叠
//! - `CalculatorService` - 计算服务契约
//! - `LocalCalculator` - 进程内实现
//!
//! ### ③ 客户端（Clients）
//! - `CalculatorClient` - HTTP + JSON 客户端，统一错误分类
//!
//! ### ④ 流程层（Workflow）
//! - `CalculatorSession` - 累积输入、维护运算链、失败时整体重置
//!
//! ## 模块结构

pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use clients::CalculatorClient;
pub use config::Config;
pub use error::{CalcError, CalcResult, ConfigError};
pub use models::{Calculation, Chain, ChainStep, History, HistoryEntry, Operator};
pub use services::{evaluate, CalculatorService, HistoryPolicy, LocalCalculator};
pub use workflow::{CalculatorSession, RequestState};
