//! 业务能力层
//!
//! - `evaluator` - 纯函数的链式折叠
//! - `CalculatorService` - 计算服务契约
//! - `LocalCalculator` - 进程内实现，带内存历史

pub mod calculator_service;
pub mod evaluator;
pub mod local_calculator;

pub use calculator_service::CalculatorService;
pub use evaluator::{calculate, evaluate};
pub use local_calculator::{HistoryPolicy, LocalCalculator};
