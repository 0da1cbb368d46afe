//! 命令行前端
//!
//! 逐行读取输入，例如 `10 + 5 * 2 =`，或命令 `history` / `clear-history` /
//! `ops` / `health` / `ac` / `chain` / `help` / `quit`。

use std::sync::Arc;

use anyhow::{Context, Result};
use regex::Regex;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::clients::CalculatorClient;
use crate::config::Config;
use crate::error::{CalcError, CalcResult};
use crate::models::Operator;
use crate::services::{CalculatorService, LocalCalculator};
use crate::utils::format_number;
use crate::utils::logging::{log_session_summary, log_startup};
use crate::workflow::CalculatorSession;

const HELP: &str = "输入算式，例如 `10 + 5 * 2 =`（从左到右计算，无优先级）\n\
命令: history | clear-history | ops | health | ac | chain | help | quit";

/// 一行输入中的记号
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token {
    Number(f64),
    Operator(Operator),
    Equals,
}

/// 处理一行后的去向
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// 继续读取，附带要输出的内容
    Continue(Vec<String>),
    /// 退出
    Quit,
}

/// 会话统计
#[derive(Debug, Default, Clone, Copy)]
struct SessionStats {
    success: usize,
    failed: usize,
}

/// 应用主结构
pub struct App {
    session: CalculatorSession<Arc<dyn CalculatorService>>,
    client: Option<CalculatorClient>,
    tokenizer: Regex,
    stats: SessionStats,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        if config.offline {
            let service: Arc<dyn CalculatorService> =
                Arc::new(LocalCalculator::new(config.history_policy));
            return Self::with_service(service, None, config.chain_mode);
        }

        let client = CalculatorClient::new(&config).context("无法创建计算服务客户端")?;
        match client.health_check().await {
            Ok(health) if health.is_healthy() => info!("✓ 计算服务状态正常"),
            Ok(health) => warn!("⚠️ 计算服务状态: {}", health.status),
            Err(e) => warn!("⚠️ 计算服务暂时不可用: {}", e),
        }

        let service: Arc<dyn CalculatorService> = Arc::new(client.clone());
        Self::with_service(service, Some(client), config.chain_mode)
    }

    /// 使用指定的计算服务创建应用
    pub fn with_service(
        service: Arc<dyn CalculatorService>,
        client: Option<CalculatorClient>,
        chain_mode: bool,
    ) -> Result<Self> {
        Ok(Self {
            session: CalculatorSession::with_chain_mode(service, chain_mode),
            client,
            tokenizer: tokenizer().context("无法构建输入解析器")?,
            stats: SessionStats::default(),
        })
    }

    /// 运行交互循环，直到输入结束或 `quit`
    pub async fn run(mut self) -> Result<()> {
        println!("{}", HELP);

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await.context("读取输入失败")? {
            match self.handle_line(&line).await {
                Step::Continue(output) => output.iter().for_each(|l| println!("{}", l)),
                Step::Quit => break,
            }
        }

        log_session_summary(self.stats.success, self.stats.failed);
        Ok(())
    }

    /// 处理一行输入
    pub async fn handle_line(&mut self, line: &str) -> Step {
        let trimmed = line.trim();
        let output = match trimmed.to_ascii_lowercase().as_str() {
            "" => Vec::new(),
            "quit" | "exit" | "q" => return Step::Quit,
            "help" | "?" => vec![HELP.to_string()],
            "ac" => {
                self.session.clear();
                vec![format_number(self.session.display())]
            }
            "chain" => {
                let on = self.session.toggle_chain_mode();
                vec![format!("链式模式: {}", if on { "开启" } else { "关闭" })]
            }
            "history" => self.show_history().await,
            "clear-history" => match self.session.clear_history().await {
                Ok(()) => vec!["历史记录已清空".to_string()],
                Err(e) => vec![format!("Error: {}", e)],
            },
            "ops" => match self.session.service().get_operations().await {
                Ok(ops) => vec![ops
                    .iter()
                    .map(Operator::symbol)
                    .collect::<Vec<_>>()
                    .join(" ")],
                Err(e) => vec![format!("Error: {}", e)],
            },
            "health" => self.show_health().await,
            _ => self.evaluate_line(trimmed).await,
        };
        Step::Continue(output)
    }

    async fn evaluate_line(&mut self, line: &str) -> Vec<String> {
        let tokens = match tokenize(&self.tokenizer, line) {
            Ok(tokens) => tokens,
            Err(e) => return vec![format!("Error: {}", e)],
        };

        for token in tokens {
            let outcome = match token {
                Token::Number(value) => {
                    self.session.enter(value);
                    Ok(None)
                }
                Token::Operator(op) => self.session.press_operator(op).await,
                Token::Equals => self.session.press_equals().await,
            };

            match outcome {
                Ok(Some(_)) => self.stats.success += 1,
                Ok(None) => {}
                Err(e) => {
                    self.stats.failed += 1;
                    return vec![format!("Error: {}", e)];
                }
            }
        }

        let mut display = format_number(self.session.display());
        if let Some(op) = self.session.pending_operator() {
            display = format!("{} {}", display, op);
        }
        if let Some(chain) = self.session.chain() {
            display = format!("{}    [运算链: {} 步]", display, chain.len());
        }
        vec![display]
    }

    async fn show_history(&self) -> Vec<String> {
        match self.session.history().await {
            Ok(history) if history.is_empty() => vec!["(暂无历史记录)".to_string()],
            Ok(history) => history
                .newest_first()
                .map(|e| {
                    format!(
                        "{} {} {} = {}",
                        format_number(e.num1),
                        e.operator,
                        format_number(e.num2),
                        format_number(e.result)
                    )
                })
                .collect(),
            Err(e) => vec![format!("Error: {}", e)],
        }
    }

    async fn show_health(&self) -> Vec<String> {
        match &self.client {
            None => vec!["进程内计算器: healthy".to_string()],
            Some(client) => match client.health_check().await {
                Ok(health) => vec![format!(
                    "{}: {}",
                    health.service.as_deref().unwrap_or(client.base_url()),
                    health.status
                )],
                Err(e) => vec![format!("Error: {}", e)],
            },
        }
    }
}

fn tokenizer() -> Result<Regex, regex::Error> {
    Regex::new(r"(\d+(?:\.\d*)?|\.\d+)|(\S)")
}

/// 把一行输入切分为记号
///
/// 出现在行首或运算符之后的 `-` 视为负号；未知符号报 `InvalidOperator`。
/// 负号后不是数字、或两个数字相连（如 `1.2.3`）时报 `InvalidChain`。
pub fn tokenize(re: &Regex, line: &str) -> CalcResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut negate = false;

    for caps in re.captures_iter(line) {
        if let Some(num) = caps.get(1) {
            if matches!(tokens.last(), Some(Token::Number(_))) {
                return Err(CalcError::invalid_chain(format!(
                    "数字 `{}` 前缺少运算符",
                    num.as_str()
                )));
            }
            let value: f64 = num
                .as_str()
                .parse()
                .map_err(|_| CalcError::InvalidOperator(num.as_str().to_string()))?;
            tokens.push(Token::Number(if negate { -value } else { value }));
            negate = false;
            continue;
        }

        let symbol = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        if negate {
            return Err(CalcError::invalid_chain(format!(
                "负号后应为数字，实际为 `{}`",
                symbol
            )));
        }
        let expects_operand = matches!(tokens.last(), None | Some(Token::Operator(_)));

        match symbol {
            "-" if expects_operand => negate = true,
            "=" => tokens.push(Token::Equals),
            "×" | "x" => tokens.push(Token::Operator(Operator::Multiply)),
            "÷" => tokens.push(Token::Operator(Operator::Divide)),
            "−" => tokens.push(Token::Operator(Operator::Subtract)),
            other => tokens.push(Token::Operator(Operator::from_symbol(other)?)),
        }
    }

    if negate {
        return Err(CalcError::invalid_chain("负号后缺少数字"));
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_app(chain_mode: bool) -> App {
        App::with_service(Arc::new(LocalCalculator::default()), None, chain_mode).unwrap()
    }

    fn lines(step: Step) -> Vec<String> {
        match step {
            Step::Continue(output) => output,
            Step::Quit => panic!("不应退出"),
        }
    }

    #[test]
    fn test_tokenize_expression() {
        let re = tokenizer().unwrap();
        assert_eq!(
            tokenize(&re, "10 + 5*2 =").unwrap(),
            vec![
                Token::Number(10.0),
                Token::Operator(Operator::Add),
                Token::Number(5.0),
                Token::Operator(Operator::Multiply),
                Token::Number(2.0),
                Token::Equals,
            ]
        );
    }

    #[test]
    fn test_tokenize_negative_numbers() {
        let re = tokenizer().unwrap();
        assert_eq!(
            tokenize(&re, "-3 - -2.5").unwrap(),
            vec![
                Token::Number(-3.0),
                Token::Operator(Operator::Subtract),
                Token::Number(-2.5),
            ]
        );
    }

    #[test]
    fn test_tokenize_rejects_unknown_operator() {
        let re = tokenizer().unwrap();
        assert_eq!(
            tokenize(&re, "10 % 3"),
            Err(CalcError::InvalidOperator("%".to_string()))
        );
    }

    #[test]
    fn test_tokenize_rejects_repeated_minus() {
        let re = tokenizer().unwrap();
        for line in ["3 - - - 2", "- - 2", "3 * -"] {
            assert!(
                matches!(tokenize(&re, line), Err(CalcError::InvalidChain(_))),
                "`{}` 应被拒绝",
                line
            );
        }
    }

    #[test]
    fn test_tokenize_rejects_adjacent_numbers() {
        let re = tokenizer().unwrap();
        assert!(matches!(
            tokenize(&re, "1.2.3 + 1"),
            Err(CalcError::InvalidChain(_))
        ));
        assert!(matches!(tokenize(&re, "4 5"), Err(CalcError::InvalidChain(_))));
        // 等号之后可以开始新的算式
        assert!(tokenize(&re, "1 + 1 = 3 * 2 =").is_ok());
    }

    #[tokio::test]
    async fn test_malformed_line_leaves_session_untouched() {
        let mut app = offline_app(false);
        app.handle_line("7 +").await;

        let output = lines(app.handle_line("1.2.3 =").await);
        assert!(output[0].starts_with("Error:"), "实际: {:?}", output);
        assert_eq!(lines(app.handle_line("1 =").await), vec!["8"]);
    }

    #[tokio::test]
    async fn test_evaluate_line_left_to_right() {
        let mut app = offline_app(false);
        assert_eq!(lines(app.handle_line("2 + 3 * 4 =").await), vec!["20"]);
    }

    #[tokio::test]
    async fn test_division_by_zero_is_reported() {
        let mut app = offline_app(true);
        let output = lines(app.handle_line("10 + 5 / 0 =").await);
        assert_eq!(output, vec![format!("Error: {}", CalcError::DivisionByZero)]);
        assert_eq!(app.stats.failed, 1);
    }

    #[tokio::test]
    async fn test_history_is_printed_newest_first() {
        let mut app = offline_app(false);
        app.handle_line("1 + 1 =").await;
        app.handle_line("2 * 3 =").await;

        assert_eq!(
            lines(app.handle_line("history").await),
            vec!["2 * 3 = 6", "1 + 1 = 2"]
        );

        app.handle_line("clear-history").await;
        assert_eq!(
            lines(app.handle_line("history").await),
            vec!["(暂无历史记录)"]
        );
    }

    #[tokio::test]
    async fn test_commands() {
        let mut app = offline_app(false);
        assert_eq!(lines(app.handle_line("ops").await), vec!["+ - * /"]);
        assert_eq!(lines(app.handle_line("chain").await), vec!["链式模式: 开启"]);
        assert_eq!(app.handle_line("quit").await, Step::Quit);
    }
}
