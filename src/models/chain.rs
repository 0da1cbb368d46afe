//! 运算链
//!
//! 链是一组有序的二元运算，按从左到右折叠：
//! `result_0 = chain[0].num1`，`result_i = apply(chain[i].operator, result_{i-1}, chain[i].num2)`。

use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};
use crate::models::operator::Operator;

/// 链中的一步
///
/// 只有第一步携带 `num1`，后续步骤隐式使用上一步的结果。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChainStep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num1: Option<f64>,
    pub operator: Operator,
    pub num2: f64,
}

impl ChainStep {
    /// 链的第一步
    pub fn first(num1: f64, operator: Operator, num2: f64) -> Self {
        Self {
            num1: Some(num1),
            operator,
            num2,
        }
    }

    /// 后续步骤
    pub fn next(operator: Operator, num2: f64) -> Self {
        Self {
            num1: None,
            operator,
            num2,
        }
    }
}

/// 经过校验的运算链
///
/// 不变式：非空；第一步带 `num1`；其余步骤不带 `num1`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ChainStep>", into = "Vec<ChainStep>")]
pub struct Chain {
    steps: Vec<ChainStep>,
}

impl Chain {
    /// 从步骤列表构建链并校验
    pub fn new(steps: Vec<ChainStep>) -> CalcResult<Self> {
        let first = steps
            .first()
            .ok_or_else(|| CalcError::invalid_chain("至少需要一个运算"))?;

        if first.num1.is_none() {
            return Err(CalcError::invalid_chain("第一个运算必须包含 num1"));
        }

        if let Some(pos) = steps.iter().skip(1).position(|s| s.num1.is_some()) {
            return Err(CalcError::invalid_chain(format!(
                "第 {} 个运算不能包含 num1",
                pos + 2
            )));
        }

        Ok(Self { steps })
    }

    /// 只有一步的链
    pub fn single(num1: f64, operator: Operator, num2: f64) -> Self {
        Self {
            steps: vec![ChainStep::first(num1, operator, num2)],
        }
    }

    /// 追加一步，返回新链
    pub fn then(mut self, operator: Operator, num2: f64) -> Self {
        self.steps.push(ChainStep::next(operator, num2));
        self
    }

    /// 初始操作数
    pub fn initial(&self) -> f64 {
        // 构造时已保证第一步存在且带 num1
        self.steps[0].num1.unwrap_or_default()
    }

    pub fn steps(&self) -> &[ChainStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl TryFrom<Vec<ChainStep>> for Chain {
    type Error = CalcError;

    fn try_from(steps: Vec<ChainStep>) -> Result<Self, Self::Error> {
        Chain::new(steps)
    }
}

impl From<Chain> for Vec<ChainStep> {
    fn from(chain: Chain) -> Self {
        chain.steps
    }
}
