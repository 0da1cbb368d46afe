//! 运算符
//!
//! 词汇表固定为 `+` `-` `*` `/`，其余符号一律报 `InvalidOperator`。

use std::fmt;
use std::str::FromStr;

use phf::phf_map;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CalcError, CalcResult};

/// 二元运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

static OPERATORS: phf::Map<&'static str, Operator> = phf_map! {
    "+" => Operator::Add,
    "-" => Operator::Subtract,
    "*" => Operator::Multiply,
    "/" => Operator::Divide,
};

impl Operator {
    /// 所有支持的运算符，按固定顺序
    pub fn all() -> [Operator; 4] {
        [
            Operator::Add,
            Operator::Subtract,
            Operator::Multiply,
            Operator::Divide,
        ]
    }

    /// 线上协议使用的符号
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
        }
    }

    /// 按符号查找运算符
    pub fn from_symbol(symbol: &str) -> CalcResult<Self> {
        OPERATORS
            .get(symbol)
            .copied()
            .ok_or_else(|| CalcError::InvalidOperator(symbol.to_string()))
    }

    /// 对两个操作数执行运算
    ///
    /// 除法在除数为零时返回 `DivisionByZero`；其余运算遵循普通浮点语义，
    /// 溢出和 NaN 不做特殊处理。
    pub fn apply(&self, a: f64, b: f64) -> CalcResult<f64> {
        match self {
            Operator::Add => Ok(a + b),
            Operator::Subtract => Ok(a - b),
            Operator::Multiply => Ok(a * b),
            Operator::Divide => {
                if b == 0.0 {
                    return Err(CalcError::DivisionByZero);
                }
                Ok(a / b)
            }
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Operator {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::from_symbol(s)
    }
}

impl Serialize for Operator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.symbol())
    }
}

impl<'de> Deserialize<'de> for Operator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let symbol = String::deserialize(deserializer)?;
        Operator::from_symbol(&symbol).map_err(serde::de::Error::custom)
    }
}
