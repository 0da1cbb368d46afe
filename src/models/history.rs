//! 历史记录
//!
//! 历史由计算服务持有，客户端拿到的只是某一时刻的只读快照。

use serde::{Deserialize, Serialize};

use crate::models::operator::Operator;

/// 一次已完成运算的记录，创建后不再修改
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub num1: f64,
    pub operator: Operator,
    pub num2: f64,
    pub result: f64,
}

impl HistoryEntry {
    pub fn new(num1: f64, operator: Operator, num2: f64, result: f64) -> Self {
        Self {
            num1,
            operator,
            num2,
            result,
        }
    }
}

impl std::fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} = {}",
            self.num1, self.operator, self.num2, self.result
        )
    }
}

/// 历史快照，按插入顺序（最旧在前）
///
/// 可以反复迭代；需要最新在前的调用方使用 [`History::newest_first`]。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new(entries: Vec<HistoryEntry>) -> Self {
        Self { entries }
    }

    /// 按插入顺序迭代
    pub fn iter(&self) -> std::slice::Iter<'_, HistoryEntry> {
        self.entries.iter()
    }

    /// 最新的记录在前
    pub fn newest_first(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_slice(&self) -> &[HistoryEntry] {
        &self.entries
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a HistoryEntry;
    type IntoIter = std::slice::Iter<'a, HistoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for History {
    type Item = HistoryEntry;
    type IntoIter = std::vec::IntoIter<HistoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
