//! 链式求值
//!
//! 纯函数，无副作用。单步运算与长度为 1 的链走同一个折叠，结果必然一致。

use tracing::debug;

use crate::error::CalcResult;
use crate::models::{Chain, HistoryEntry, Operator};

/// 单次运算
pub fn calculate(num1: f64, num2: f64, operator: Operator) -> CalcResult<f64> {
    let result = operator.apply(num1, num2)?;
    debug!(num1, num2, %operator, result, "单步运算完成");
    Ok(result)
}

/// 对整条链从左到右折叠
///
/// 任一步失败（例如除以零）整条链失败，不会用哨兵值替代。
pub fn evaluate(chain: &Chain) -> CalcResult<f64> {
    evaluate_with(chain, |_| {})
}

/// 折叠整条链，每完成一步回调一次
///
/// 回调收到的记录中 `num1` 为上一步的累积值。失败时已完成的步骤已经回调过。
pub fn evaluate_with<F>(chain: &Chain, mut on_step: F) -> CalcResult<f64>
where
    F: FnMut(HistoryEntry),
{
    let mut acc = chain.initial();

    for (index, step) in chain.steps().iter().enumerate() {
        let result = calculate(acc, step.num2, step.operator).map_err(|e| {
            debug!(step = index + 1, error = %e, "运算链中断");
            e
        })?;
        on_step(HistoryEntry::new(acc, step.operator, step.num2, result));
        acc = result;
    }

    debug!(steps = chain.len(), result = acc, "运算链求值完成");
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CalcError;
    use crate::models::ChainStep;

    #[test]
    fn test_two_steps() {
        let chain = Chain::single(2.0, Operator::Add, 3.0).then(Operator::Multiply, 4.0);
        assert_eq!(evaluate(&chain).unwrap(), 20.0);
    }

    #[test]
    fn test_no_operator_precedence() {
        // ((10 + 5) * 2) - 3
        let chain = Chain::single(10.0, Operator::Add, 5.0)
            .then(Operator::Multiply, 2.0)
            .then(Operator::Subtract, 3.0);
        assert_eq!(evaluate(&chain).unwrap(), 27.0);
    }

    #[test]
    fn test_four_steps() {
        // (((100 - 50) / 2) * 3) + 10
        let chain = Chain::single(100.0, Operator::Subtract, 50.0)
            .then(Operator::Divide, 2.0)
            .then(Operator::Multiply, 3.0)
            .then(Operator::Add, 10.0);
        assert_eq!(evaluate(&chain).unwrap(), 85.0);
    }

    #[test]
    fn test_decimals() {
        let chain = Chain::single(5.5, Operator::Add, 2.5).then(Operator::Multiply, 2.0);
        assert_eq!(evaluate(&chain).unwrap(), 16.0);
    }

    #[test]
    fn test_single_step_matches_simple_calculation() {
        let operands = [(10.0, 5.0), (-3.5, 2.25), (0.0, 7.0), (1e300, 1e10)];
        for (a, b) in operands {
            for op in Operator::all() {
                let chain = Chain::single(a, op, b);
                assert_eq!(evaluate(&chain), calculate(a, b, op), "{} {} {}", a, op, b);
            }
        }
    }

    #[test]
    fn test_division_by_zero_anywhere_fails_whole_chain() {
        let first = Chain::single(10.0, Operator::Divide, 0.0).then(Operator::Add, 1.0);
        let middle = Chain::single(10.0, Operator::Add, 5.0)
            .then(Operator::Divide, 0.0)
            .then(Operator::Add, 1.0);
        let last = Chain::single(10.0, Operator::Add, 5.0).then(Operator::Divide, 0.0);

        for chain in [first, middle, last] {
            assert_eq!(evaluate(&chain), Err(CalcError::DivisionByZero));
        }
    }

    #[test]
    fn test_zero_numerator_is_fine() {
        let chain = Chain::single(0.0, Operator::Divide, 5.0);
        assert_eq!(evaluate(&chain).unwrap(), 0.0);
    }

    #[test]
    fn test_on_step_sees_accumulated_left_operand() {
        let chain = Chain::new(vec![
            ChainStep::first(10.0, Operator::Add, 5.0),
            ChainStep::next(Operator::Multiply, 2.0),
        ])
        .unwrap();

        let mut steps = Vec::new();
        let result = evaluate_with(&chain, |entry| steps.push(entry)).unwrap();

        assert_eq!(result, 30.0);
        assert_eq!(
            steps,
            vec![
                HistoryEntry::new(10.0, Operator::Add, 5.0, 15.0),
                HistoryEntry::new(15.0, Operator::Multiply, 2.0, 30.0),
            ]
        );
    }

    #[test]
    fn test_on_step_stops_at_failure() {
        let chain = Chain::single(10.0, Operator::Add, 5.0)
            .then(Operator::Divide, 0.0)
            .then(Operator::Add, 1.0);

        let mut count = 0;
        let result = evaluate_with(&chain, |_| count += 1);

        assert_eq!(result, Err(CalcError::DivisionByZero));
        assert_eq!(count, 1);
    }
}
