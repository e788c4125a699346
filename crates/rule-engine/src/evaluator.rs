//! 条件评估器
//!
//! 实现各操作符的比较逻辑。整数与浮点数统一按 f64 比较；
//! 只有排序操作符会因为操作数类型不对而报错，其余操作符都是全函数。

use crate::error::EvaluationFault;
use crate::operators::Operator;
use crate::value::{Scalar, Value};

type Result<T> = std::result::Result<T, EvaluationFault>;

/// 条件评估器
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// 评估条件
    ///
    /// # Arguments
    /// * `fact` - 从事实集合中取出的值
    /// * `operator` - 操作符
    /// * `operand` - 规则中定义的比较值
    pub fn evaluate(fact: &Value, operator: Operator, operand: &Value) -> Result<bool> {
        match operator {
            Operator::Eq => Ok(Self::eq(fact, operand)),
            Operator::Neq => Ok(!Self::eq(fact, operand)),
            Operator::Gt => Self::compare(operator, fact, operand, |a, b| a > b),
            Operator::Gte => Self::compare(operator, fact, operand, |a, b| a >= b),
            Operator::Lt => Self::compare(operator, fact, operand, |a, b| a < b),
            Operator::Lte => Self::compare(operator, fact, operand, |a, b| a <= b),
            Operator::AnyOf => Ok(Self::any_of(fact, operand)),
            Operator::NoneOf => Ok(Self::none_of(fact, operand)),
        }
    }

    /// 按操作符名称评估，未知名称返回 `UnknownOperator`
    pub fn evaluate_named(fact: &Value, operator: &str, operand: &Value) -> Result<bool> {
        let operator: Operator = operator.parse()?;
        Self::evaluate(fact, operator, operand)
    }

    /// 将值转换为 f64，非数值返回 `OperandType`
    pub fn assert_numeric(operator: Operator, value: &Value) -> Result<f64> {
        value.as_f64().ok_or_else(|| EvaluationFault::OperandType {
            operator: operator.to_string(),
            actual: value.type_name(),
        })
    }

    /// 相等比较
    ///
    /// 形状不同（列表对标量）时直接视为不相等。
    fn eq(fact: &Value, operand: &Value) -> bool {
        match (fact, operand) {
            (Value::Scalar(a), Value::Scalar(b)) => Self::scalar_eq(a, b),
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| Self::scalar_eq(x, y))
            }
            _ => false,
        }
    }

    fn scalar_eq(a: &Scalar, b: &Scalar) -> bool {
        // 100 == 100.0
        if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
            return x == y;
        }
        a == b
    }

    /// 数值比较
    fn compare<F>(operator: Operator, fact: &Value, operand: &Value, cmp: F) -> Result<bool>
    where
        F: Fn(f64, f64) -> bool,
    {
        let fact_num = Self::assert_numeric(operator, fact)?;
        let operand_num = Self::assert_numeric(operator, operand)?;

        Ok(cmp(fact_num, operand_num))
    }

    /// 成员检查 (anyof)，标量比较值退化为 eq
    fn any_of(fact: &Value, operand: &Value) -> bool {
        match operand {
            Value::List(items) => Self::contains(fact, items),
            Value::Scalar(_) => Self::eq(fact, operand),
        }
    }

    /// 成员排除 (noneof)，标量比较值退化为 neq
    fn none_of(fact: &Value, operand: &Value) -> bool {
        match operand {
            Value::List(items) => !Self::contains(fact, items),
            Value::Scalar(_) => !Self::eq(fact, operand),
        }
    }

    /// 列表中是否存在与事实相等的元素
    ///
    /// 数值事实只与数值元素比较，非数值元素跳过；
    /// 非数值事实要求元素完全相等。
    fn contains(fact: &Value, items: &[Scalar]) -> bool {
        match fact {
            Value::Scalar(s) => match s.as_f64() {
                Some(n) => items.iter().filter_map(Scalar::as_f64).any(|v| v == n),
                None => items.iter().any(|item| item == s),
            },
            Value::List(_) => false,
        }
    }
}
