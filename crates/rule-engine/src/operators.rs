//! 规则操作符定义

use crate::error::EvaluationFault;
use std::fmt;
use std::str::FromStr;

/// 条件操作符
///
/// 规则文档中保存的是原始字符串，评估时再解析，
/// 这样未知操作符会作为评估错误暴露出来，而不是在加载时被拒绝。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    // 通用比较
    Eq,
    Neq,

    // 数值比较
    Gt,
    Gte,
    Lt,
    Lte,

    // 成员检查
    AnyOf,
    NoneOf,
}

impl Operator {
    /// 是否为只接受数值的排序操作符
    pub fn is_ordering(self) -> bool {
        matches!(self, Self::Gt | Self::Gte | Self::Lt | Self::Lte)
    }
}

impl FromStr for Operator {
    type Err = EvaluationFault;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eq" | "=" => Ok(Self::Eq),
            "neq" | "!=" => Ok(Self::Neq),
            "gt" | ">" => Ok(Self::Gt),
            "gte" | ">=" => Ok(Self::Gte),
            "lt" | "<" => Ok(Self::Lt),
            "lte" | "<=" => Ok(Self::Lte),
            "anyof" => Ok(Self::AnyOf),
            "noneof" => Ok(Self::NoneOf),
            other => Err(EvaluationFault::UnknownOperator(other.to_string())),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::AnyOf => "anyof",
            Self::NoneOf => "noneof",
        };
        write!(f, "{}", s)
    }
}
