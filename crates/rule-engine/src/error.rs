//! 规则引擎错误类型
//!
//! 分为两类：
//! - [`DecodeError`]：规则文档或事实数据无法解析，可恢复，不会触碰引擎状态
//! - [`EvaluationFault`]：规则本身有缺陷，评估过程中止，必须交给调用方处理

use thiserror::Error;

/// 文档解析错误
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("规则文档解析失败: {0}")]
    Json(#[from] serde_json::Error),

    #[error("规则块缺少 uuid")]
    MissingId,

    #[error("文档顶层必须是 JSON 对象")]
    NotAnObject,

    #[error("事实 {fact} 的类型不受支持: {kind}")]
    UnsupportedFact { fact: String, kind: &'static str },
}

/// 评估中止错误
///
/// 这些错误代表规则编写缺陷，而不是业务上的"不匹配"，
/// 引擎内部不会把它们转换为 `false`。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationFault {
    #[error("操作符 {operator} 需要数值操作数, 实际为 {actual}")]
    OperandType {
        operator: String,
        actual: &'static str,
    },

    #[error("无法识别的操作符: {0}")]
    UnknownOperator(String),

    #[error("事实不存在: {0}")]
    UndefinedFact(String),

    #[error("条件 {0} 缺少比较值")]
    MalformedConditional(String),
}

impl EvaluationFault {
    /// 用于日志和指标的错误类别
    pub fn kind(&self) -> &'static str {
        match self {
            Self::OperandType { .. } => "operand_type",
            Self::UnknownOperator(_) => "unknown_operator",
            Self::UndefinedFact(_) => "undefined_fact",
            Self::MalformedConditional(_) => "malformed_conditional",
        }
    }
}

/// 规则引擎统一错误
#[derive(Debug, Error)]
pub enum RuleError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("规则执行失败: {0}")]
    Evaluation(#[from] EvaluationFault),
}

pub type Result<T> = std::result::Result<T, RuleError>;
