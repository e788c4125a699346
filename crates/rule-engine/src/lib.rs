//! 规则块评估引擎
//!
//! 提供可嵌入的规则评估能力：
//! - JSON 规则块解析
//! - any/all 条件组短路求值
//! - 整数与浮点数统一比较的操作符模型
//! - 单锁保护、按插入顺序遍历的规则存储
//!
//! 引擎只负责找出匹配的规则条目，动作的执行由调用方决定。

pub mod engine;
pub mod error;
pub mod evaluator;
pub mod executor;
pub mod models;
pub mod operators;
pub mod store;
pub mod value;

pub use engine::{EngineOptions, RuleEngine};
pub use error::{DecodeError, EvaluationFault, Result, RuleError};
pub use evaluator::ConditionEvaluator;
pub use executor::{EvaluationResult, RuleExecutor};
pub use models::{Action, ConditionGroup, Conditional, FactBag, RuleBlock, RuleEntry, RuleMatch};
pub use operators::Operator;
pub use store::RuleStore;
pub use value::{Scalar, Value};

/// 创建规则引擎
pub fn new_engine(options: EngineOptions) -> RuleEngine {
    RuleEngine::new(options)
}
