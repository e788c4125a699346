//! 条件树执行器
//!
//! 对规则条目的 any/all 条件组做短路求值。
//! 空的 any 或 all 列表视为自动满足，条目匹配当且仅当两侧都满足。
//! 操作符错误、缺失事实等问题会直接中止评估，不会被当作"不匹配"。

use crate::error::EvaluationFault;
use crate::evaluator::ConditionEvaluator;
use crate::models::{ConditionGroup, Conditional, FactBag};
use crate::value::{Scalar, Value};

type Result<T> = std::result::Result<T, EvaluationFault>;

/// 允许未定义事实时使用的替代值
static UNDEFINED_FACT: Value = Value::Scalar(Scalar::Bool(false));

/// 单个条件组的评估结果
#[derive(Debug, Clone, Default)]
pub struct EvaluationResult {
    pub matched: bool,
    pub evaluation_trace: Vec<String>,
}

/// 条件树执行器
#[derive(Debug, Clone, Default)]
pub struct RuleExecutor {
    /// 事实缺失时是否以 false 代替
    allow_undefined_facts: bool,
    /// 是否记录详细评估追踪
    trace_enabled: bool,
}

impl RuleExecutor {
    pub fn new(allow_undefined_facts: bool) -> Self {
        Self {
            allow_undefined_facts,
            trace_enabled: false,
        }
    }

    /// 启用评估追踪
    pub fn with_trace(mut self) -> Self {
        self.trace_enabled = true;
        self
    }

    /// 评估条件组
    pub fn evaluate(&self, group: &ConditionGroup, facts: &FactBag) -> Result<EvaluationResult> {
        let mut result = EvaluationResult::default();

        let any_satisfied = if group.any.is_empty() {
            self.trace(&mut result, || "any: 空列表，自动满足".to_string());
            true
        } else {
            self.any(&group.any, facts, &mut result)?
        };

        let all_satisfied = if group.all.is_empty() {
            self.trace(&mut result, || "all: 空列表，自动满足".to_string());
            true
        } else {
            self.all(&group.all, facts, &mut result)?
        };

        result.matched = any_satisfied && all_satisfied;
        Ok(result)
    }

    /// AND 求值，遇到 false 立即返回
    pub fn evaluate_all(&self, conditions: &[Conditional], facts: &FactBag) -> Result<bool> {
        self.all(conditions, facts, &mut EvaluationResult::default())
    }

    /// OR 求值，遇到 true 立即返回
    pub fn evaluate_any(&self, conditions: &[Conditional], facts: &FactBag) -> Result<bool> {
        self.any(conditions, facts, &mut EvaluationResult::default())
    }

    /// 用给定的事实值评估单个条件
    pub fn evaluate_conditional(&self, conditional: &Conditional, fact: &Value) -> Result<bool> {
        let operand = conditional
            .operand()
            .ok_or_else(|| EvaluationFault::MalformedConditional(conditional.fact.clone()))?;

        ConditionEvaluator::evaluate_named(fact, &conditional.operator, operand)
    }

    /// 从事实集合中取出条件引用的值
    pub fn get_fact_value<'a>(
        &self,
        conditional: &Conditional,
        facts: &'a FactBag,
    ) -> Result<&'a Value> {
        match facts.get(&conditional.fact) {
            Some(value) => Ok(value),
            None if self.allow_undefined_facts => Ok(&UNDEFINED_FACT),
            None => Err(EvaluationFault::UndefinedFact(conditional.fact.clone())),
        }
    }

    fn all(
        &self,
        conditions: &[Conditional],
        facts: &FactBag,
        result: &mut EvaluationResult,
    ) -> Result<bool> {
        for (i, conditional) in conditions.iter().enumerate() {
            if !self.check(conditional, facts, result, "all", i)? {
                self.trace(result, || format!("all: AND 短路 - 条件 {} 不匹配", i));
                return Ok(false);
            }
        }

        self.trace(result, || "all: AND 组全部匹配".to_string());
        Ok(true)
    }

    fn any(
        &self,
        conditions: &[Conditional],
        facts: &FactBag,
        result: &mut EvaluationResult,
    ) -> Result<bool> {
        for (i, conditional) in conditions.iter().enumerate() {
            if self.check(conditional, facts, result, "any", i)? {
                self.trace(result, || format!("any: OR 短路 - 条件 {} 匹配", i));
                return Ok(true);
            }
        }

        self.trace(result, || "any: OR 组无匹配".to_string());
        Ok(false)
    }

    fn check(
        &self,
        conditional: &Conditional,
        facts: &FactBag,
        result: &mut EvaluationResult,
        group: &str,
        index: usize,
    ) -> Result<bool> {
        let fact = self.get_fact_value(conditional, facts)?;
        let matched = self.evaluate_conditional(conditional, fact)?;

        self.trace(result, || {
            format!(
                "{}[{}]: {} {} {} (实际 {}) => {}",
                group,
                index,
                conditional.fact,
                conditional.operator,
                conditional
                    .value
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
                fact,
                if matched { "MATCHED" } else { "NOT_MATCHED" }
            )
        });

        Ok(matched)
    }

    fn trace(&self, result: &mut EvaluationResult, line: impl FnOnce() -> String) {
        if self.trace_enabled {
            result.evaluation_trace.push(line());
        }
    }
}
