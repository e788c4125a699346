//! 规则引擎
//!
//! 单把互斥锁保护整个规则块存储，`add_rule`、`delete_rule` 和 `evaluate_rules`
//! 在整个调用期间持有该锁，三类操作严格串行。评估较慢的规则会阻塞写入方。
//!
//! 规则块按插入顺序遍历，所以多个规则块同时匹配时"第一个匹配"也是确定的。
//! 停用（`state = false`）的规则块不参与评估。

use crate::error::{self, DecodeError, EvaluationFault};
use crate::executor::RuleExecutor;
use crate::models::{FactBag, RuleBlock, RuleBlockId, RuleMatch};
use crate::store::RuleStore;
use parking_lot::Mutex;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

/// 评估选项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct EngineOptions {
    /// 事实缺失时以 `false` 代替，否则中止评估
    #[serde(default)]
    pub allow_undefined_facts: bool,
    /// 找到第一个匹配后立即返回
    #[serde(default = "default_first_match_only")]
    pub first_match_only: bool,
}

fn default_first_match_only() -> bool {
    true
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            allow_undefined_facts: false,
            first_match_only: default_first_match_only(),
        }
    }
}

/// 规则引擎
#[derive(Debug, Default)]
pub struct RuleEngine {
    options: EngineOptions,
    store: Mutex<RuleStore>,
}

impl RuleEngine {
    pub fn new(options: EngineOptions) -> Self {
        Self {
            options,
            store: Mutex::new(RuleStore::new()),
        }
    }

    pub fn options(&self) -> EngineOptions {
        self.options
    }

    /// 解析规则文档并插入，同 uuid 的规则块会被整体替换
    #[instrument(skip(self, document))]
    pub fn add_rule(&self, document: &str) -> Result<&Self, DecodeError> {
        let block = RuleBlock::from_json(document).inspect_err(|e| {
            warn!(error = %e, "规则文档解析失败");
        })?;
        Ok(self.add_rule_block(block))
    }

    /// 插入已构造好的规则块
    #[instrument(skip(self, block), fields(rule_id = %block.uuid, rule_name = %block.name))]
    pub fn add_rule_block(&self, block: RuleBlock) -> &Self {
        let mut store = self.store.lock();
        let replaced = store.insert(block).is_some();
        metrics::gauge!("rule_engine_rule_blocks").set(store.len() as f64);

        if replaced {
            info!("规则块已替换");
        } else {
            info!("规则块已加载");
        }
        self
    }

    /// 解析删除请求（只使用 uuid）并移除规则块
    ///
    /// 返回是否真的删除了规则块；不存在时不做任何事。
    #[instrument(skip(self, document))]
    pub fn delete_rule(&self, document: &str) -> Result<bool, DecodeError> {
        let id = RuleBlockId::from_json(document).inspect_err(|e| {
            warn!(error = %e, "删除请求解析失败");
        })?;
        Ok(self.delete_rule_by_id(&id))
    }

    /// 按 uuid 删除规则块
    #[instrument(skip(self))]
    pub fn delete_rule_by_id(&self, id: &str) -> bool {
        let mut store = self.store.lock();
        let removed = store.remove(id).is_some();
        metrics::gauge!("rule_engine_rule_blocks").set(store.len() as f64);

        if removed {
            info!("规则块已删除: {}", id);
        } else {
            warn!("删除不存在的规则块: {}", id);
        }
        removed
    }

    /// 查找第一个匹配的规则条目
    ///
    /// `first_match_only` 关闭时会评估全部规则块（因此后面规则块中的错误也会暴露），
    /// 仍只返回第一个匹配；需要全部匹配时使用 [`Self::evaluate_all_rules`]。
    pub fn evaluate_rules(&self, facts: &FactBag) -> Result<Option<RuleMatch>, EvaluationFault> {
        Ok(self.collect_matches(facts)?.into_iter().next())
    }

    /// 收集匹配的规则条目
    ///
    /// `first_match_only` 开启时最多返回一个。
    pub fn evaluate_all_rules(&self, facts: &FactBag) -> Result<Vec<RuleMatch>, EvaluationFault> {
        self.collect_matches(facts)
    }

    /// 解析 JSON 事实对象后收集匹配，解析错误和评估错误统一为 [`crate::RuleError`]
    pub fn evaluate_json(&self, facts: &str) -> error::Result<Vec<RuleMatch>> {
        let facts = FactBag::from_json(facts).inspect_err(|e| {
            warn!(error = %e, "事实数据解析失败");
        })?;
        Ok(self.collect_matches(&facts)?)
    }

    #[instrument(skip_all, fields(facts = facts.len()))]
    fn collect_matches(&self, facts: &FactBag) -> Result<Vec<RuleMatch>, EvaluationFault> {
        let executor = RuleExecutor::new(self.options.allow_undefined_facts);
        let executor = if tracing::enabled!(tracing::Level::TRACE) {
            executor.with_trace()
        } else {
            executor
        };

        let store = self.store.lock();
        let mut matches = Vec::new();

        for block in store.iter().filter(|b| b.is_enabled()) {
            for (i, entry) in block.entries.iter().enumerate() {
                let result = executor.evaluate(&entry.condition, facts).inspect_err(|e| {
                    warn!(rule_id = %block.uuid, entry = i, error = %e, "规则评估中止");
                    metrics::counter!("rule_engine_faults_total", "kind" => e.kind()).increment(1);
                })?;

                for line in &result.evaluation_trace {
                    tracing::trace!(rule_id = %block.uuid, entry = i, "{}", line);
                }

                if result.matched {
                    debug!(rule_id = %block.uuid, entry = i, "规则条目匹配");
                    matches.push(RuleMatch {
                        block_id: block.uuid.clone(),
                        entry: entry.clone(),
                    });

                    if self.options.first_match_only {
                        metrics::counter!("rule_engine_evaluations_total", "outcome" => "matched")
                            .increment(1);
                        return Ok(matches);
                    }
                }
            }
        }

        let outcome = if matches.is_empty() { "no_match" } else { "matched" };
        metrics::counter!("rule_engine_evaluations_total", "outcome" => outcome).increment(1);
        Ok(matches)
    }

    /// 获取规则块副本
    pub fn get(&self, id: &str) -> Option<RuleBlock> {
        self.store.lock().get(id).cloned()
    }

    /// 所有规则块 uuid（插入顺序）
    pub fn rule_ids(&self) -> Vec<String> {
        self.store.lock().ids()
    }

    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }

    /// 清空所有规则块
    #[instrument(skip(self))]
    pub fn clear(&self) {
        let mut store = self.store.lock();
        let count = store.len();
        store.clear();
        metrics::gauge!("rule_engine_rule_blocks").set(0.0);
        info!("已清空 {} 个规则块", count);
    }
}
