//! 规则引擎领域模型
//!
//! 规则文档的 JSON 结构：
//!
//! ```json
//! {
//!   "ruleType": "alert",
//!   "ruleSubType": "threshold",
//!   "name": "high_temperature",
//!   "uuid": "6a1f...",
//!   "description": "...",
//!   "lastModifiedTime": 1700000000000,
//!   "state": true,
//!   "payload": [
//!     {
//!       "condition": {
//!         "any": [],
//!         "all": [{ "identifier": "temp", "operator": "gt", "value": 40 }]
//!       },
//!       "actions": [{ "type": "notify", "payload": { "channel": "ops" } }]
//!     }
//!   ]
//! }
//! ```

use crate::error::{DecodeError, EvaluationFault};
use crate::operators::Operator;
use crate::value::Value;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// 单个比较条件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conditional {
    #[serde(rename = "identifier", alias = "fact")]
    pub fact: String,
    pub operator: String,
    /// 缺失时在评估阶段报告 `MalformedConditional`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl Conditional {
    pub fn new(
        fact: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            fact: fact.into(),
            operator: operator.into(),
            value: Some(value.into()),
        }
    }

    /// 比较值，空列表与缺失同等对待
    pub fn operand(&self) -> Option<&Value> {
        match &self.value {
            Some(Value::List(items)) if items.is_empty() => None,
            other => other.as_ref(),
        }
    }

    fn validate(&self) -> Result<(), EvaluationFault> {
        let operator: Operator = self.operator.parse()?;
        let operand = self
            .operand()
            .ok_or_else(|| EvaluationFault::MalformedConditional(self.fact.clone()))?;

        if operator.is_ordering() && operand.as_f64().is_none() {
            return Err(EvaluationFault::OperandType {
                operator: operator.to_string(),
                actual: operand.type_name(),
            });
        }
        Ok(())
    }
}

/// 条件组：any 为 OR，all 为 AND
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionGroup {
    #[serde(default)]
    pub any: Vec<Conditional>,
    #[serde(default)]
    pub all: Vec<Conditional>,
}

impl ConditionGroup {
    pub fn new(any: Vec<Conditional>, all: Vec<Conditional>) -> Self {
        Self { any, all }
    }

    pub fn all(conditions: Vec<Conditional>) -> Self {
        Self::new(Vec::new(), conditions)
    }

    pub fn any(conditions: Vec<Conditional>) -> Self {
        Self::new(conditions, Vec::new())
    }
}

/// 匹配后交给调用方的动作，引擎不解释其内容
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl Action {
    pub fn new(action_type: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            action_type: action_type.into(),
            payload,
        }
    }
}

/// 规则条目：条件组 + 动作
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleEntry {
    /// 必填，缺失的条目无法解析
    pub condition: ConditionGroup,
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl RuleEntry {
    pub fn new(condition: ConditionGroup, actions: Vec<Action>) -> Self {
        Self { condition, actions }
    }
}

fn default_state() -> bool {
    true
}

/// 规则块，存储和删除的基本单位，以 uuid 标识
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleBlock {
    #[serde(default)]
    pub rule_type: String,
    #[serde(default)]
    pub rule_sub_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub description: String,
    /// 毫秒时间戳
    #[serde(default)]
    pub last_modified_time: i64,
    /// 为 false 时不参与评估
    #[serde(default = "default_state")]
    pub state: bool,
    #[serde(rename = "payload", default)]
    pub entries: Vec<RuleEntry>,
}

impl RuleBlock {
    pub fn new(name: impl Into<String>, entries: Vec<RuleEntry>) -> Self {
        Self {
            rule_type: String::new(),
            rule_sub_type: String::new(),
            name: name.into(),
            uuid: Uuid::new_v4().to_string(),
            description: String::new(),
            last_modified_time: Utc::now().timestamp_millis(),
            state: true,
            entries,
        }
    }

    /// 从 JSON 文档解析
    pub fn from_json(json: &str) -> Result<Self, DecodeError> {
        let block: Self = serde_json::from_value(parse_object(json)?)?;
        if block.uuid.is_empty() {
            return Err(DecodeError::MissingId);
        }
        Ok(block)
    }

    pub fn to_json(&self) -> Result<String, DecodeError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn is_enabled(&self) -> bool {
        self.state
    }

    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.last_modified_time)
    }

    /// 静态检查规则块，返回评估时必然中止的问题
    ///
    /// 不依赖事实即可发现：未知操作符、缺失比较值、排序操作符配非数值比较值。
    pub fn validate(&self) -> Vec<EvaluationFault> {
        self.entries
            .iter()
            .flat_map(|entry| entry.condition.any.iter().chain(&entry.condition.all))
            .filter_map(|conditional| conditional.validate().err())
            .collect()
    }
}

/// 删除请求只需要 uuid，完整的规则块文档同样可以解析
#[derive(Debug, Deserialize)]
pub(crate) struct RuleBlockId {
    #[serde(default)]
    pub uuid: String,
}

impl RuleBlockId {
    pub(crate) fn from_json(json: &str) -> Result<String, DecodeError> {
        let id: Self = serde_json::from_value(parse_object(json)?)?;
        if id.uuid.is_empty() {
            return Err(DecodeError::MissingId);
        }
        Ok(id.uuid)
    }
}

/// 解析 JSON 文档，顶层必须是对象
fn parse_object(json: &str) -> Result<serde_json::Value, DecodeError> {
    let data: serde_json::Value = serde_json::from_str(json)?;
    if !data.is_object() {
        return Err(DecodeError::NotAnObject);
    }
    Ok(data)
}

/// 事实集合 - 调用方在评估时提供的数据
#[derive(Debug, Clone, Default)]
pub struct FactBag {
    facts: HashMap<String, Value>,
}

impl FactBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 JSON 对象创建
    ///
    /// `null` 成员视为不存在；对象和嵌套数组无法比较，直接拒绝。
    pub fn from_json(json: &str) -> Result<Self, DecodeError> {
        let data: serde_json::Value = serde_json::from_str(json)?;
        let serde_json::Value::Object(map) = data else {
            return Err(DecodeError::NotAnObject);
        };

        let mut facts = HashMap::with_capacity(map.len());
        for (fact, value) in map {
            if value.is_null() {
                continue;
            }
            let value = Value::from_json(value)
                .map_err(|kind| DecodeError::UnsupportedFact { fact: fact.clone(), kind })?;
            facts.insert(fact, value);
        }

        Ok(Self { facts })
    }

    pub fn with(mut self, fact: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(fact, value);
        self
    }

    pub fn insert(&mut self, fact: impl Into<String>, value: impl Into<Value>) {
        self.facts.insert(fact.into(), value.into());
    }

    pub fn get(&self, fact: &str) -> Option<&Value> {
        self.facts.get(fact)
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for FactBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            facts: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// 匹配结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleMatch {
    pub block_id: String,
    pub entry: RuleEntry,
}

impl RuleMatch {
    pub fn actions(&self) -> &[Action] {
        &self.entry.actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BLOCK_JSON: &str = r#"
    {
        "ruleType": "alert",
        "ruleSubType": "threshold",
        "name": "neptune_black",
        "uuid": "block-001",
        "description": "dark planets",
        "lastModifiedTime": 1700000000000,
        "state": true,
        "payload": [
            {
                "condition": {
                    "any": [],
                    "all": [
                        {"identifier": "planet", "operator": "eq", "value": "Neptune"},
                        {"identifier": "colour", "operator": "eq", "value": "black"}
                    ]
                },
                "actions": [
                    {"type": "notify", "payload": {"channel": "astro"}}
                ]
            }
        ]
    }
    "#;

    #[test]
    fn test_rule_block_deserialization() {
        let block = RuleBlock::from_json(BLOCK_JSON).unwrap();

        assert_eq!(block.uuid, "block-001");
        assert_eq!(block.name, "neptune_black");
        assert_eq!(block.rule_type, "alert");
        assert_eq!(block.rule_sub_type, "threshold");
        assert!(block.is_enabled());
        assert_eq!(block.entries.len(), 1);

        let entry = &block.entries[0];
        assert!(entry.condition.any.is_empty());
        assert_eq!(entry.condition.all[0].fact, "planet");
        assert_eq!(entry.condition.all[0].value, Some(Value::from("Neptune")));
        assert_eq!(entry.actions[0].action_type, "notify");
        assert_eq!(entry.actions[0].payload, json!({"channel": "astro"}));
    }

    #[test]
    fn test_rule_block_round_trip() {
        let block = RuleBlock::from_json(BLOCK_JSON).unwrap();
        let json = block.to_json().unwrap();
        let parsed = RuleBlock::from_json(&json).unwrap();

        assert_eq!(parsed.uuid, block.uuid);
        assert_eq!(parsed.name, block.name);
        assert_eq!(parsed.entries, block.entries);
    }

    #[test]
    fn test_float_operand_round_trip() {
        let json = r#"{"uuid": "b1", "payload": [{"condition": {"all": [
            {"identifier": "lat", "operator": "eq", "value": 45.378677378706804}
        ]}}]}"#;
        let block = RuleBlock::from_json(json).unwrap();
        let expected = Value::from(45.378677378706804_f64);

        assert_eq!(block.entries[0].condition.all[0].value, Some(expected.clone()));

        let parsed = RuleBlock::from_json(&block.to_json().unwrap()).unwrap();
        assert_eq!(parsed.entries[0].condition.all[0].value, Some(expected));
        assert_eq!(parsed.entries, block.entries);
    }

    #[test]
    fn test_entry_without_condition_is_decode_error() {
        let err =
            RuleBlock::from_json(r#"{"uuid": "b1", "payload": [{"actions": []}]}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));

        // 条件组内部的 any/all 仍可省略
        let block =
            RuleBlock::from_json(r#"{"uuid": "b1", "payload": [{"condition": {}}]}"#).unwrap();
        assert_eq!(block.entries[0].condition, ConditionGroup::default());
        assert!(block.entries[0].actions.is_empty());
    }

    #[test]
    fn test_array_document_is_rejected() {
        let err = RuleBlock::from_json(r#"["t", "s", "n", "u1"]"#).unwrap_err();
        assert!(matches!(err, DecodeError::NotAnObject));

        let err = RuleBlockId::from_json(r#"["b1"]"#).unwrap_err();
        assert!(matches!(err, DecodeError::NotAnObject));
    }

    #[test]
    fn test_fact_alias_accepted() {
        let cond: Conditional =
            serde_json::from_str(r#"{"fact": "age", "operator": "gte", "value": 18}"#).unwrap();
        assert_eq!(cond, Conditional::new("age", "gte", 18));

        let json = serde_json::to_value(&cond).unwrap();
        assert_eq!(json["identifier"], json!("age"));
    }

    #[test]
    fn test_missing_operand() {
        let cond: Conditional =
            serde_json::from_str(r#"{"identifier": "age", "operator": "eq"}"#).unwrap();
        assert!(cond.operand().is_none());

        let cond: Conditional =
            serde_json::from_str(r#"{"identifier": "age", "operator": "anyof", "value": []}"#)
                .unwrap();
        assert!(cond.operand().is_none());
    }

    #[test]
    fn test_state_defaults_to_enabled() {
        let block = RuleBlock::from_json(r#"{"uuid": "b1", "payload": []}"#).unwrap();
        assert!(block.is_enabled());
        assert_eq!(block.last_modified_time, 0);
    }

    #[test]
    fn test_missing_uuid_is_decode_error() {
        let err = RuleBlock::from_json(r#"{"name": "x"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingId));

        let err = RuleBlockId::from_json(r#"{"uuid": ""}"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingId));
    }

    #[test]
    fn test_invalid_json_is_decode_error() {
        let err = RuleBlock::from_json("{not json").unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }

    #[test]
    fn test_validate() {
        let block = RuleBlock::new(
            "faulty",
            vec![RuleEntry::new(
                ConditionGroup::new(
                    vec![Conditional::new("planet", "like", "Nep")],
                    vec![
                        Conditional::new("age", "lt", "abc"),
                        Conditional::new("age", "gte", 18),
                        Conditional {
                            fact: "colour".to_string(),
                            operator: "eq".to_string(),
                            value: None,
                        },
                    ],
                ),
                Vec::new(),
            )],
        );

        let problems = block.validate();
        assert_eq!(
            problems,
            vec![
                EvaluationFault::UnknownOperator("like".to_string()),
                EvaluationFault::OperandType {
                    operator: "lt".to_string(),
                    actual: "string",
                },
                EvaluationFault::MalformedConditional("colour".to_string()),
            ]
        );
        assert!(RuleBlock::from_json(BLOCK_JSON).unwrap().validate().is_empty());
    }

    #[test]
    fn test_rule_block_new() {
        let block = RuleBlock::new("generated", vec![RuleEntry::default()]);
        assert!(Uuid::parse_str(&block.uuid).is_ok());
        assert!(block.last_modified().is_some());
    }

    #[test]
    fn test_fact_bag_from_json() {
        let facts = FactBag::from_json(
            r#"{"planet": "Neptune", "moons": 16, "mass": 1.02e26, "ringed": true, "tags": ["ice", "giant"], "discoverer": null}"#,
        )
        .unwrap();

        assert_eq!(facts.len(), 5);
        assert_eq!(facts.get("planet"), Some(&Value::from("Neptune")));
        assert_eq!(facts.get("moons"), Some(&Value::from(16)));
        assert_eq!(facts.get("tags"), Some(&Value::from(vec!["ice", "giant"])));
        assert!(facts.get("discoverer").is_none());
    }

    #[test]
    fn test_fact_bag_rejects_unsupported() {
        let err = FactBag::from_json(r#"{"orbit": {"period": 165}}"#).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::UnsupportedFact { ref fact, kind: "object" } if fact == "orbit"
        ));

        let err = FactBag::from_json("[1, 2]").unwrap_err();
        assert!(matches!(err, DecodeError::NotAnObject));
    }

    #[test]
    fn test_fact_bag_from_iter() {
        let facts: FactBag = [("a", 1), ("b", 2)].into_iter().collect();
        assert_eq!(facts.get("b"), Some(&Value::from(2)));
    }
}
