//! 动态类型值
//!
//! 事实和规则中的比较值共用同一套表示：标量或标量列表。
//! 整数和浮点数都视为数值，比较时统一转换为 f64。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 标量值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// 数值标量转换为 f64，非数值返回 None
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Bool(_) | Self::Text(_) => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.as_f64().is_some()
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "string",
        }
    }

    fn from_json(value: serde_json::Value) -> std::result::Result<Self, &'static str> {
        match value {
            serde_json::Value::Bool(b) => Ok(Self::Bool(b)),
            serde_json::Value::String(s) => Ok(Self::Text(s)),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(Self::Int(i)),
                None => n.as_f64().map(Self::Float).ok_or("number"),
            },
            other => Err(json_type_name(&other)),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::Text(s) => write!(f, "{:?}", s),
        }
    }
}

/// 事实值或规则比较值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Scalar(Scalar),
    List(Vec<Scalar>),
}

impl Value {
    /// 仅数值标量可转换；列表永远不是数值
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Scalar(s) => s.as_f64(),
            Self::List(_) => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Scalar(s) => s.type_name(),
            Self::List(_) => "list",
        }
    }

    /// 从 JSON 值转换
    ///
    /// `null`、对象和嵌套数组无法表示，返回其 JSON 类型名。
    pub fn from_json(value: serde_json::Value) -> std::result::Result<Self, &'static str> {
        match value {
            serde_json::Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    serde_json::Value::Array(_) => Err("nested array"),
                    other => Scalar::from_json(other),
                })
                .collect::<std::result::Result<Vec<_>, _>>()
                .map(Self::List),
            other => Scalar::from_json(other).map(Self::Scalar),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => write!(f, "{}", s),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Scalar {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Scalar {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Self::Scalar(s)
    }
}

macro_rules! impl_value_from_scalar {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Self::Scalar(Scalar::from(v))
                }
            }
        )*
    };
}

impl_value_from_scalar!(bool, i64, i32, f64, &str, String);

impl<T: Into<Scalar>> From<Vec<T>> for Value {
    /// 列表元素只能是标量
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_keeps_integer_and_float_apart() {
        let int: Value = serde_json::from_value(json!(5)).unwrap();
        let float: Value = serde_json::from_value(json!(5.0)).unwrap();

        assert_eq!(int, Value::Scalar(Scalar::Int(5)));
        assert_eq!(float, Value::Scalar(Scalar::Float(5.0)));
        assert_eq!(int.as_f64(), float.as_f64());
    }

    #[test]
    fn test_deserialize_list() {
        let value: Value = serde_json::from_value(json!(["a", 1, true])).unwrap();
        assert_eq!(
            value,
            Value::List(vec![
                Scalar::Text("a".to_string()),
                Scalar::Int(1),
                Scalar::Bool(true)
            ])
        );
    }

    #[test]
    fn test_object_is_not_a_value() {
        assert!(serde_json::from_value::<Value>(json!({"a": 1})).is_err());
        assert_eq!(Value::from_json(json!({"a": 1})), Err("object"));
        assert_eq!(Value::from_json(json!([[1]])), Err("nested array"));
    }

    #[test]
    fn test_from_json_numbers() {
        assert_eq!(Value::from_json(json!(42)), Ok(Value::from(42)));
        assert_eq!(Value::from_json(json!(4.5)), Ok(Value::from(4.5)));
    }

    #[test]
    fn test_non_numeric_has_no_f64() {
        assert_eq!(Value::from("10").as_f64(), None);
        assert_eq!(Value::from(true).as_f64(), None);
        assert_eq!(Value::from(vec![1, 2]).as_f64(), None);
    }

    #[test]
    fn test_from_vec_keeps_every_element() {
        let value = Value::from(vec![Scalar::from(1), Scalar::from("b"), Scalar::from(2.5)]);
        assert_eq!(
            value,
            Value::List(vec![
                Scalar::Int(1),
                Scalar::Text("b".to_string()),
                Scalar::Float(2.5)
            ])
        );
    }

    #[test]
    fn test_float_parses_exactly() {
        let value: Value = serde_json::from_str("45.378677378706804").unwrap();
        assert_eq!(value, Value::from(45.378677378706804_f64));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from(vec!["a", "b"]).to_string(), r#"["a", "b"]"#);
        assert_eq!(Value::from(3).to_string(), "3");
    }
}
