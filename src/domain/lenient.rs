//! Forgiving serde decoders for the source document.
//!
//! The upstream JSON is hand-maintained and sparse: numbers sometimes arrive
//! as strings, subtrees are missing or have the wrong shape. Each helper here
//! reads the raw `serde_json::Value` first and only then narrows it, so a bad
//! leaf never fails the record. Numbers keep "absent" (`None`) apart from
//! "present but not numeric" (`Some(NaN)`).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::domain::model::PeriodEnd;

/// 數值欄位：null / 缺欄位 / 空字串為 None，無法解析的值為 Some(NaN)
pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(as_number))
}

pub fn as_number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Null => return None,
        Value::String(s) if s.trim().is_empty() => return None,
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Some(parsed.filter(|n| n.is_finite()).unwrap_or(f64::NAN))
}

pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// 子物件：型別不符時退回預設值
pub fn subtree<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.map(decode_or_default).unwrap_or_default())
}

/// 陣列：非陣列視為空；壞掉的元素保留位置，以預設值代替
pub fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items.into_iter().map(decode_or_default).collect(),
        _ => Vec::new(),
    })
}

/// Worker 物件：只有 JSON object 才算存在
pub fn worker<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(obj @ Value::Object(_)) => match serde_json::from_value(obj) {
            Ok(worker) => Some(worker),
            Err(e) => {
                tracing::debug!("Ignoring undecodable worker object: {}", e);
                None
            }
        },
        Some(Value::Null) | None => None,
        Some(other) => {
            tracing::debug!("Ignoring non-object worker value: {}", other);
            None
        }
    })
}

pub fn period_end<'de, D>(deserializer: D) -> Result<PeriodEnd, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => PeriodEnd::Missing,
        Some(Value::String(s)) if s == "null" => PeriodEnd::OpenEnded,
        Some(Value::String(s)) => PeriodEnd::Date(s),
        Some(other) => PeriodEnd::Date(other.to_string()),
    })
}

pub fn decode_or_default<T>(value: Value) -> T
where
    T: DeserializeOwned + Default,
{
    serde_json::from_value(value).unwrap_or_else(|e| {
        tracing::debug!("Falling back to default for malformed value: {}", e);
        T::default()
    })
}
