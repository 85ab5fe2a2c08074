//! Safe helper functions for extracting values from JSON
//!
//! Venue payloads are loosely typed: numbers arrive as strings or JSON numbers,
//! keys go missing, `null` means "unknown". These helpers never panic and never
//! invent a value; a missing or unusable field is `None`.

use serde_json::Value;

use super::precise::Precise;

/// 안전한 문자열 추출
pub fn safe_string(obj: &Value, key: &str) -> Option<String> {
    obj.get(key).and_then(value_to_string)
}

/// 두 키 중 하나에서 문자열 추출
pub fn safe_string2(obj: &Value, key1: &str, key2: &str) -> Option<String> {
    safe_string(obj, key1).or_else(|| safe_string(obj, key2))
}

/// N개 키 중 하나에서 문자열 추출
pub fn safe_string_n(obj: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| safe_string(obj, k))
}

/// 소문자 문자열 추출
pub fn safe_string_lower(obj: &Value, key: &str) -> Option<String> {
    safe_string(obj, key).map(|s| s.to_lowercase())
}

/// 대문자 문자열 추출
pub fn safe_string_upper(obj: &Value, key: &str) -> Option<String> {
    safe_string(obj, key).map(|s| s.to_uppercase())
}

/// Scalar JSON value as a string; `null`, arrays and objects yield `None`
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Decimal-string field, validated
///
/// A value that is present but not a decimal number degrades to `None`
/// rather than being passed along or coerced to zero.
pub fn safe_number(obj: &Value, key: &str) -> Option<String> {
    let raw = safe_string(obj, key)?;
    match Precise::parse(&raw) {
        Ok(number) => Some(number.to_string()),
        Err(_) => {
            tracing::trace!(field = key, value = %raw, "non-numeric field degraded to null");
            None
        }
    }
}

/// 두 키 중 하나에서 숫자 문자열 추출
pub fn safe_number2(obj: &Value, key1: &str, key2: &str) -> Option<String> {
    safe_number(obj, key1).or_else(|| safe_number(obj, key2))
}

/// 안전한 정수 추출
pub fn safe_integer(obj: &Value, key: &str) -> Option<i64> {
    obj.get(key).and_then(|v| match v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.parse().ok(),
        _ => None,
    })
}

/// 두 키 중 하나에서 정수 추출
pub fn safe_integer2(obj: &Value, key1: &str, key2: &str) -> Option<i64> {
    safe_integer(obj, key1).or_else(|| safe_integer(obj, key2))
}

/// 정수 * 배수 (초 단위 타임스탬프 → 밀리초)
pub fn safe_integer_product(obj: &Value, key: &str, factor: i64) -> Option<i64> {
    safe_integer(obj, key).and_then(|v| v.checked_mul(factor))
}

/// 안전한 값 추출
pub fn safe_value<'a>(obj: &'a Value, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

/// 두 키 중 하나에서 값 추출
pub fn safe_value2<'a>(obj: &'a Value, key1: &str, key2: &str) -> Option<&'a Value> {
    safe_value(obj, key1).or_else(|| safe_value(obj, key2))
}

/// 안전한 불린 추출
pub fn safe_bool(obj: &Value, key: &str) -> Option<bool> {
    obj.get(key).and_then(|v| match v {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.to_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        Value::Number(n) => n.as_i64().map(|i| i != 0),
        _ => None,
    })
}

/// 배열 추출 (없으면 빈 슬라이스)
pub fn safe_list<'a>(obj: &'a Value, key: &str) -> &'a [Value] {
    obj.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}
