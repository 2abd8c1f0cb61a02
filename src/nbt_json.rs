//! NBT 数据的 JSON 渲染 - 仅用于 dump 检查

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use fastnbt::Value;
use serde_json::{json, Map, Value as JsonValue};
use std::collections::BTreeMap;

/// 将 fastnbt Value 渲染为 JSON
///
/// 单向转换：数值标签转为 JSON 数字，大数组转为带前缀的 base64，
/// 复合标签按键排序以保证输出稳定
pub fn nbt_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Byte(v) => json!(v),
        Value::Short(v) => json!(v),
        Value::Int(v) => json!(v),
        Value::Long(v) => json!(v),
        Value::Float(v) => json_f64(*v as f64),
        Value::Double(v) => json_f64(*v),
        Value::String(s) => JsonValue::String(s.clone()),
        Value::ByteArray(arr) => {
            let bytes: Vec<u8> = arr.iter().map(|&b| b as u8).collect();
            JsonValue::String(format!("B;{}", BASE64.encode(&bytes)))
        }
        Value::IntArray(arr) => {
            let mut bytes = Vec::with_capacity(arr.len() * 4);
            for &v in arr.iter() {
                bytes.extend_from_slice(&v.to_be_bytes());
            }
            JsonValue::String(format!("I;{}", BASE64.encode(&bytes)))
        }
        Value::LongArray(arr) => {
            let mut bytes = Vec::with_capacity(arr.len() * 8);
            for &v in arr.iter() {
                bytes.extend_from_slice(&v.to_be_bytes());
            }
            JsonValue::String(format!("L;{}", BASE64.encode(&bytes)))
        }
        Value::List(list) => JsonValue::Array(list.iter().map(nbt_to_json).collect()),
        Value::Compound(map) => {
            // HashMap 迭代顺序不稳定，先排序
            let sorted: BTreeMap<&String, &Value> = map.iter().collect();
            let obj: Map<String, JsonValue> = sorted
                .into_iter()
                .map(|(k, v)| (k.clone(), nbt_to_json(v)))
                .collect();
            JsonValue::Object(obj)
        }
    }
}

/// NaN 与无穷大无法表示为 JSON 数字，退回字符串
fn json_f64(v: f64) -> JsonValue {
    match serde_json::Number::from_f64(v) {
        Some(n) => JsonValue::Number(n),
        None => JsonValue::String(v.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::nbt_to_json;
    use fastnbt::{IntArray, LongArray, Value};
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn numeric_tags_become_numbers() {
        assert_eq!(nbt_to_json(&Value::Byte(1)), json!(1));
        assert_eq!(nbt_to_json(&Value::Short(-5)), json!(-5));
        assert_eq!(nbt_to_json(&Value::Int(42)), json!(42));
        assert_eq!(nbt_to_json(&Value::Long(1 << 40)), json!(1099511627776i64));
        assert_eq!(nbt_to_json(&Value::Double(1.5)), json!(1.5));
    }

    #[test]
    fn arrays_are_base64_with_prefix() {
        let arr = Value::IntArray(IntArray::new(vec![1]));
        assert_eq!(nbt_to_json(&arr), json!("I;AAAAAQ=="));

        let arr = Value::LongArray(LongArray::new(vec![0]));
        assert_eq!(nbt_to_json(&arr), json!("L;AAAAAAAAAAA="));
    }

    #[test]
    fn compound_keys_are_sorted() {
        let mut map = HashMap::new();
        map.insert("b".to_string(), Value::Int(2));
        map.insert("a".to_string(), Value::Int(1));
        let json = nbt_to_json(&Value::Compound(map));

        let rendered = serde_json::to_string(&json).unwrap();
        assert_eq!(rendered, r#"{"a":1,"b":2}"#);
    }

    #[test]
    fn nested_lists() {
        let list = Value::List(vec![
            Value::String("x".to_string()),
            Value::List(vec![Value::Int(1)]),
        ]);
        assert_eq!(nbt_to_json(&list), json!(["x", [1]]));
    }
}
