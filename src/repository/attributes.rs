//! JSON document <-> DynamoDB attribute map conversion.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};

use crate::errors::CustomerError;

pub type Item = HashMap<String, AttributeValue>;

/// # Errors
///
/// Returns `Serialization` if `value` does not serialize to a JSON object.
pub fn to_item<T: Serialize>(value: &T) -> Result<Item, CustomerError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map
            .into_iter()
            .map(|(k, v)| (k, json_to_attribute(v)))
            .collect()),
        other => Err(CustomerError::Serialization(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

/// # Errors
///
/// Returns `Serialization` if the item does not match `T`.
pub fn from_item<T: DeserializeOwned>(item: &Item) -> Result<T, CustomerError> {
    let map: Map<String, Value> = item
        .iter()
        .map(|(k, v)| (k.clone(), attribute_to_json(v)))
        .collect();
    Ok(serde_json::from_value(Value::Object(map))?)
}

pub fn json_to_attribute(value: Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s),
        Value::Array(items) => {
            AttributeValue::L(items.into_iter().map(json_to_attribute).collect())
        }
        Value::Object(map) => AttributeValue::M(
            map.into_iter()
                .map(|(k, v)| (k, json_to_attribute(v)))
                .collect(),
        ),
    }
}

pub fn attribute_to_json(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => parse_number(n),
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::L(items) => Value::Array(items.iter().map(attribute_to_json).collect()),
        AttributeValue::M(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), attribute_to_json(v)))
                .collect(),
        ),
        AttributeValue::Ss(items) => {
            Value::Array(items.iter().cloned().map(Value::String).collect())
        }
        AttributeValue::Ns(items) => Value::Array(items.iter().map(|n| parse_number(n)).collect()),
        _ => Value::Null,
    }
}

fn parse_number(raw: &str) -> Value {
    if let Ok(i) = raw.parse::<i64>() {
        return Value::Number(i.into());
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map_or(Value::Null, Value::Number)
}

/// Attribute value for a string key such as `pk`/`sk`.
pub fn string_key(value: impl Into<String>) -> AttributeValue {
    AttributeValue::S(value.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: i64,
        price: f64,
        tags: Vec<String>,
        nested: Option<Box<Sample>>,
    }

    #[test]
    fn test_nested_document_survives_attribute_conversion() {
        let sample = Sample {
            name: "outer".into(),
            count: 3,
            price: 9.75,
            tags: vec!["a".into(), "b".into()],
            nested: Some(Box::new(Sample {
                name: "inner".into(),
                count: -1,
                price: 0.5,
                tags: vec![],
                nested: None,
            })),
        };

        let item = to_item(&sample).unwrap();
        assert_eq!(item["count"], AttributeValue::N("3".into()));
        assert!(matches!(item["tags"], AttributeValue::L(_)));

        let back: Sample = from_item(&item).unwrap();
        assert_eq!(back, sample);
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(matches!(to_item(&42), Err(CustomerError::Serialization(_))));
    }
}
