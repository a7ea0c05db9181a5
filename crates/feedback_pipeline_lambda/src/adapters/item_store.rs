use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use feedback_pipeline_core::contract::StoredFeedbackItem;
use serde_json::Value;

pub trait FeedbackItemStore {
    fn put_item(&self, table_name: &str, item: &StoredFeedbackItem) -> Result<(), String>;
}

/// Maps a stored item onto DynamoDB attributes, one attribute per top-level field.
pub fn to_attribute_map(item: &StoredFeedbackItem) -> HashMap<String, AttributeValue> {
    item.attributes()
        .iter()
        .map(|(key, value)| (key.clone(), to_attribute_value(value)))
        .collect()
}

pub fn to_attribute_value(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(flag) => AttributeValue::Bool(*flag),
        Value::Number(number) => AttributeValue::N(number.to_string()),
        Value::String(text) => AttributeValue::S(text.clone()),
        Value::Array(values) => AttributeValue::L(values.iter().map(to_attribute_value).collect()),
        Value::Object(fields) => AttributeValue::M(
            fields
                .iter()
                .map(|(key, value)| (key.clone(), to_attribute_value(value)))
                .collect(),
        ),
    }
}
