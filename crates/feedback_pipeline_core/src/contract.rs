use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Sender address attached to every published message. Not taken from the request.
pub const PLACEHOLDER_EMAIL: &str = "testuser@example.com";
pub const DEFAULT_NAME: &str = "Unbekannt";
pub const DEFAULT_FEEDBACK: &str = "Kein Feedback";
pub const SUCCESS_MESSAGE: &str = "Feedback erfolgreich gesendet";
pub const MISSING_BODY_ERROR: &str = "No body found in request";

/// Field a delivered message must carry to be stored.
pub const REQUIRED_MESSAGE_FIELD: &str = "email";
pub const ITEM_ID_FIELD: &str = "id";

#[derive(Debug, Error)]
pub enum ContractError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("{0} must be a JSON object")]
    NotAnObject(&'static str),
    #[error("{0} must be a JSON object, array or string")]
    NotSearchable(&'static str),
}

/// Request body fields. A field holds whatever JSON value the caller sent,
/// including `null`; only an absent key falls back to the default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackRequest {
    pub name: Option<Value>,
    pub feedback: Option<Value>,
}

impl FeedbackRequest {
    pub fn parse(body: &str) -> Result<Self, ContractError> {
        let value: Value = serde_json::from_str(body)?;
        Self::from_json_value(value)
    }

    pub fn from_json_value(value: Value) -> Result<Self, ContractError> {
        let Value::Object(mut fields) = value else {
            return Err(ContractError::NotAnObject("request body"));
        };
        Ok(Self {
            name: fields.remove("name"),
            feedback: fields.remove("feedback"),
        })
    }

    pub fn into_message(self) -> FeedbackMessage {
        FeedbackMessage {
            name: self
                .name
                .unwrap_or_else(|| Value::String(DEFAULT_NAME.to_string())),
            feedback: self
                .feedback
                .unwrap_or_else(|| Value::String(DEFAULT_FEEDBACK.to_string())),
            email: PLACEHOLDER_EMAIL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedbackMessage {
    pub name: Value,
    pub feedback: Value,
    pub email: String,
}

impl FeedbackMessage {
    pub fn to_json(&self) -> Result<String, ContractError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Decodes a delivered channel message.
///
/// Any JSON value is accepted here, not only the exact [`FeedbackMessage`]
/// shape, so extra fields published by other writers are carried into the
/// stored item untouched.
pub fn parse_delivered_message(message: &str) -> Result<Value, ContractError> {
    Ok(serde_json::from_str(message)?)
}

/// Looks for `email` as an object key, an array element or a substring.
///
/// Numbers, booleans and `null` cannot be searched and are rejected.
pub fn has_required_field(message: &Value) -> Result<bool, ContractError> {
    match message {
        Value::Object(fields) => Ok(fields.contains_key(REQUIRED_MESSAGE_FIELD)),
        Value::Array(items) => Ok(items
            .iter()
            .any(|item| item.as_str() == Some(REQUIRED_MESSAGE_FIELD))),
        Value::String(text) => Ok(text.contains(REQUIRED_MESSAGE_FIELD)),
        _ => Err(ContractError::NotSearchable("delivered message")),
    }
}

/// A persisted feedback record: the delivered message merged with a generated id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StoredFeedbackItem {
    attributes: Map<String, Value>,
}

impl StoredFeedbackItem {
    /// Message keys are applied after the generated id, so a message that
    /// carries its own `id` keeps it. Only an object message can be merged.
    pub fn new(generated_id: impl Into<String>, message: Value) -> Result<Self, ContractError> {
        let Value::Object(fields) = message else {
            return Err(ContractError::NotAnObject("delivered message"));
        };
        let mut attributes = Map::new();
        attributes.insert(ITEM_ID_FIELD.to_string(), Value::String(generated_id.into()));
        attributes.extend(fields);
        Ok(Self { attributes })
    }

    pub fn id(&self) -> Option<&str> {
        self.attributes.get(ITEM_ID_FIELD).and_then(Value::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.attributes.get(field)
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnsEvent {
    #[serde(rename = "Records")]
    pub records: Vec<SnsEventRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnsEventRecord {
    #[serde(rename = "Sns")]
    pub sns: SnsNotification,
}

impl SnsEventRecord {
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            sns: SnsNotification {
                message: message.into(),
                message_id: None,
                topic_arn: None,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnsNotification {
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(
        rename = "MessageId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub message_id: Option<String>,
    #[serde(rename = "TopicArn", default, skip_serializing_if = "Option::is_none")]
    pub topic_arn: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn request_fields_become_message_fields() {
        let request =
            FeedbackRequest::parse(r#"{"name":"Ana","feedback":"Great"}"#).expect("should parse");
        let message = request.into_message();

        assert_eq!(message.name, "Ana");
        assert_eq!(message.feedback, "Great");
        assert_eq!(message.email, PLACEHOLDER_EMAIL);
    }

    #[test]
    fn missing_request_fields_fall_back_to_defaults() {
        let message = FeedbackRequest::parse("{}")
            .expect("empty object should parse")
            .into_message();

        assert_eq!(message.name, DEFAULT_NAME);
        assert_eq!(message.feedback, DEFAULT_FEEDBACK);
    }

    #[test]
    fn null_request_field_is_published_as_null() {
        let message = FeedbackRequest::parse(r#"{"name":null,"feedback":"ok"}"#)
            .expect("null field should parse")
            .into_message();

        assert_eq!(message.name, Value::Null);
        assert_eq!(message.feedback, "ok");
        assert_eq!(
            message.to_json().expect("should serialize"),
            r#"{"name":null,"feedback":"ok","email":"testuser@example.com"}"#
        );
    }

    #[test]
    fn request_email_is_ignored() {
        let message = FeedbackRequest::parse(r#"{"name":"Ana","email":"ana@example.org"}"#)
            .expect("should parse")
            .into_message();

        assert_eq!(message.email, PLACEHOLDER_EMAIL);
    }

    #[test]
    fn rejects_non_object_request_body() {
        let error = FeedbackRequest::parse(r#"["Ana","Great"]"#).expect_err("array should fail");
        assert!(matches!(error, ContractError::NotAnObject(_)));
    }

    #[test]
    fn non_string_request_fields_pass_through_unchanged() {
        let message = FeedbackRequest::parse(r#"{"name":42,"feedback":{"stars":5}}"#)
            .expect("non-string fields should parse")
            .into_message();

        assert_eq!(message.name, json!(42));
        assert_eq!(message.feedback, json!({"stars": 5}));
    }

    #[test]
    fn message_serializes_in_contract_key_order() {
        let message = FeedbackMessage {
            name: json!("Ana"),
            feedback: json!("Great"),
            email: PLACEHOLDER_EMAIL.to_string(),
        };

        assert_eq!(
            message.to_json().expect("should serialize"),
            r#"{"name":"Ana","feedback":"Great","email":"testuser@example.com"}"#
        );
    }

    #[test]
    fn delivered_message_accepts_any_json_value() {
        assert!(parse_delivered_message(r#"{"email":"a@b.c"}"#).is_ok());
        assert_eq!(
            parse_delivered_message(r#""plain text""#).expect("string should parse"),
            json!("plain text")
        );
        assert!(matches!(
            parse_delivered_message("{not json"),
            Err(ContractError::InvalidJson(_))
        ));
    }

    #[test]
    fn required_field_check_only_looks_at_key_presence() {
        let with_null = parse_delivered_message(r#"{"email":null}"#).expect("should parse");
        let without = parse_delivered_message(r#"{"name":"Ana"}"#).expect("should parse");

        assert!(has_required_field(&with_null).expect("object is searchable"));
        assert!(!has_required_field(&without).expect("object is searchable"));
    }

    #[test]
    fn required_field_check_searches_arrays_and_strings() {
        assert!(has_required_field(&json!(["name", "email"])).expect("array is searchable"));
        assert!(!has_required_field(&json!(["name", 1])).expect("array is searchable"));
        assert!(has_required_field(&json!("no email here")).expect("string is searchable"));
        assert!(!has_required_field(&json!("plain text")).expect("string is searchable"));
    }

    #[test]
    fn required_field_check_rejects_scalars() {
        for message in [json!(42), json!(true), Value::Null] {
            assert!(matches!(
                has_required_field(&message),
                Err(ContractError::NotSearchable(_))
            ));
        }
    }

    #[test]
    fn stored_item_requires_an_object_message() {
        let error = StoredFeedbackItem::new("1700000000000", json!(["email"]))
            .expect_err("array cannot be merged");
        assert!(matches!(error, ContractError::NotAnObject(_)));
    }

    #[test]
    fn stored_item_keeps_every_message_field() {
        let message = parse_delivered_message(
            r#"{"name":"Ana","feedback":"Great","email":"a@b.c","rating":5}"#,
        )
        .expect("should parse");
        let item = StoredFeedbackItem::new("1700000000000", message).expect("object message");

        assert_eq!(item.id(), Some("1700000000000"));
        assert_eq!(item.get("rating"), Some(&json!(5)));
        assert_eq!(item.attributes().len(), 5);
    }

    #[test]
    fn message_id_field_overrides_generated_id() {
        let message = parse_delivered_message(r#"{"id":"from-message","email":"a@b.c"}"#)
            .expect("should parse");
        let item = StoredFeedbackItem::new("1700000000000", message).expect("object message");

        assert_eq!(item.id(), Some("from-message"));
    }

    #[test]
    fn sns_event_reads_lambda_envelope() {
        let event: SnsEvent = serde_json::from_value(json!({
            "Records": [
                {
                    "EventSource": "aws:sns",
                    "Sns": {
                        "MessageId": "m-1",
                        "TopicArn": "arn:aws:sns:eu-west-1:000000000000:feedback",
                        "Message": "{\"email\":\"a@b.c\"}"
                    }
                }
            ]
        }))
        .expect("envelope should parse");

        assert_eq!(event.records.len(), 1);
        assert_eq!(event.records[0].sns.message_id.as_deref(), Some("m-1"));
        assert_eq!(event.records[0].sns.message, r#"{"email":"a@b.c"}"#);
    }
}
