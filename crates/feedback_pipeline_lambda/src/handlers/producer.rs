use feedback_pipeline_core::contract::{
    ContractError, FeedbackRequest, MISSING_BODY_ERROR, SUCCESS_MESSAGE,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::adapters::publisher::FeedbackPublisher;
use crate::config::ProducerConfig;
use crate::telemetry::PRODUCER_COMPONENT;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Value,
    pub body: String,
}

/// Failures surfaced to the Lambda runtime as a failed invocation.
#[derive(Debug, Error)]
pub enum ProducerError {
    #[error("malformed request body: {0}")]
    MalformedBody(#[source] ContractError),
    #[error("request body must be a JSON string or object")]
    UnsupportedBody,
    #[error("failed to encode feedback message: {0}")]
    Encode(#[source] ContractError),
    #[error("failed to publish feedback to {topic_arn}: {message}")]
    Publish { topic_arn: String, message: String },
}

pub struct ProducerHandler<P> {
    config: ProducerConfig,
    publisher: P,
}

impl<P: FeedbackPublisher> ProducerHandler<P> {
    pub fn new(config: ProducerConfig, publisher: P) -> Self {
        Self { config, publisher }
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Publishes one feedback message per request that carries a body.
    ///
    /// A missing or empty body is answered with 400 and publishes nothing.
    pub fn handle(&self, event: &Value) -> Result<ApiGatewayResponse, ProducerError> {
        let Some(request) = decode_body(event)? else {
            tracing::warn!(
                component = PRODUCER_COMPONENT,
                event = "feedback_rejected",
                reason = MISSING_BODY_ERROR
            );
            return Ok(json_response(400, json!({ "error": MISSING_BODY_ERROR })));
        };

        let message = request.into_message();
        let encoded = message.to_json().map_err(ProducerError::Encode)?;

        self.publisher
            .publish(&self.config.topic_arn, &encoded)
            .map_err(|error| ProducerError::Publish {
                topic_arn: self.config.topic_arn.clone(),
                message: error,
            })?;

        tracing::info!(
            component = PRODUCER_COMPONENT,
            event = "feedback_published",
            topic_arn = %self.config.topic_arn,
            name = %message.name
        );
        Ok(json_response(200, json!({ "message": SUCCESS_MESSAGE })))
    }
}

fn decode_body(event: &Value) -> Result<Option<FeedbackRequest>, ProducerError> {
    match event.get("body") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) if text.is_empty() => Ok(None),
        Some(Value::String(text)) => FeedbackRequest::parse(text)
            .map(Some)
            .map_err(ProducerError::MalformedBody),
        Some(body @ Value::Object(_)) => FeedbackRequest::from_json_value(body.clone())
            .map(Some)
            .map_err(ProducerError::MalformedBody),
        Some(_) => Err(ProducerError::UnsupportedBody),
    }
}

fn json_response(status_code: u16, payload: Value) -> ApiGatewayResponse {
    ApiGatewayResponse {
        status_code,
        headers: json!({"Content-Type": "application/json"}),
        body: payload.to_string(),
    }
}
