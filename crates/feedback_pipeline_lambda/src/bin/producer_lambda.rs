use feedback_pipeline_lambda::adapters::publisher::FeedbackPublisher;
use feedback_pipeline_lambda::config::ProducerConfig;
use feedback_pipeline_lambda::handlers::producer::{ApiGatewayResponse, ProducerHandler};
use feedback_pipeline_lambda::telemetry;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

struct SnsFeedbackPublisher {
    sns_client: aws_sdk_sns::Client,
}

impl FeedbackPublisher for SnsFeedbackPublisher {
    fn publish(&self, topic_arn: &str, message: &str) -> Result<(), String> {
        let topic_arn = topic_arn.to_string();
        let message = message.to_string();
        let client = self.sns_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .publish()
                    .topic_arn(topic_arn)
                    .message(message)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| format!("failed to publish message to sns: {error}"))
            })
        })
    }
}

async fn handle_request(
    handler: &ProducerHandler<SnsFeedbackPublisher>,
    event: LambdaEvent<Value>,
) -> Result<ApiGatewayResponse, Error> {
    handler.handle(&event.payload).map_err(Error::from)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    telemetry::init()?;
    let config = ProducerConfig::from_env()?;

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let handler = ProducerHandler::new(
        config,
        SnsFeedbackPublisher {
            sns_client: aws_sdk_sns::Client::new(&aws_config),
        },
    );
    let handler = &handler;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        handle_request(handler, event).await
    }))
    .await
}
