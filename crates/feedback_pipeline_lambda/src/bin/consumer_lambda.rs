use feedback_pipeline_core::clock::SystemClock;
use feedback_pipeline_core::contract::StoredFeedbackItem;
use feedback_pipeline_lambda::adapters::item_store::{to_attribute_map, FeedbackItemStore};
use feedback_pipeline_lambda::config::ConsumerConfig;
use feedback_pipeline_lambda::handlers::consumer::{ConsumerHandler, ConsumerResponse};
use feedback_pipeline_lambda::telemetry;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

struct DynamoDbItemStore {
    dynamodb_client: aws_sdk_dynamodb::Client,
}

impl FeedbackItemStore for DynamoDbItemStore {
    fn put_item(&self, table_name: &str, item: &StoredFeedbackItem) -> Result<(), String> {
        let table_name = table_name.to_string();
        let attributes = to_attribute_map(item);
        let client = self.dynamodb_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .put_item()
                    .table_name(table_name)
                    .set_item(Some(attributes))
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| format!("failed to put item to dynamodb: {error}"))
            })
        })
    }
}

type FeedbackConsumer = ConsumerHandler<DynamoDbItemStore, SystemClock>;

async fn handle_request(
    handler: &FeedbackConsumer,
    event: LambdaEvent<Value>,
) -> Result<ConsumerResponse, Error> {
    handler.handle(&event.payload).map_err(Error::from)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    telemetry::init()?;
    let config = ConsumerConfig::from_env()?;

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let handler = ConsumerHandler::new(
        config,
        DynamoDbItemStore {
            dynamodb_client: aws_sdk_dynamodb::Client::new(&aws_config),
        },
        SystemClock,
    );
    let handler = &handler;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        handle_request(handler, event).await
    }))
    .await
}
