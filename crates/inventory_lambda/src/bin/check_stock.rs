use std::future::Future;

use inventory_core::{AlertMessage, TopicRef};
use inventory_lambda::adapters::{ServiceError, TopicService};
use inventory_lambda::config::NotifierConfig;
use inventory_lambda::handlers::notifier::handle_change_batch;
use inventory_lambda::telemetry;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

struct SnsTopics {
    sns_client: aws_sdk_sns::Client,
}

impl TopicService for SnsTopics {
    fn list_topics(&self) -> Result<Vec<TopicRef>, ServiceError> {
        let client = self.sns_client.clone();

        block_on(async move {
            let mut topics = Vec::new();
            let mut next_token: Option<String> = None;
            loop {
                let output = client
                    .list_topics()
                    .set_next_token(next_token.take())
                    .send()
                    .await
                    .map_err(|error| {
                        ServiceError::new(
                            "ListTopics",
                            aws_sdk_sns::error::DisplayErrorContext(&error).to_string(),
                        )
                    })?;
                topics.extend(
                    output
                        .topics()
                        .iter()
                        .filter_map(|topic| topic.topic_arn())
                        .map(TopicRef::new),
                );
                match output.next_token() {
                    Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                    _ => break,
                }
            }
            Ok::<_, ServiceError>(topics)
        })
    }

    fn publish(&self, topic: &TopicRef, alert: &AlertMessage) -> Result<(), ServiceError> {
        let request = self
            .sns_client
            .publish()
            .topic_arn(&topic.arn)
            .message(alert.body())
            .subject(alert.subject());

        block_on(async move {
            request.send().await.map(|_| ()).map_err(|error| {
                ServiceError::new(
                    "Publish",
                    aws_sdk_sns::error::DisplayErrorContext(&error).to_string(),
                )
            })
        })
    }
}

struct RuntimeDependencies {
    config: NotifierConfig,
    sns_client: aws_sdk_sns::Client,
}

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

fn handle_request(deps: &RuntimeDependencies, event: LambdaEvent<Value>) -> Result<String, Error> {
    let topics = SnsTopics {
        sns_client: deps.sns_client.clone(),
    };

    handle_change_batch(event.payload, &deps.config, &topics).map_err(Error::from)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    telemetry::init();

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let deps = &RuntimeDependencies {
        config: NotifierConfig::from_env()?,
        sns_client: aws_sdk_sns::Client::new(&aws_config),
    };

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        handle_request(deps, event)
    }))
    .await
}
