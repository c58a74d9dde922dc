use std::future::Future;
use std::path::Path;

use aws_sdk_dynamodb::types::AttributeValue;
use inventory_core::change::{COUNT_ATTRIBUTE, ITEM_ATTRIBUTE, STORE_ATTRIBUTE};
use inventory_core::{InventoryRecord, ObjectLocation};
use inventory_lambda::adapters::{InventoryTable, ObjectDownloader, ServiceError};
use inventory_lambda::config::LoaderConfig;
use inventory_lambda::handlers::loader::handle_upload_event;
use inventory_lambda::telemetry;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

struct S3Downloader {
    s3_client: aws_sdk_s3::Client,
}

impl ObjectDownloader for S3Downloader {
    fn download_to(
        &self,
        location: &ObjectLocation,
        destination: &Path,
    ) -> Result<(), ServiceError> {
        let client = self.s3_client.clone();
        let bucket = location.bucket.clone();
        let key = location.key.clone();

        let body = block_on(async move {
            let output = client
                .get_object()
                .bucket(bucket)
                .key(key)
                .send()
                .await
                .map_err(|error| {
                    ServiceError::new(
                        "GetObject",
                        aws_sdk_s3::error::DisplayErrorContext(&error).to_string(),
                    )
                })?;
            output
                .body
                .collect()
                .await
                .map(|data| data.into_bytes())
                .map_err(|error| {
                    ServiceError::new("GetObject", format!("failed to read object body: {error}"))
                })
        })?;

        std::fs::write(destination, &body).map_err(|error| {
            ServiceError::new(
                "GetObject",
                format!("failed to write {}: {error}", destination.display()),
            )
        })
    }
}

struct DynamoDbInventoryTable {
    table_name: String,
    dynamodb_client: aws_sdk_dynamodb::Client,
}

impl InventoryTable for DynamoDbInventoryTable {
    fn put_record(&self, record: &InventoryRecord) -> Result<(), ServiceError> {
        let request = self
            .dynamodb_client
            .put_item()
            .table_name(&self.table_name)
            .item(STORE_ATTRIBUTE, AttributeValue::S(record.store.clone()))
            .item(ITEM_ATTRIBUTE, AttributeValue::S(record.item.clone()))
            .item(COUNT_ATTRIBUTE, AttributeValue::N(record.count.to_string()));

        block_on(async move {
            request.send().await.map(|_| ()).map_err(|error| {
                ServiceError::new(
                    "PutItem",
                    aws_sdk_dynamodb::error::DisplayErrorContext(&error).to_string(),
                )
            })
        })
    }
}

struct RuntimeDependencies {
    config: LoaderConfig,
    s3_client: aws_sdk_s3::Client,
    dynamodb_client: aws_sdk_dynamodb::Client,
}

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

fn handle_request(deps: &RuntimeDependencies, event: LambdaEvent<Value>) -> Result<String, Error> {
    let downloader = S3Downloader {
        s3_client: deps.s3_client.clone(),
    };
    let table = DynamoDbInventoryTable {
        table_name: deps.config.table_name.clone(),
        dynamodb_client: deps.dynamodb_client.clone(),
    };

    handle_upload_event(event.payload, &deps.config, &downloader, &table).map_err(Error::from)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    telemetry::init();

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let deps = &RuntimeDependencies {
        config: LoaderConfig::from_env()?,
        s3_client: aws_sdk_s3::Client::new(&aws_config),
        dynamodb_client: aws_sdk_dynamodb::Client::new(&aws_config),
    };

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        handle_request(deps, event)
    }))
    .await
}
