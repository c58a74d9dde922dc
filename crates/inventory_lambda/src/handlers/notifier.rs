use inventory_core::summary::notify_summary;
use inventory_core::{
    select_topic, stock_out_alert, AlertMessage, ChangeBatch, EventError, ItemErrorPolicy,
    ParseError, TableChangeEvent, TopicNotFound, TopicRef,
};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::adapters::{ServiceError, TopicService};
use crate::config::NotifierConfig;

const COMPONENT: &str = "stock_notifier";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotifyOutcome {
    pub records: usize,
    pub alerts_published: usize,
    pub records_skipped: usize,
    pub records_failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The change carried no new image, e.g. a delete.
    NoNewImage,
    InStock,
    Alerted,
}

#[derive(Debug, Error)]
pub enum NotifierError {
    #[error(transparent)]
    Event(#[from] EventError),

    #[error("record {index} has no dynamodb section")]
    MissingStreamRecord { index: usize },

    #[error("record {index} has an undecodable new image: {source}")]
    Decode {
        index: usize,
        #[source]
        source: ParseError,
    },

    #[error("listing topics failed: {0}")]
    ListTopics(#[source] ServiceError),

    #[error(transparent)]
    TopicNotFound(#[from] TopicNotFound),

    #[error("publishing alert to {topic} failed: {source}")]
    Publish {
        topic: String,
        #[source]
        source: ServiceError,
    },
}

/// Publishes a stock-out alert for every zero-count change in a stream batch
/// and returns the summary line for the runtime.
pub fn handle_change_batch(
    event: Value,
    config: &NotifierConfig,
    topics: &impl TopicService,
) -> Result<String, NotifierError> {
    info!(component = COMPONENT, event = "event_received", payload = %event);

    let batch = ChangeBatch::from_value(event)?;
    let outcome = notify_stock_outs(&batch, config, topics)?;

    info!(
        component = COMPONENT,
        event = "batch_completed",
        records = outcome.records,
        alerts_published = outcome.alerts_published,
        records_skipped = outcome.records_skipped,
        records_failed = outcome.records_failed,
    );
    Ok(notify_summary(outcome.records))
}

/// Walks the batch in order. Under `AbortOnItemError` the first failing record
/// ends the batch with its error; otherwise the failure is logged and the
/// remaining records are still processed.
pub fn notify_stock_outs(
    batch: &ChangeBatch,
    config: &NotifierConfig,
    topics: &impl TopicService,
) -> Result<NotifyOutcome, NotifierError> {
    let mut outcome = NotifyOutcome {
        records: batch.records.len(),
        ..NotifyOutcome::default()
    };

    for (index, record) in batch.records.iter().enumerate() {
        match notify_record(index, record, &config.alert_topic_name, topics) {
            Ok(RecordOutcome::Alerted) => outcome.alerts_published += 1,
            Ok(RecordOutcome::NoNewImage) => outcome.records_skipped += 1,
            Ok(RecordOutcome::InStock) => {}
            Err(error) => {
                warn!(
                    component = COMPONENT,
                    event = "record_failed",
                    index,
                    event_id = record.event_id.as_deref().unwrap_or_default(),
                    error = %error,
                    policy = %config.item_error_policy,
                );
                if config.item_error_policy == ItemErrorPolicy::AbortOnItemError {
                    return Err(error);
                }
                outcome.records_failed += 1;
            }
        }
    }

    Ok(outcome)
}

pub fn notify_record(
    index: usize,
    record: &TableChangeEvent,
    topic_name: &str,
    topics: &impl TopicService,
) -> Result<RecordOutcome, NotifierError> {
    let Some(stream_record) = record.dynamodb.as_ref() else {
        return Err(NotifierError::MissingStreamRecord { index });
    };
    let Some(image) = stream_record.new_image.as_ref() else {
        debug!(
            component = COMPONENT,
            event = "record_skipped",
            index,
            event_name = record.event_name.as_deref().unwrap_or_default(),
        );
        return Ok(RecordOutcome::NoNewImage);
    };

    let alert = stock_out_alert(image).map_err(|source| NotifierError::Decode { index, source })?;
    let Some(alert) = alert else {
        return Ok(RecordOutcome::InStock);
    };

    info!(
        component = COMPONENT,
        event = "stock_out",
        index,
        store = %alert.store,
        item = %alert.item,
        message = %alert.body(),
    );

    let topic = resolve_topic(topics, topic_name)?;
    publish(topics, &topic, &alert)?;
    Ok(RecordOutcome::Alerted)
}

/// Lists the visible topics and picks the one named `name`. The lookup is not
/// cached; every alert resolves the topic again.
pub fn resolve_topic(topics: &impl TopicService, name: &str) -> Result<TopicRef, NotifierError> {
    let listed = topics.list_topics().map_err(NotifierError::ListTopics)?;
    Ok(select_topic(&listed, name)?)
}

fn publish(
    topics: &impl TopicService,
    topic: &TopicRef,
    alert: &AlertMessage,
) -> Result<(), NotifierError> {
    topics
        .publish(topic, alert)
        .map_err(|source| NotifierError::Publish {
            topic: topic.arn.clone(),
            source,
        })?;

    info!(
        component = COMPONENT,
        event = "alert_published",
        topic = %topic.arn,
        subject = alert.subject(),
    );
    Ok(())
}
