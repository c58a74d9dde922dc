use serde::{Deserialize, Serialize};

use crate::error::TopicNotFound;

pub const ALERT_SUBJECT: &str = "Inventory Alert!";
pub const DEFAULT_ALERT_TOPIC: &str = "NoStock";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertMessage {
    pub store: String,
    pub item: String,
}

impl AlertMessage {
    pub fn body(&self) -> String {
        format!("{} is out of stock of {}", self.store, self.item)
    }

    pub fn subject(&self) -> &'static str {
        ALERT_SUBJECT
    }
}

/// A publish target identified by its ARN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRef {
    pub arn: String,
}

impl TopicRef {
    pub fn new(arn: impl Into<String>) -> Self {
        Self { arn: arn.into() }
    }

    pub fn name(&self) -> &str {
        self.arn.rsplit(':').next().unwrap_or(&self.arn)
    }

    fn has_name_suffix(&self, name: &str) -> bool {
        let suffix = format!(":{}", name.to_lowercase());
        self.arn.to_lowercase().ends_with(&suffix)
    }
}

/// Picks the first topic whose ARN ends with `:<name>`, ignoring case.
pub fn select_topic(topics: &[TopicRef], name: &str) -> Result<TopicRef, TopicNotFound> {
    topics
        .iter()
        .find(|topic| topic.has_name_suffix(name))
        .cloned()
        .ok_or_else(|| TopicNotFound {
            name: name.to_string(),
            candidates: topics.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composes_alert_body() {
        let alert = AlertMessage {
            store: "StoreA".to_string(),
            item: "Widget".to_string(),
        };
        assert_eq!(alert.body(), "StoreA is out of stock of Widget");
        assert_eq!(alert.subject(), "Inventory Alert!");
    }

    #[test]
    fn selects_first_case_insensitive_suffix_match() {
        let topics = vec![
            TopicRef::new("arn:aws:sns:us-east-1:123:Orders"),
            TopicRef::new("arn:aws:sns:us-east-1:123:nostock"),
            TopicRef::new("arn:aws:sns:us-east-1:123:NoStock"),
        ];

        let topic = select_topic(&topics, "NoStock").expect("topic should resolve");
        assert_eq!(topic.arn, "arn:aws:sns:us-east-1:123:nostock");
        assert_eq!(topic.name(), "nostock");
    }

    #[test]
    fn suffix_must_follow_separator() {
        let topics = vec![TopicRef::new("arn:aws:sns:us-east-1:123:LegacyNoStock")];

        let error = select_topic(&topics, "NoStock").expect_err("partial name should not match");
        assert_eq!(
            error,
            TopicNotFound {
                name: "NoStock".to_string(),
                candidates: 1,
            }
        );
    }

    #[test]
    fn empty_topic_list_is_not_found() {
        assert!(select_topic(&[], "NoStock").is_err());
    }
}
