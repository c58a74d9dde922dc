use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::alert::AlertMessage;
use crate::error::{EventError, ParseError};
use crate::record::parse_integer;

pub const STORE_ATTRIBUTE: &str = "Store";
pub const ITEM_ATTRIBUTE: &str = "Item";
pub const COUNT_ATTRIBUTE: &str = "Count";

/// A typed attribute value as carried by the table's change stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    S(String),
    N(String),
    B(String),
    #[serde(rename = "BOOL")]
    Bool(bool),
    #[serde(rename = "NULL")]
    Null(bool),
    M(HashMap<String, AttributeValue>),
    L(Vec<AttributeValue>),
    #[serde(rename = "SS")]
    Ss(Vec<String>),
    #[serde(rename = "NS")]
    Ns(Vec<String>),
    #[serde(rename = "BS")]
    Bs(Vec<String>),
}

impl AttributeValue {
    fn type_name(&self) -> &'static str {
        match self {
            Self::S(_) => "S",
            Self::N(_) => "N",
            Self::B(_) => "B",
            Self::Bool(_) => "BOOL",
            Self::Null(_) => "NULL",
            Self::M(_) => "M",
            Self::L(_) => "L",
            Self::Ss(_) => "SS",
            Self::Ns(_) => "NS",
            Self::Bs(_) => "BS",
        }
    }
}

/// Attribute map of a record image (old or new) in a change notification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamImage(pub HashMap<String, AttributeValue>);

impl StreamImage {
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.0.get(name)
    }

    pub fn string(&self, name: &'static str) -> Result<&str, ParseError> {
        match self.get(name) {
            Some(AttributeValue::S(value)) => Ok(value),
            Some(_) => Err(ParseError::AttributeType {
                attribute: name,
                expected: "S",
            }),
            None => Err(ParseError::MissingAttribute(name)),
        }
    }

    pub fn integer(&self, name: &'static str) -> Result<i128, ParseError> {
        match self.get(name) {
            Some(AttributeValue::N(value)) => parse_integer(name, value),
            Some(_) => Err(ParseError::AttributeType {
                attribute: name,
                expected: "N",
            }),
            None => Err(ParseError::MissingAttribute(name)),
        }
    }

    /// Short description of the attribute types present, for log lines.
    pub fn describe(&self) -> String {
        let mut parts: Vec<String> = self
            .0
            .iter()
            .map(|(name, value)| format!("{name}:{}", value.type_name()))
            .collect();
        parts.sort();
        parts.join(",")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamRecord {
    #[serde(rename = "Keys", default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<StreamImage>,
    #[serde(rename = "NewImage", default, skip_serializing_if = "Option::is_none")]
    pub new_image: Option<StreamImage>,
    #[serde(rename = "OldImage", default, skip_serializing_if = "Option::is_none")]
    pub old_image: Option<StreamImage>,
}

/// One change notification. Deletes carry no new image. A record without a
/// `dynamodb` section still decodes so the handler can fail it on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableChangeEvent {
    #[serde(rename = "eventID", default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(rename = "eventName", default, skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamodb: Option<StreamRecord>,
}

impl TableChangeEvent {
    pub fn new_image(&self) -> Option<&StreamImage> {
        self.dynamodb.as_ref()?.new_image.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeBatch {
    #[serde(rename = "Records")]
    pub records: Vec<TableChangeEvent>,
}

impl ChangeBatch {
    pub fn from_value(event: serde_json::Value) -> Result<Self, EventError> {
        Ok(serde_json::from_value(event)?)
    }
}

/// Returns the alert for an image whose `Count` is zero and `None` otherwise.
/// `Store` and `Item` are only read when an alert is due.
pub fn stock_out_alert(image: &StreamImage) -> Result<Option<AlertMessage>, ParseError> {
    if image.integer(COUNT_ATTRIBUTE)? != 0 {
        return Ok(None);
    }

    Ok(Some(AlertMessage {
        store: image.string(STORE_ATTRIBUTE)?.to_string(),
        item: image.string(ITEM_ATTRIBUTE)?.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn image(value: serde_json::Value) -> StreamImage {
        serde_json::from_value(value).expect("image should deserialize")
    }

    #[test]
    fn zero_count_produces_alert() {
        let alert = stock_out_alert(&image(json!({
            "Store": {"S": "StoreA"},
            "Item": {"S": "Widget"},
            "Count": {"N": "0"}
        })))
        .expect("image should decode");

        assert_eq!(
            alert,
            Some(AlertMessage {
                store: "StoreA".to_string(),
                item: "Widget".to_string(),
            })
        );
    }

    #[test]
    fn non_zero_count_skips_store_and_item() {
        let alert = stock_out_alert(&image(json!({"Count": {"N": "5"}})))
            .expect("only count is required when stock remains");
        assert_eq!(alert, None);
    }

    #[test]
    fn count_must_be_numeric_attribute() {
        let error = stock_out_alert(&image(json!({"Count": {"S": "0"}})))
            .expect_err("string count should fail");
        assert_eq!(
            error,
            ParseError::AttributeType {
                attribute: "Count",
                expected: "N",
            }
        );
    }

    #[test]
    fn missing_store_on_zero_count_is_an_error() {
        let error = stock_out_alert(&image(json!({
            "Item": {"S": "Widget"},
            "Count": {"N": "0"}
        })))
        .expect_err("missing store should fail");
        assert_eq!(error, ParseError::MissingAttribute("Store"));
    }

    #[test]
    fn decodes_batch_with_delete_record() {
        let batch = ChangeBatch::from_value(json!({
            "Records": [
                {
                    "eventID": "1",
                    "eventName": "INSERT",
                    "dynamodb": {
                        "Keys": {"Store": {"S": "StoreA"}, "Item": {"S": "Widget"}},
                        "NewImage": {
                            "Store": {"S": "StoreA"},
                            "Item": {"S": "Widget"},
                            "Count": {"N": "0"},
                            "Tags": {"SS": ["promo"]},
                            "Active": {"BOOL": true}
                        }
                    }
                },
                {
                    "eventName": "REMOVE",
                    "dynamodb": {
                        "OldImage": {"Count": {"N": "2"}}
                    }
                }
            ]
        }))
        .expect("batch should decode");

        assert_eq!(batch.records.len(), 2);
        assert!(batch.records[0].new_image().is_some());
        assert!(batch.records[1].new_image().is_none());
        assert_eq!(
            batch.records[0].new_image().map(StreamImage::describe),
            Some("Active:BOOL,Count:N,Item:S,Store:S,Tags:SS".to_string())
        );
    }

    #[test]
    fn record_without_stream_section_still_decodes() {
        let batch = ChangeBatch::from_value(json!({
            "Records": [{"eventName": "REMOVE"}]
        }))
        .expect("batch should decode");

        assert_eq!(batch.records[0].dynamodb, None);
        assert!(batch.records[0].new_image().is_none());
    }

    #[test]
    fn batch_without_records_is_malformed() {
        let error = ChangeBatch::from_value(json!({"records": []}))
            .expect_err("missing Records should fail");
        assert!(matches!(error, EventError::Malformed(_)));
    }
}
