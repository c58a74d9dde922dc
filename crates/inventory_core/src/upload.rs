use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};

use crate::error::EventError;

/// Bucket and decoded key of an uploaded object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadEvent {
    #[serde(rename = "Records")]
    pub records: Vec<UploadRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRecord {
    #[serde(rename = "eventName", default, skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    pub s3: S3Entity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3Object {
    /// Form-encoded, as delivered in storage notifications.
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl UploadEvent {
    pub fn from_value(event: serde_json::Value) -> Result<Self, EventError> {
        Ok(serde_json::from_value(event)?)
    }

    /// Location of the object named by the first record. Later records are not
    /// consulted.
    pub fn location(&self) -> Result<ObjectLocation, EventError> {
        let record = self.records.first().ok_or(EventError::NoRecords)?;
        Ok(ObjectLocation {
            bucket: record.s3.bucket.name.clone(),
            key: unquote_plus(&record.s3.object.key),
        })
    }
}

/// Decodes a form-encoded string: `+` becomes a space and `%XX` escapes are
/// replaced by their byte. Malformed escapes are kept literally and invalid
/// UTF-8 is replaced with U+FFFD.
pub fn unquote_plus(encoded: &str) -> String {
    let spaced = encoded.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_plus_and_percent_escapes() {
        assert_eq!(unquote_plus("daily+counts%2F2024.csv"), "daily counts/2024.csv");
        assert_eq!(unquote_plus("caf%C3%A9.csv"), "café.csv");
        assert_eq!(unquote_plus("100%25+sure"), "100% sure");
    }

    #[test]
    fn keeps_malformed_escapes() {
        assert_eq!(unquote_plus("50%zz"), "50%zz");
        assert_eq!(unquote_plus("trailing%4"), "trailing%4");
    }

    #[test]
    fn encoded_plus_survives_and_bad_utf8_is_replaced() {
        assert_eq!(unquote_plus("a%2Bb+c"), "a+b c");
        assert_eq!(unquote_plus("date=2024&x%FF.csv"), "date=2024&x\u{FFFD}.csv");
    }

    #[test]
    fn location_uses_first_record() {
        let event = UploadEvent::from_value(json!({
            "Records": [
                {
                    "eventName": "ObjectCreated:Put",
                    "s3": {
                        "bucket": {"name": "inventory-uploads"},
                        "object": {"key": "berlin+store.csv", "size": 42}
                    }
                },
                {
                    "s3": {
                        "bucket": {"name": "other"},
                        "object": {"key": "ignored.csv"}
                    }
                }
            ]
        }))
        .expect("event should decode");

        assert_eq!(
            event.location(),
            Ok(ObjectLocation {
                bucket: "inventory-uploads".to_string(),
                key: "berlin store.csv".to_string(),
            })
        );
    }

    #[test]
    fn empty_records_has_no_location() {
        let event = UploadEvent::from_value(json!({"Records": []})).expect("event should decode");
        assert_eq!(event.location(), Err(EventError::NoRecords));
    }
}
