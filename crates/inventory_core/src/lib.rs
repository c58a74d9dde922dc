//! Shared inventory pipeline domain primitives.
//!
//! This crate owns the trigger event contracts, row and change-image coercion,
//! alert composition and topic selection. It intentionally excludes AWS SDK and
//! Lambda runtime concerns, which live in `inventory_lambda`.

pub mod alert;
pub mod change;
pub mod error;
pub mod policy;
pub mod record;
pub mod summary;
pub mod upload;

pub use alert::{select_topic, AlertMessage, TopicRef, ALERT_SUBJECT, DEFAULT_ALERT_TOPIC};
pub use change::{stock_out_alert, AttributeValue, ChangeBatch, StreamImage, TableChangeEvent};
pub use error::{EventError, ParseError, TopicNotFound};
pub use policy::ItemErrorPolicy;
pub use record::{InventoryCsvReader, InventoryRecord, ParsedRow, RawRow};
pub use upload::{unquote_plus, ObjectLocation, UploadEvent};
