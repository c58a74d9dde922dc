use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use inventory_core::summary::load_summary;
use inventory_core::{
    EventError, InventoryCsvReader, ItemErrorPolicy, ObjectLocation, ParseError, UploadEvent,
};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::adapters::{InventoryTable, ObjectDownloader, ServiceError};
use crate::config::LoaderConfig;

const COMPONENT: &str = "inventory_loader";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOutcome {
    /// Data rows read from the file, whether or not they were written.
    pub rows_processed: usize,
    pub rows_written: usize,
    pub rows_failed: usize,
}

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error(transparent)]
    Event(#[from] EventError),

    #[error("error downloading file {key} from bucket {bucket}: {source}")]
    Download {
        bucket: String,
        key: String,
        #[source]
        source: ServiceError,
    },

    #[error("error opening downloaded file {path}: {message}")]
    Scratch { path: String, message: String },

    #[error("error processing file: {0}")]
    File(#[source] ParseError),

    #[error("row {row} could not be parsed: {source}")]
    RowParse {
        row: usize,
        #[source]
        source: ParseError,
    },

    #[error("unable to insert row {row} into table: {source}")]
    RowWrite {
        row: usize,
        #[source]
        source: ServiceError,
    },
}

/// Loads the uploaded object named by an S3 notification into the inventory
/// table and returns the summary line for the runtime.
pub fn handle_upload_event(
    event: Value,
    config: &LoaderConfig,
    downloader: &impl ObjectDownloader,
    table: &impl InventoryTable,
) -> Result<String, LoaderError> {
    info!(component = COMPONENT, event = "event_received", payload = %event);

    let upload = UploadEvent::from_value(event)?;
    if upload.records.len() > 1 {
        warn!(
            component = COMPONENT,
            event = "extra_records_ignored",
            records = upload.records.len(),
            "only the first upload record is loaded"
        );
    }
    let location = upload.location()?;

    download(&location, &config.scratch_path, downloader)?;
    let outcome = load_inventory_file(&config.scratch_path, config.item_error_policy, table)?;

    info!(
        component = COMPONENT,
        event = "load_completed",
        bucket = %location.bucket,
        key = %location.key,
        rows_processed = outcome.rows_processed,
        rows_written = outcome.rows_written,
        rows_failed = outcome.rows_failed,
    );
    Ok(load_summary(outcome.rows_processed))
}

fn download(
    location: &ObjectLocation,
    destination: &Path,
    downloader: &impl ObjectDownloader,
) -> Result<(), LoaderError> {
    downloader
        .download_to(location, destination)
        .map_err(|source| {
            error!(
                component = COMPONENT,
                event = "download_failed",
                bucket = %location.bucket,
                key = %location.key,
                error = %source,
            );
            LoaderError::Download {
                bucket: location.bucket.clone(),
                key: location.key.clone(),
                source,
            }
        })
}

/// Writes every data row of the CSV at `path` to `table`.
///
/// File-level failures (unreadable file, missing header column, undecodable
/// content) always abort. A row that cannot be coerced or written is handled
/// according to `policy`; under `ContinueOnItemError` it is logged, skipped and
/// still counted in `rows_processed`.
pub fn load_inventory_file(
    path: &Path,
    policy: ItemErrorPolicy,
    table: &impl InventoryTable,
) -> Result<LoadOutcome, LoaderError> {
    let file = File::open(path).map_err(|error| LoaderError::Scratch {
        path: path.display().to_string(),
        message: error.to_string(),
    })?;
    let rows = InventoryCsvReader::new(BufReader::new(file)).map_err(file_error)?;

    let mut outcome = LoadOutcome::default();
    for row in rows {
        let row = row.map_err(file_error)?;
        outcome.rows_processed += 1;
        let row_number = row.raw.row_number;

        info!(
            component = COMPONENT,
            event = "row_parsed",
            row = row_number,
            store = row.raw.store.as_deref().unwrap_or_default(),
            item = row.raw.item.as_deref().unwrap_or_default(),
            count = row.raw.count.as_deref().unwrap_or_default(),
        );

        let record = match row.record {
            Ok(record) => record,
            Err(source) => {
                warn!(
                    component = COMPONENT,
                    event = "row_rejected",
                    row = row_number,
                    error = %source,
                    policy = %policy,
                );
                if policy.aborts() {
                    return Err(LoaderError::RowParse {
                        row: row_number,
                        source,
                    });
                }
                outcome.rows_failed += 1;
                continue;
            }
        };

        match table.put_record(&record) {
            Ok(()) => outcome.rows_written += 1,
            Err(source) => {
                warn!(
                    component = COMPONENT,
                    event = "row_write_failed",
                    row = row_number,
                    error = %source,
                    policy = %policy,
                    "unable to insert data into inventory table"
                );
                if policy.aborts() {
                    return Err(LoaderError::RowWrite {
                        row: row_number,
                        source,
                    });
                }
                outcome.rows_failed += 1;
            }
        }
    }

    Ok(outcome)
}

fn file_error(source: ParseError) -> LoaderError {
    error!(component = COMPONENT, event = "file_failed", error = %source);
    LoaderError::File(source)
}
