//! Summary strings returned to the invoking runtime.

/// `rows` counts parsed data rows, including rows whose write failed.
pub fn load_summary(rows: usize) -> String {
    format!("{rows} records inserted into DynamoDB.")
}

/// `records` is the size of the whole batch, not the number of alerts sent.
pub fn notify_summary(records: usize) -> String {
    format!("Successfully processed {records} records.")
}
